use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagesmith_compiler_html::{compile_to_html, CompileOptions};
use pagesmith_model::{Page, Point, Props};
use pagesmith_registry::Registry;

const KINDS: [&str; 5] = ["hero", "services-grid", "testimonial-carousel", "contact-form", "pricing-cards"];

/// `sections` nestable sections, each holding one of every leaf kind
fn large_page(registry: &Registry, sections: usize) -> Page {
    let mut page = Page::blank("bench", "Bench", "bench", Utc::now());
    let mut z = 0;

    for s in 0..sections {
        z += 1;
        let section_id = format!("section-{}", s);
        let mut section = registry
            .instantiate("section", section_id.clone(), Props::new(), Point::new(0.0, s as f64 * 400.0), z)
            .unwrap();

        for kind in KINDS {
            z += 1;
            let id = format!("{}-{}", kind, s);
            let instance = registry
                .instantiate(kind, id.clone(), Props::new(), Point::default(), z)
                .unwrap();
            if let Some(children) = section.children.as_mut() {
                children.push(id);
            }
            page.components.push(instance);
        }

        page.layout.children.push(section_id);
        page.components.push(section);
    }

    page
}

fn compile_small_page(c: &mut Criterion) {
    let registry = Registry::builtin();
    let page = large_page(&registry, 1);

    c.bench_function("compile_html_small_page", |b| {
        b.iter(|| compile_to_html(black_box(&page), &registry, CompileOptions::default()))
    });
}

fn compile_large_page(c: &mut Criterion) {
    let registry = Registry::builtin();
    let page = large_page(&registry, 200);

    c.bench_function("compile_html_large_page", |b| {
        b.iter(|| compile_to_html(black_box(&page), &registry, CompileOptions::default()))
    });
}

criterion_group!(benches, compile_small_page, compile_large_page);
criterion_main!(benches);
