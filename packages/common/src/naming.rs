/// Lowercase a name and collapse every run of non-alphanumerics into one `-`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().flat_map(|c| c.to_lowercase()) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// `modern-landing-page` → `ModernLandingPage`
pub fn to_pascal_case(slug: &str) -> String {
    let name: String = slug
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();

    // Identifiers cannot start with a digit
    if name.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        format!("Page{}", name)
    } else {
        name
    }
}

/// `backgroundColor` → `background-color`
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Append `-2`, `-3`, ... to `base` until `is_taken` rejects it
pub fn unique_slug(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
