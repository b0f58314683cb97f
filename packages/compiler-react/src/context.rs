use std::cell::RefCell;
use std::rc::Rc;

/// Options for React compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Annotate the page function's return type
    pub use_typescript: bool,
    /// Embed the page stylesheet (breakpoint and state rules) in the module;
    /// otherwise only desktop default styles are inlined
    pub embed_styles: bool,
    /// Wrap layout and components in `framer-motion` elements
    pub motion: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            use_typescript: false,
            embed_styles: true,
            motion: true,
        }
    }
}

/// Compilation context for managing state during code generation
pub struct CompilerContext {
    buffer: Rc<RefCell<String>>,
    indent_level: Rc<RefCell<usize>>,
    pub options: CompileOptions,
}

impl CompilerContext {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(String::new())),
            indent_level: Rc::new(RefCell::new(0)),
            options,
        }
    }

    pub fn add(&self, text: &str) {
        self.buffer.borrow_mut().push_str(text);
    }

    pub fn add_line(&self, text: &str) {
        self.add_indented(text);
        self.add("\n");
    }

    pub fn add_indented(&self, text: &str) {
        let indent = "  ".repeat(*self.indent_level.borrow());
        self.buffer.borrow_mut().push_str(&indent);
        self.buffer.borrow_mut().push_str(text);
    }

    /// `prefix` followed by a multi-line block, continuation lines indented
    /// to the current level, then `suffix`
    pub fn add_block(&self, prefix: &str, block: &str, suffix: &str) {
        let mut lines = block.lines();
        let first = lines.next().unwrap_or_default();
        let rest: Vec<&str> = lines.collect();

        if rest.is_empty() {
            self.add_line(&format!("{}{}{}", prefix, first, suffix));
            return;
        }

        self.add_line(&format!("{}{}", prefix, first));
        for (i, line) in rest.iter().enumerate() {
            if i + 1 == rest.len() {
                self.add_line(&format!("{}{}", line, suffix));
            } else {
                self.add_line(line);
            }
        }
    }

    pub fn indent(&self) {
        *self.indent_level.borrow_mut() += 1;
    }

    pub fn dedent(&self) {
        let mut level = self.indent_level.borrow_mut();
        if *level > 0 {
            *level -= 1;
        }
    }

    pub fn get_output(&self) -> String {
        self.buffer.borrow().clone()
    }
}
