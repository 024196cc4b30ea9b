//! Indentation-aware line accumulator for usda emission.
//!
//! Emission never touches the file system: everything is collected as
//! lines first and only joined/written once the tree walk is complete.

use super::keys::INDENT;

/// Collects output lines at a tracked indentation level.
#[derive(Debug, Default)]
pub struct UsdaWriter {
    lines: Vec<String>,
    level: usize,
}

impl UsdaWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at a given indentation level (4 spaces per level).
    pub fn at_level(level: usize) -> Self {
        Self {
            lines: Vec::new(),
            level,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Increase indentation level
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decrease indentation level
    pub fn dedent(&mut self) {
        if self.level > 0 {
            self.level -= 1;
        }
    }

    /// Run `f` one level deeper.
    pub fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent();
        f(self);
        self.dedent();
    }

    /// Write a line with current indentation
    pub fn writeln(&mut self, text: &str) {
        let mut line = INDENT.repeat(self.level);
        line.push_str(text);
        self.lines.push(line);
    }

    /// Add a blank line (no trailing whitespace)
    pub fn blank_line(&mut self) {
        self.lines.push(String::new());
    }

    /// Append text to the last written line.
    pub fn append(&mut self, text: &str) {
        match self.lines.last_mut() {
            Some(last) => last.push_str(text),
            None => self.lines.push(text.to_string()),
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Join into file text, newline-terminated.
    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Anything that renders itself as usda lines.
pub trait Emit {
    fn emit(&self, w: &mut UsdaWriter);

    /// Render at `level` into a fresh line list.
    fn lines(&self, level: usize) -> Vec<String> {
        let mut w = UsdaWriter::at_level(level);
        self.emit(&mut w);
        w.into_lines()
    }
}
