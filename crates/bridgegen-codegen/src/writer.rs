//! Indented line writer used by every emission step.

use std::fmt::{self, Write};

const INDENT: &str = "    ";

#[derive(Debug, Clone, Default)]
pub struct CodeWriter {
    buf: String,
    level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `level` indents, for text spliced into an enclosing block.
    pub fn at_level(level: usize) -> Self {
        Self {
            buf: String::new(),
            level,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn line(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        for _ in 0..self.level {
            self.buf.push_str(INDENT);
        }
        self.buf.write_fmt(args)?;
        self.buf.push('\n');
        Ok(())
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Open a `{` block and indent.
    pub fn open(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.line(args)?;
        self.indent();
        Ok(())
    }

    /// Dedent and write the closing `}`.
    pub fn close(&mut self) -> fmt::Result {
        self.dedent();
        self.line(format_args!("}}"))
    }

    /// Append already-indented text verbatim.
    pub fn append(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_indent() {
        let mut w = CodeWriter::new();
        w.open(format_args!("impl Camera {{")).unwrap();
        w.line(format_args!("fn {}() {{}}", "enabled")).unwrap();
        w.close().unwrap();
        assert_eq!(w.finish(), "impl Camera {\n    fn enabled() {}\n}\n");
    }

    #[test]
    fn test_at_level() {
        let mut w = CodeWriter::at_level(2);
        w.line(format_args!("x")).unwrap();
        w.dedent();
        w.dedent();
        w.dedent();
        w.line(format_args!("y")).unwrap();
        assert_eq!(w.as_str(), "        x\ny\n");
    }
}
