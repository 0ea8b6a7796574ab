use std::fmt::Write;

/// Line-oriented Rust source builder with indentation tracking.
pub struct RustEmitter {
    output: String,
    indent: usize,
}

impl RustEmitter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Write an indented line.
    pub fn write_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Write an empty line.
    pub fn blank_line(&mut self) {
        self.output.push('\n');
    }

    /// Write a raw line without indentation.
    pub fn write_raw(&mut self, line: &str) {
        let _ = writeln!(self.output, "{line}");
    }

    /// Write a line and increase the indent for the following lines.
    pub fn open(&mut self, line: &str) {
        self.write_line(line);
        self.indent += 1;
    }

    /// Decrease the indent and write the closing line.
    pub fn close(&mut self, line: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.write_line(line);
    }

    /// Consume and return the final output string.
    pub fn finish(self) -> String {
        self.output
    }
}

impl Default for RustEmitter {
    fn default() -> Self {
        Self::new()
    }
}
