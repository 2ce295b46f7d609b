//! Line-oriented text sink for emitted code.

/// Width of the `////...` rule lines around section headers.
const RULE_WIDTH: usize = 67;

/// Accumulates generated code line by line.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line. Trailing whitespace is dropped.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref().trim_end());
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Append several lines at once.
    pub fn lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.line(line);
        }
    }

    pub fn rule(&mut self) {
        self.out.push_str(&"/".repeat(RULE_WIDTH));
        self.out.push('\n');
    }

    /// A comment header framed by rule lines.
    pub fn section(&mut self, title: impl AsRef<str>) {
        self.rule();
        self.line(format!("//  {}", title.as_ref()));
        self.rule();
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }
}
