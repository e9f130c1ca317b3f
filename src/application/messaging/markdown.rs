//! Markdown builders for handler replies

use std::fmt;

pub fn bold(text: &str) -> String {
    format!("**{}**", text)
}

pub fn code(text: &str) -> String {
    format!("`{}`", text)
}

/// A titled block of lines, rendered as markdown
#[derive(Debug, Clone)]
pub struct Section {
    title: String,
    lines: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    /// Appends a `key: value` line.
    pub fn kv(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.lines.push(format!("{}: {}", key, value));
        self
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bold(&self.title))?;
        for line in &self.lines {
            write!(f, "\n  {}", line)?;
        }
        Ok(())
    }
}
