//! Plain text documents (Jelly views, README files, anything unparsed)

use std::fmt::{self, Display, Formatter};

/// Unstructured text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextDocument {
    text: String,
}

impl TextDocument {
    /// Wrap text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Full contents
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line terminator used by the first line break, `\n` when there is none
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        match self.text.find('\n') {
            Some(i) if i > 0 && self.text.as_bytes()[i - 1] == b'\r' => "\r\n",
            _ => "\n",
        }
    }

    /// First line without its terminator
    #[must_use]
    pub fn first_line(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }
}

impl Display for TextDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
