//! Completed exchanges and the framing that carries them into the next prompt.
//!
//! The model sees the whole conversation on every request: each finished
//! exchange as a `<User Message>` / `<Assistant Response>` pair, followed by
//! the new prompt in a `<User Prompt>` block.

use std::fmt;

/// One prompt and the full response it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// The prompt as the user typed it, directives unexpanded.
    pub prompt: String,
    pub response: String,
}

impl Exchange {
    #[must_use]
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<User Message>\n{}\n</User Message>", self.prompt)?;
        writeln!(
            f,
            "<Assistant Response>\n{}\n</Assistant Response>",
            self.response
        )
    }
}

/// Every exchange that ran to completion, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    exchanges: Vec<Exchange>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            exchanges: Vec::new(),
        }
    }

    pub fn push(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exchange> {
        self.exchanges.iter()
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// The text sent to the model: all prior exchanges, then `prompt`.
    #[must_use]
    pub fn build_prompt(&self, prompt: &str) -> String {
        use fmt::Write;

        let mut out = String::new();
        for exchange in &self.exchanges {
            let _ = write!(out, "{exchange}");
        }
        let _ = writeln!(out, "<User Prompt>\n{prompt}\n</User Prompt>");
        out
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Exchange;
    type IntoIter = std::slice::Iter<'a, Exchange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
