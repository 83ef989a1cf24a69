//! `{TOKEN}` placeholder substitution over argument fragments.
//!
//! A fragment such as `-s {SAMPLEFREQ}` is split on whitespace into argument
//! words, and every `{TOKEN}` in a word is replaced by its bound value.
//! Bindings that no word references are fine; a referenced token with no
//! binding is an error. A lone `{` that does not close is kept as-is.

use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

const PLACEHOLDER_RE: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)\}";

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("query {query}: template references unknown placeholder {{{token}}}")]
    UnknownPlaceholder { query: String, token: String },

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// Token name -> replacement text.
#[derive(Debug, Clone, Default)]
pub struct Substitutions(BTreeMap<&'static str, String>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, token: &'static str, value: impl ToString) -> Self {
        self.0.insert(token, value.to_string());
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }

    /// Expand every fragment into argument words, in order.
    pub fn expand(&self, query: &str, fragments: &[&str]) -> Result<Vec<String>, FormatError> {
        let re = Regex::new(PLACEHOLDER_RE)?;

        let mut out = Vec::new();
        for fragment in fragments {
            for word in fragment.split_whitespace() {
                out.push(self.render_word(&re, query, word)?);
            }
        }
        Ok(out)
    }

    fn render_word(&self, re: &Regex, query: &str, word: &str) -> Result<String, FormatError> {
        let mut rendered = String::with_capacity(word.len());
        let mut last = 0;
        for caps in re.captures_iter(word) {
            let whole = caps.get(0).unwrap();
            let token = &caps[1];
            let value = self
                .get(token)
                .ok_or_else(|| FormatError::UnknownPlaceholder {
                    query: query.to_string(),
                    token: token.to_string(),
                })?;
            rendered.push_str(&word[last..whole.start()]);
            rendered.push_str(value);
            last = whole.end();
        }
        rendered.push_str(&word[last..]);
        Ok(rendered)
    }
}
