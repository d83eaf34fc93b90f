//! Column definitions
//!
//! A column is a header plus a typed extraction function. Extraction returns
//! `None` for absent values, which render as [`PLACEHOLDER`] so an unset field
//! never looks like an empty or zero one.

use clap::ValueEnum;

/// Rendered in place of absent values
pub const PLACEHOLDER: &str = "-";

/// Extracts a display value from a concrete resource
pub type Extract<K> = fn(&K) -> Option<String>;

/// Which of a descriptor's two column sets to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColumnSet {
    #[default]
    Default,
    Wide,
}

/// Extraction rules for a kind, keyed by column header
pub struct Columns<K> {
    rules: Vec<(&'static str, Extract<K>)>,
}

impl<K> Columns<K> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add or replace the rule for `header`
    pub fn column(mut self, header: &'static str, extract: Extract<K>) -> Self {
        match self.rules.iter_mut().find(|(h, _)| *h == header) {
            Some(rule) => rule.1 = extract,
            None => self.rules.push((header, extract)),
        }
        self
    }

    pub fn contains(&self, header: &str) -> bool {
        self.rules.iter().any(|(h, _)| *h == header)
    }

    pub fn headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(h, _)| *h)
    }

    /// Render one cell; unknown headers and absent values give the placeholder
    pub fn render(&self, header: &str, resource: &K) -> String {
        self.rules
            .iter()
            .find(|(h, _)| *h == header)
            .and_then(|(_, extract)| extract(resource))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

impl<K> Default for Columns<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Some(text) unless empty
pub fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Some(text) for optional strings that are set and non-empty
pub fn non_empty_opt(value: Option<&String>) -> Option<String> {
    value.and_then(|v| non_empty(v))
}

/// Some(number) unless zero; zero means "not configured"
pub fn non_zero<N>(value: N) -> Option<String>
where
    N: Into<u64> + Copy,
{
    let n: u64 = value.into();
    (n != 0).then(|| n.to_string())
}
