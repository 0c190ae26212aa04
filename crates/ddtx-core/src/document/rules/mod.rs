//! Rule-based field extractors for the DDT/FT template.
//!
//! Where a field has alternative layouts the rules are kept as ordered tables
//! and tried in order; the first rule that matches wins.

pub mod amounts;
pub mod client;
pub mod delivery;
pub mod header;
pub mod items;
pub mod order;
pub mod patterns;
pub mod vat_number;

pub use amounts::{compute_totals, find_printed_total, parse_italian_amount};
pub use client::{extract_client_name, ClientBlock};
pub use delivery::extract_delivery_address;
pub use header::{DocumentHeader, HeaderExtractor};
pub use items::ItemExtractor;
pub use order::{OrderReference, OrderReferenceExtractor};
pub use vat_number::extract_vat_number;

/// Trait for single-line field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from one line of text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract the field from every line of a text block.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        text.lines().filter_map(|line| self.extract(line)).collect()
    }
}

/// Extracted value with the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the rule that matched.
    pub rule: &'static str,
    /// Index of the source line.
    pub line: Option<usize>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rule: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            rule,
            line: None,
            source: source.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}
