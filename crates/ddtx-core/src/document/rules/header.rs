//! Numeric header line extraction.

use chrono::NaiveDate;
use regex::Regex;

use crate::layout::Line;

use super::patterns::{DOCUMENT_HEADER, DOCUMENT_HEADER_FUSED, SHORT_DATE};
use super::{ExtractionMatch, FieldExtractor};

/// Header metadata printed on one line: number, date, page and client code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    pub number: String,
    /// `dd/mm/yyyy`
    pub date: String,
    pub page: Option<u32>,
    pub client_code: String,
}

/// Header rules in precedence order.
fn header_rules() -> [(&'static str, &'static Regex); 2] {
    [("spaced", &*DOCUMENT_HEADER), ("fused", &*DOCUMENT_HEADER_FUSED)]
}

/// Header field extractor.
pub struct HeaderExtractor;

impl HeaderExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Find the first line holding the numeric header.
    pub fn locate(&self, lines: &[Line]) -> Option<ExtractionMatch<DocumentHeader>> {
        lines
            .iter()
            .enumerate()
            .find_map(|(index, line)| self.extract(line.text()).map(|m| m.at_line(index)))
    }
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for HeaderExtractor {
    type Output = ExtractionMatch<DocumentHeader>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let text = text.trim();

        header_rules().into_iter().find_map(|(rule, pattern)| {
            let caps = pattern.captures(text)?;
            let date = expand_short_date(&caps["date"])?;
            let header = DocumentHeader {
                number: caps["number"].to_string(),
                date,
                page: caps["page"].parse().ok(),
                client_code: caps["client"].to_string(),
            };
            Some(ExtractionMatch::new(header, rule, text))
        })
    }
}

/// Expand `d/mm/yy` to `dd/mm/20yy`, rejecting impossible dates.
pub fn expand_short_date(date: &str) -> Option<String> {
    let caps = SHORT_DATE.captures(date)?;
    let day: u32 = caps["day"].parse().ok()?;
    let month: u32 = caps["month"].parse().ok()?;
    let year: i32 = caps["year"].parse().ok()?;

    NaiveDate::from_ymd_opt(2000 + year, month, day).map(|d| d.format("%d/%m/%Y").to_string())
}
