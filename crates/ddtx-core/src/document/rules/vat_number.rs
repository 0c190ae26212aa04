//! Client VAT number (partita IVA) extraction.

use crate::layout::Line;

use super::patterns::VAT_NUMBER;

/// Lines after the header searched for the client's VAT number.
const VAT_LINE_OFFSETS: std::ops::RangeInclusive<usize> = 4..=10;

/// First 11-digit number 4 to 10 lines below the header that is not one of
/// the issuer's own VAT numbers.
pub fn extract_vat_number<S: AsRef<str>>(
    lines: &[Line],
    header: usize,
    exclusions: &[S],
) -> Option<String> {
    VAT_LINE_OFFSETS
        .filter_map(|offset| lines.get(header + offset))
        .flat_map(|line| VAT_NUMBER.find_iter(line.text()))
        .map(|m| m.as_str())
        .find(|candidate| !exclusions.iter().any(|e| e.as_ref() == *candidate))
        .map(str::to_string)
}
