//! Delivery address extraction from the fixed template layout.
//!
//! On the two-column template the client and delivery addresses share a line;
//! the delivery one is on the right.

use tracing::debug;

use crate::layout::Line;

use super::patterns::{
    BARE_HOUSE_NUMBER, LEADING_POSTAL_CODE, LOCALITY_THEN_STREET, MULTI_SPACE, POSTAL_CODE,
    STREET_WORD, STRICT_STREET_TAIL, WIDE_GAP,
};

type StreetRule = fn(&str) -> Option<String>;

/// Street rules in precedence order.
const STREET_RULES: &[(&str, StreetRule)] = &[
    ("wide_gap_segment", wide_gap_segment),
    ("locality_then_street", locality_then_street),
    ("repeated_street_word", repeated_street_word),
    ("double_space_segment", double_space_segment),
    ("whole_line_street", whole_line_street),
];

/// Lines after the header searched for the postal tail.
const POSTAL_TAIL_OFFSETS: std::ops::RangeInclusive<usize> = 3..=5;

/// Extract the delivery address from the line after the client block,
/// completed with the postal tail found 3 to 5 lines below the header.
pub fn extract_delivery_address(lines: &[Line], header: usize, address_line: usize) -> Option<String> {
    let street = lines.get(address_line).and_then(|line| {
        let text = line.text().trim();
        STREET_RULES.iter().find_map(|(rule, apply)| {
            let street = apply(text)?;
            debug!("Delivery street via {}: '{}'", rule, street);
            Some(street)
        })
    });

    let tail_lines: Vec<&str> = POSTAL_TAIL_OFFSETS
        .map(|offset| header + offset)
        .filter(|&index| index != address_line)
        .filter_map(|index| lines.get(index))
        .map(|line| line.text().trim())
        .collect();

    // A line carrying both columns' postal codes beats any single-code line.
    let tail = tail_lines
        .iter()
        .find_map(|text| second_postal_tail(text))
        .or_else(|| tail_lines.iter().find_map(|text| right_column_postal_tail(text)));

    let address = [street, tail]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (!address.is_empty()).then_some(address)
}

fn segments(text: &str, separator: &regex::Regex) -> Vec<String> {
    separator
        .split(text)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn wide_gap_segment(text: &str) -> Option<String> {
    if !WIDE_GAP.is_match(text) {
        return None;
    }
    let last = segments(text, &WIDE_GAP).pop()?;

    // A bare house number lost its street word; retry with the stricter pattern.
    if BARE_HOUSE_NUMBER.is_match(&last) {
        if let Some(caps) = STRICT_STREET_TAIL.captures(text) {
            return Some(caps["street"].split_whitespace().collect::<Vec<_>>().join(" "));
        }
    }
    Some(last)
}

fn locality_then_street(text: &str) -> Option<String> {
    if !LOCALITY_THEN_STREET.is_match(text) {
        return None;
    }
    STREET_WORD
        .find_iter(text)
        .last()
        .map(|m| text[m.start()..].trim().to_string())
}

fn repeated_street_word(text: &str) -> Option<String> {
    let words: Vec<_> = STREET_WORD.find_iter(text).collect();
    if words.len() < 2 {
        return None;
    }
    words.last().map(|m| text[m.start()..].trim().to_string())
}

fn double_space_segment(text: &str) -> Option<String> {
    let parts = segments(text, &MULTI_SPACE);
    if parts.len() < 2 {
        return None;
    }
    parts.last().cloned()
}

fn whole_line_street(text: &str) -> Option<String> {
    STREET_WORD.is_match(text).then(|| text.to_string())
}

/// Tail starting at the last postal code of a line holding two or more.
fn second_postal_tail(text: &str) -> Option<String> {
    let codes: Vec<_> = POSTAL_CODE.find_iter(text).collect();
    match codes.as_slice() {
        [_, .., last] => Some(text[last.start()..].trim().to_string()),
        _ => None,
    }
}

/// Right column of a single-code line, when that column opens with the code.
fn right_column_postal_tail(text: &str) -> Option<String> {
    if POSTAL_CODE.find_iter(text).count() != 1 {
        return None;
    }
    match segments(text, &MULTI_SPACE).as_slice() {
        [_, .., last] if LEADING_POSTAL_CODE.is_match(last) => Some(last.clone()),
        _ => None,
    }
}
