//! Client order reference extraction.

use regex::Regex;
use tracing::debug;

use crate::layout::Line;

use super::patterns::{
    DATE_LIKE, ORDER_507_BARE, ORDER_507_LABELLED, ORDER_DATE, ORDER_GENERIC, ORDER_NS, ORDER_ODV,
    ORDER_VS, STANDARD_REFERENCE,
};

/// Words that follow "Ordine" in boilerplate text and are never order numbers.
const EXCLUDED_WORDS: &[&str] = &[
    "TERMINI",
    "CONDIZIONI",
    "PAGAMENTO",
    "CONSEGNA",
    "NOTE",
    "VEDI",
    "SEGUONO",
    "NOSTRO",
    "VOSTRO",
    "DATA",
    "TRASPORTO",
    "SPEDIZIONE",
    "RITIRO",
];

/// Client order number and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReference {
    pub number: String,
    /// `dd/mm/yyyy`
    pub date: Option<String>,
}

struct OrderRule {
    name: &'static str,
    pattern: &'static Regex,
    /// Only tried on lines mentioning "ordine".
    needs_keyword: bool,
}

/// Standard reference rules in precedence order.
fn standard_rules() -> [OrderRule; 4] {
    [
        OrderRule { name: "vs_ordine", pattern: &*ORDER_VS, needs_keyword: false },
        OrderRule { name: "ns_ordine", pattern: &*ORDER_NS, needs_keyword: false },
        OrderRule { name: "odv", pattern: &*ORDER_ODV, needs_keyword: false },
        OrderRule { name: "generic_ordine", pattern: &*ORDER_GENERIC, needs_keyword: true },
    ]
}

/// Last-resort rules for order numbers starting with 507.
fn fallback_rules() -> [(&'static str, &'static Regex); 2] {
    [("labelled_507", &*ORDER_507_LABELLED), ("bare_507", &*ORDER_507_BARE)]
}

/// Order reference extractor.
pub struct OrderReferenceExtractor {
    reference_year: i32,
}

impl OrderReferenceExtractor {
    /// `reference_year` completes dates whose year is missing or corrupted.
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    /// Search the whole document for the client order reference.
    ///
    /// Standard "Rif. Vs./Ns. Ordine" style references win. A 507 code is
    /// accepted only when no standard reference exists anywhere. It must be
    /// labelled or open its line followed by a name, must not sit on the
    /// header line or right after an operator label, and must differ from the
    /// document number.
    pub fn find(&self, lines: &[Line], header: usize, document_number: &str) -> Option<OrderReference> {
        if let Some(reference) = self.find_standard(lines, document_number) {
            return Some(reference);
        }

        if lines.iter().any(|line| STANDARD_REFERENCE.is_match(line.text())) {
            debug!("Standard order reference present but invalid; skipping 507 fallback");
            return None;
        }

        self.find_507(lines, header, document_number)
    }

    fn find_standard(&self, lines: &[Line], document_number: &str) -> Option<OrderReference> {
        let rules = standard_rules();

        for line in lines {
            let text = line.text();
            let mentions_order = text.to_lowercase().contains("ordine");

            for rule in rules.iter().filter(|r| mentions_order || !r.needs_keyword) {
                let Some(caps) = rule.pattern.captures(text) else {
                    continue;
                };
                let number = &caps["number"];
                if !is_valid_reference(number, document_number) {
                    debug!("Discarding order reference '{}' ({})", number, rule.name);
                    continue;
                }
                debug!("Order reference '{}' via {}", number, rule.name);
                return Some(OrderReference {
                    number: number.to_string(),
                    date: self.order_date(text),
                });
            }
        }

        None
    }

    fn find_507(&self, lines: &[Line], header: usize, document_number: &str) -> Option<OrderReference> {
        for (index, line) in lines.iter().enumerate() {
            if index == header {
                continue;
            }
            let text = line.text().trim();

            for (rule, pattern) in fallback_rules() {
                let Some(caps) = pattern.captures(text) else {
                    continue;
                };
                let number = &caps["number"];

                let after_operator = index > 0 && lines[index - 1].contains_ignore_case("operatore");
                if after_operator {
                    debug!("Rejecting '{}' ({}): follows an operator label", number, rule);
                    continue;
                }
                if number == document_number {
                    continue;
                }

                debug!("Order reference '{}' via {}", number, rule);
                return Some(OrderReference {
                    number: number.to_string(),
                    date: self.order_date(text),
                });
            }
        }

        None
    }

    fn order_date(&self, text: &str) -> Option<String> {
        let caps = ORDER_DATE.captures(text)?;
        normalize_order_date(&caps["date"], self.reference_year)
    }
}

fn is_valid_reference(number: &str, document_number: &str) -> bool {
    number.chars().any(|c| c.is_ascii_digit())
        && !EXCLUDED_WORDS.contains(&number.to_uppercase().as_str())
        && !DATE_LIKE.is_match(number)
        && number != document_number
}

/// Normalize an order date to `dd/mm/yyyy`.
///
/// Heuristic: a missing year, or a single-digit year (treated as a corrupted
/// print), is replaced by `reference_year`; a two-digit year gets the "20"
/// prefix.
pub fn normalize_order_date(date: &str, reference_year: i32) -> Option<String> {
    let parts: Vec<&str> = date.split(['/', '-']).collect();
    let (day, month, year) = match parts.as_slice() {
        [day, month] => (*day, *month, reference_year.to_string()),
        [day, month, year] => {
            let year = match year.len() {
                1 => reference_year.to_string(),
                2 => format!("20{}", year),
                _ => year.to_string(),
            };
            (*day, *month, year)
        }
        _ => return None,
    };

    Some(format!("{:0>2}/{:0>2}/{}", day, month, year))
}
