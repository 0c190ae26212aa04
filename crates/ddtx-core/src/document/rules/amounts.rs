//! Amount parsing and totals for Italian documents.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::document::rules::patterns::TOTAL_AMOUNT;
use crate::layout::Line;
use crate::models::document::Item;

/// Parse an Italian-formatted number ("1.106,00", "3,9500", "280").
///
/// Dots are thousand separators and the comma is the decimal separator.
pub fn parse_italian_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Subtotal and VAT of the items, each item taxed at its own rate.
pub fn compute_totals(items: &[Item]) -> (Decimal, Decimal) {
    let subtotal: Decimal = items.iter().map(|i| i.total).sum();
    let vat: Decimal = items
        .iter()
        .map(|i| i.total * Decimal::from(i.vat_rate) / Decimal::ONE_HUNDRED)
        .sum();

    (subtotal, vat.round_dp(2))
}

/// Largest `#.###,##` amount in the trailing lines that exceeds the subtotal.
pub fn find_printed_total(lines: &[Line], scan_lines: usize, subtotal: Decimal) -> Option<Decimal> {
    let start = lines.len().saturating_sub(scan_lines);

    lines[start..]
        .iter()
        .flat_map(|line| TOTAL_AMOUNT.captures_iter(line.text()))
        .filter_map(|caps| parse_italian_amount(&caps["amount"]))
        .filter(|amount| *amount > subtotal)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(total: &str, vat_rate: u8) -> Item {
        Item {
            code: "000001".to_string(),
            description: "ARTICOLO".to_string(),
            unit: "PZ".to_string(),
            quantity: Decimal::ONE,
            unit_price: dec(total),
            discount_percent: None,
            merchandise_discount: None,
            vat_rate,
            total: dec(total),
        }
    }

    #[test]
    fn test_parse_italian_amount() {
        assert_eq!(parse_italian_amount("1.106,00"), Some(dec("1106.00")));
        assert_eq!(parse_italian_amount("3,9500"), Some(dec("3.95")));
        assert_eq!(parse_italian_amount("280"), Some(dec("280")));
        assert_eq!(parse_italian_amount("12.345.678,90"), Some(dec("12345678.90")));
        assert_eq!(parse_italian_amount(",,"), None);
        assert_eq!(parse_italian_amount(""), None);
    }

    #[test]
    fn test_vat_uses_each_item_rate() {
        let items = vec![item("100.00", 4), item("200.00", 22)];
        let (subtotal, vat) = compute_totals(&items);
        assert_eq!(subtotal, dec("300.00"));
        assert_eq!(vat, dec("48.00"));
    }

    #[test]
    fn test_printed_total_is_largest_above_subtotal() {
        let lines: Vec<Line> = [
            "IMPONIBILE 1.106,00",
            "IVA 4% 44,24",
            "TOTALE DOCUMENTO 1.150,24",
            "CONTRIBUTO 1.120,00",
        ]
        .iter()
        .map(|t| Line::from_text(*t))
        .collect();

        assert_eq!(find_printed_total(&lines, 10, dec("1106")), Some(dec("1150.24")));
        assert_eq!(find_printed_total(&lines, 10, dec("2000")), None);
        // Only the trailing window is searched.
        assert_eq!(find_printed_total(&lines, 1, dec("1106")), Some(dec("1120.00")));
    }
}
