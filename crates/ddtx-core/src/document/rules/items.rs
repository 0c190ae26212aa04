//! Line item extraction.

use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::error::ExtractionError;
use crate::models::document::Item;

use super::amounts::parse_italian_amount;
use super::patterns::{ITEM_ROW, ITEM_ROW_FREE_GOODS, ITEM_ROW_WITH_SM};
use super::FieldExtractor;

#[derive(Clone, Copy)]
enum RowKind {
    Standard,
    FreeGoods,
}

/// Item row rules in precedence order.
fn item_rules() -> [(RowKind, &'static Regex); 3] {
    [
        (RowKind::FreeGoods, &*ITEM_ROW_FREE_GOODS),
        (RowKind::Standard, &*ITEM_ROW_WITH_SM),
        (RowKind::Standard, &*ITEM_ROW),
    ]
}

/// Line item extractor.
pub struct ItemExtractor;

impl ItemExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parse one item row.
    ///
    /// Returns `Ok(None)` for lines that are not item rows and an error when a
    /// row matches but one of its numbers cannot be read.
    pub fn parse_row(&self, text: &str) -> Result<Option<Item>, ExtractionError> {
        let text = text.trim();

        for (kind, pattern) in item_rules() {
            if let Some(caps) = pattern.captures(text) {
                return build_item(kind, &caps).map(Some);
            }
        }

        Ok(None)
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ItemExtractor {
    type Output = Item;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.parse_row(text).ok().flatten()
    }
}

fn build_item(kind: RowKind, caps: &Captures<'_>) -> Result<Item, ExtractionError> {
    let quantity = number(caps, "quantity")?;
    let unit_price = number(caps, "price")?;
    let vat_rate = caps["vat"].parse::<u8>().map_err(|_| parse_error("vat", &caps["vat"]))?;
    let merchandise_discount = caps
        .name("sm")
        .map(|m| parse_italian_amount(m.as_str()).ok_or_else(|| parse_error("sm", m.as_str())))
        .transpose()?;

    let (discount_percent, total) = match kind {
        RowKind::Standard => (None, number(caps, "total")?),
        RowKind::FreeGoods => (Some(Decimal::ONE_HUNDRED), Decimal::ZERO),
    };

    Ok(Item {
        code: caps["code"].to_string(),
        description: caps["description"].trim().to_string(),
        unit: caps["unit"].to_string(),
        quantity,
        unit_price,
        discount_percent,
        merchandise_discount,
        vat_rate,
        total,
    })
}

fn number(caps: &Captures<'_>, field: &str) -> Result<Decimal, ExtractionError> {
    parse_italian_amount(&caps[field]).ok_or_else(|| parse_error(field, &caps[field]))
}

fn parse_error(field: &str, value: &str) -> ExtractionError {
    ExtractionError::Parse {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_standard_row() {
        let item = ItemExtractor::new()
            .extract("090009 GRISSINI ST/MANO PZ 280 3,9500 1.106,00 04")
            .unwrap();

        assert_eq!(
            item,
            Item {
                code: "090009".to_string(),
                description: "GRISSINI ST/MANO".to_string(),
                unit: "PZ".to_string(),
                quantity: dec("280"),
                unit_price: dec("3.95"),
                discount_percent: None,
                merchandise_discount: None,
                vat_rate: 4,
                total: dec("1106.00"),
            }
        );
    }

    #[test]
    fn test_row_with_merchandise_discount() {
        let item = ItemExtractor::new()
            .extract("100234 TARALLI OLIO KG 12,5 6,80 85,00 10 05")
            .unwrap();
        assert_eq!(item.quantity, dec("12.5"));
        assert_eq!(item.vat_rate, 10);
        assert_eq!(item.merchandise_discount, Some(dec("5")));
    }

    #[test]
    fn test_free_goods_row() {
        let item = ItemExtractor::new()
            .extract("090010 GRISSINI OMAGGIO PZ 10 * 3,9500 39,50 04")
            .unwrap();
        assert_eq!(item.unit_price, dec("3.95"));
        assert_eq!(item.discount_percent, Some(dec("100")));
        assert_eq!(item.total, Decimal::ZERO);
    }

    #[test]
    fn test_unparsable_number_is_an_error() {
        let err = ItemExtractor::new()
            .parse_row("090009 GRISSINI PZ 280 ,, 1.106,00 04")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { ref field, .. } if field == "price"));
    }

    #[test]
    fn test_non_item_lines() {
        let extractor = ItemExtractor::new();
        assert_eq!(extractor.parse_row("TOTALE DOCUMENTO 1.150,24").unwrap(), None);
        assert_eq!(extractor.parse_row("VIA ROMA 12").unwrap(), None);
    }

    #[test]
    fn test_extract_all_over_text_block() {
        let text = "CODICE DESCRIZIONE\n\
                    090009 GRISSINI ST/MANO PZ 280 3,9500 1.106,00 04\n\
                    090011 CRACKERS CT 2 12,00 24,00 10";
        let items = ItemExtractor::new().extract_all(text);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].unit, "CT");
    }
}
