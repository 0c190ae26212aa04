//! Template parser for the two-column DDT/FT layout.

use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::layout::Line;
use crate::models::config::DocumentConfig;
use crate::models::document::{AddressResolution, Document, DocumentMetadata, DocumentType, Item};

use super::rules::{
    compute_totals, extract_client_name, extract_delivery_address, extract_vat_number,
    find_printed_total, HeaderExtractor, ItemExtractor, OrderReferenceExtractor,
};

/// Parses header metadata, client, references, items and totals from the
/// line model of one document.
#[derive(Debug, Clone)]
pub struct TemplateDocumentParser {
    config: DocumentConfig,
}

impl TemplateDocumentParser {
    pub fn new(config: &DocumentConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Parse a document.
    ///
    /// Fails with [`ExtractionError::UnsupportedTemplate`] when the numeric
    /// header line is missing, so the caller can hand the document to a
    /// generic parser instead.
    pub fn parse(
        &self,
        lines: &[Line],
        document_type: DocumentType,
    ) -> Result<Document, ExtractionError> {
        if lines.is_empty() {
            return Err(ExtractionError::NoText);
        }

        let Some(header_match) = HeaderExtractor::new().locate(lines) else {
            debug!("No numeric header line among {} lines", lines.len());
            return Err(ExtractionError::UnsupportedTemplate {
                reason: "numeric header line not found".to_string(),
            });
        };
        let header_index = header_match.line.unwrap_or_default();
        let header = header_match.value;
        info!(
            "Parsing {:?} {} of {} (header line {}, rule {})",
            document_type, header.number, header.date, header_index, header_match.rule
        );

        let client = extract_client_name(lines, header_index);
        let delivery_address =
            extract_delivery_address(lines, header_index, client.last_line + 1).unwrap_or_default();
        let vat_number =
            extract_vat_number(lines, header_index, &self.config.issuer_vat_exclusions);

        let order = OrderReferenceExtractor::new(self.reference_year()).find(
            lines,
            header_index,
            &header.number,
        );

        let mut warnings = Vec::new();
        let items = self.parse_items(&lines[header_index + 1..], &mut warnings);

        let (subtotal, vat) = compute_totals(&items);
        let printed_total =
            find_printed_total(lines, self.config.totals_scan_lines, subtotal);
        let computed_total = subtotal + vat;
        let totals_discrepancy = printed_total
            .is_some_and(|printed| (printed - computed_total).abs() > self.config.total_tolerance);
        if totals_discrepancy {
            warn!(
                "Printed total {:?} differs from subtotal {} plus VAT {}",
                printed_total, subtotal, vat
            );
        }

        let address_resolution = if delivery_address.is_empty() {
            AddressResolution::Undetermined
        } else {
            AddressResolution::TemplateLayout
        };

        Ok(Document {
            document_type,
            document_number: header.number,
            date: header.date,
            page_number: header.page,
            client_code: header.client_code,
            client_name: client.name,
            delivery_address,
            vat_number,
            order_reference: order.as_ref().map(|o| o.number.clone()),
            order_date: order.and_then(|o| o.date),
            items,
            subtotal,
            vat,
            total: printed_total.unwrap_or(computed_total),
            printed_total,
            metadata: DocumentMetadata {
                address_resolution,
                totals_discrepancy,
                needs_review: totals_discrepancy,
                warnings,
            },
        })
    }

    fn parse_items(&self, lines: &[Line], warnings: &mut Vec<String>) -> Vec<Item> {
        let extractor = ItemExtractor::new();
        let mut items = Vec::new();

        for line in lines {
            match extractor.parse_row(line.text()) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(err) => {
                    warn!("Skipping item row '{}': {}", line.text(), err);
                    warnings.push(format!("Skipped item row: {}", err));
                }
            }
        }

        debug!(
            "Parsed {} items, subtotal {}",
            items.len(),
            items.iter().map(|i| i.total).sum::<Decimal>()
        );
        items
    }

    fn reference_year(&self) -> i32 {
        self.config
            .reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

impl Default for TemplateDocumentParser {
    fn default() -> Self {
        Self::new(&DocumentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn lines(texts: &[&str]) -> Vec<Line> {
        texts.iter().map(|t| Line::from_text(*t)).collect()
    }

    fn parser() -> TemplateDocumentParser {
        TemplateDocumentParser::new(&DocumentConfig {
            reference_year: Some(2025),
            ..DocumentConfig::default()
        })
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parses_header_and_deduplicated_client() {
        let lines = lines(&[
            "DOCUMENTO DI TRASPORTO",
            "4681 21/05/25 1 5712",
            "DONAC S.R.L.   DONAC S.R.L.",
            "VIA ROMA 12 VIA SALUZZO 10",
        ]);

        let document = parser().parse(&lines, DocumentType::DeliveryNote).unwrap();
        assert_eq!(document.document_number, "4681");
        assert_eq!(document.date, "21/05/2025");
        assert_eq!(document.page_number, Some(1));
        assert_eq!(document.client_code, "5712");
        assert_eq!(document.client_name, "DONAC S.R.L.");
        assert_eq!(document.delivery_address, "VIA SALUZZO 10");
        assert_eq!(document.metadata.address_resolution, AddressResolution::TemplateLayout);
    }

    #[test]
    fn test_full_document() {
        let lines = lines(&[
            "4681 21/05/25 1 5712",
            "DONAC S.R.L.   DONAC S.R.L.",
            "VIA ROMA 12 VIA SALUZZO 10",
            "10100 TORINO TO 12030 MONASTEROLO DI SAVIGLIANO CN",
            "P.IVA 01234567890",
            "Rif. Vs. Ordine n. 4500123 del 12/05",
            "090009 GRISSINI ST/MANO PZ 280 3,9500 1.106,00 04",
            "090011 CRACKERS CT 2 12,00 24,00 10",
            "IMPONIBILE 1.130,00",
            "TOTALE DOCUMENTO 1.176,64",
        ]);

        let document = parser().parse(&lines, DocumentType::DeliveryNote).unwrap();
        assert_eq!(
            document.delivery_address,
            "VIA SALUZZO 10 12030 MONASTEROLO DI SAVIGLIANO CN"
        );
        assert_eq!(document.vat_number, Some("01234567890".to_string()));
        assert_eq!(document.order_reference, Some("4500123".to_string()));
        assert_eq!(document.order_date, Some("12/05/2025".to_string()));
        assert_eq!(document.items.len(), 2);
        assert_eq!(document.subtotal, dec("1130.00"));
        assert_eq!(document.vat, dec("46.64"));
        assert_eq!(document.printed_total, Some(dec("1176.64")));
        assert_eq!(document.total, dec("1176.64"));
        assert!(!document.metadata.totals_discrepancy);
        assert!(!document.metadata.needs_review);
    }

    #[test]
    fn test_discrepancy_keeps_printed_total_and_subtotal() {
        let lines = lines(&[
            "4681 21/05/25 1 5712",
            "DONAC S.R.L.",
            "090009 GRISSINI ST/MANO PZ 280 3,9500 1.106,00 04",
            "TOTALE DOCUMENTO 1.200,00",
        ]);

        let document = parser().parse(&lines, DocumentType::Unknown).unwrap();
        assert_eq!(document.subtotal, dec("1106.00"));
        assert_eq!(document.total, dec("1200.00"));
        assert!(document.metadata.totals_discrepancy);
        assert!(document.metadata.needs_review);
    }

    #[test]
    fn test_total_falls_back_to_subtotal_plus_vat() {
        let lines = lines(&[
            "4681 21/05/25 1 5712",
            "DONAC S.R.L.",
            "090009 GRISSINI ST/MANO PZ 280 3,9500 1.106,00 04",
        ]);

        let document = parser().parse(&lines, DocumentType::DeliveryNote).unwrap();
        assert_eq!(document.printed_total, None);
        assert_eq!(document.total, dec("1150.24"));
        assert!(!document.metadata.totals_discrepancy);
    }

    #[test]
    fn test_operator_507_is_not_an_order_reference() {
        let lines = lines(&[
            "4681 21/05/25 1 5712",
            "DONAC S.R.L.",
            "Rif. Vs. Ordine n. 4681",
            "Operatore",
            "507 ROSSI",
        ]);

        let document = parser().parse(&lines, DocumentType::DeliveryNote).unwrap();
        assert_eq!(document.order_reference, None);
        assert_eq!(document.order_date, None);
    }

    #[test]
    fn test_missing_header_is_unsupported_template() {
        let lines = lines(&["FATTURA", "VIA ROMA 1"]);

        let err = parser().parse(&lines, DocumentType::Invoice).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedTemplate { .. }));
        assert!(matches!(
            parser().parse(&[], DocumentType::Invoice),
            Err(ExtractionError::NoText)
        ));
    }
}
