//! Document data models.
//!
//! `Document` is the only value that leaves the extraction core. It carries no
//! timestamps or timings, so extracting the same tokens twice serializes to the
//! same bytes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::address::StrategyId;
use crate::layout::PositionedToken;

/// Positioned text of a source file, as produced by a PDF text layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Original file name, used only for the document type hint.
    #[serde(default)]
    pub file_name: String,

    /// Tokens of each page, in reading order.
    pub pages: Vec<Vec<PositionedToken>>,
}

impl SourceDocument {
    /// Create a single-page source document.
    pub fn single_page(file_name: impl Into<String>, tokens: Vec<PositionedToken>) -> Self {
        Self {
            file_name: file_name.into(),
            pages: vec![tokens],
        }
    }

    /// Document type hint derived from the file name.
    pub fn document_type(&self) -> DocumentType {
        DocumentType::from_file_name(&self.file_name)
    }
}

/// Kind of business document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Delivery note (DDT).
    DeliveryNote,
    /// Invoice (FT).
    Invoice,
    /// No hint available.
    #[default]
    Unknown,
}

impl DocumentType {
    /// Guess the document type from a file name such as `DDV_4681.pdf` or `FTV_701.pdf`.
    pub fn from_file_name(file_name: &str) -> Self {
        let stem = std::path::Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name)
            .to_uppercase();

        for word in stem.split(|c: char| !c.is_ascii_alphanumeric()) {
            if word.starts_with("DDT") || word.starts_with("DDV") {
                return Self::DeliveryNote;
            }
            if word.starts_with("FATTURA") || word.starts_with("FTV") || word == "FT" {
                return Self::Invoice;
            }
            if word.starts_with("FT") && word[2..].chars().all(|c| c.is_ascii_digit()) {
                return Self::Invoice;
            }
        }

        Self::Unknown
    }
}

/// Extracted delivery note or invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document type hint the document was parsed with.
    pub document_type: DocumentType,

    /// Document number.
    pub document_number: String,

    /// Document date, `dd/mm/yyyy`.
    pub date: String,

    /// Page number printed in the header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,

    /// Client code.
    pub client_code: String,

    /// Client name, deduplicated.
    pub client_name: String,

    /// Formatted delivery address, empty when not determined.
    pub delivery_address: String,

    /// Client VAT number (partita IVA).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,

    /// Client order reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,

    /// Date of the client order, `dd/mm/yyyy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,

    /// Line items.
    #[serde(default)]
    pub items: Vec<Item>,

    /// Sum of item totals.
    pub subtotal: Decimal,

    /// VAT computed with each item's own rate.
    pub vat: Decimal,

    /// Grand total: the printed one when found, otherwise subtotal plus VAT.
    pub total: Decimal,

    /// Grand total as printed on the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printed_total: Option<Decimal>,

    /// Extraction metadata.
    pub metadata: DocumentMetadata,
}

/// Line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Article code.
    pub code: String,

    /// Description.
    pub description: String,

    /// Unit of measure (PZ, KG, ...).
    pub unit: String,

    /// Quantity.
    pub quantity: Decimal,

    /// Unit price.
    pub unit_price: Decimal,

    /// Discount percentage; 100 for free goods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<Decimal>,

    /// Merchandise discount ("sconto merce") code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchandise_discount: Option<Decimal>,

    /// VAT rate in percent.
    pub vat_rate: u8,

    /// Line total.
    pub total: Decimal,
}

/// How the delivery address was determined.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddressResolution {
    /// A single strategy result cleared the confidence threshold.
    Strategy { method: StrategyId, confidence: f32 },
    /// Fields were merged from several strategy results.
    Merged {
        confidence: f32,
        sources: Vec<StrategyId>,
    },
    /// Taken from the fixed template layout by the document field parser.
    TemplateLayout,
    /// Nothing found.
    #[default]
    Undetermined,
}

/// Metadata about the extraction process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// How the delivery address was determined.
    pub address_resolution: AddressResolution,

    /// The printed total disagrees with subtotal plus VAT.
    #[serde(default)]
    pub totals_discrepancy: bool,

    /// The document should be checked by a person.
    #[serde(default)]
    pub needs_review: bool,

    /// Warnings or issues encountered during extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Document {
    /// Validate the document data and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.document_number.is_empty() {
            issues.push("Missing document number".to_string());
        }

        if self.client_name.is_empty() {
            issues.push("Missing client name".to_string());
        }

        if self.delivery_address.is_empty() {
            issues.push("Missing delivery address".to_string());
        }

        if let Some(vat) = &self.vat_number {
            if vat.len() != 11 || !vat.chars().all(|c| c.is_ascii_digit()) {
                issues.push(format!("Malformed VAT number: {}", vat));
            }
        }

        if self.items.is_empty() {
            issues.push("No line items".to_string());
        }

        if self.metadata.totals_discrepancy {
            if let Some(printed) = self.printed_total {
                issues.push(format!(
                    "Printed total ({}) differs from subtotal plus VAT ({})",
                    printed,
                    self.subtotal + self.vat
                ));
            }
        }

        issues
    }
}
