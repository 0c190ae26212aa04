//! Configuration structures for the extraction pipeline.
//!
//! Every positional constant used by the heuristics lives here so it can be
//! recalibrated per template family without touching code.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DdtxError, Result};

/// Main configuration for the ddtx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Line grouping configuration.
    pub layout: LayoutConfig,

    /// Column detection configuration.
    pub columns: ColumnConfig,

    /// Delivery address strategy configuration.
    pub address: AddressConfig,

    /// Document field parser configuration.
    pub document: DocumentConfig,
}

/// Line grouping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum vertical distance between a token and the current line.
    pub vertical_tolerance: f32,

    /// Horizontal gap above which a column break is inserted.
    pub column_gap: f32,

    /// Horizontal gap above which a single space is inserted.
    pub word_gap: f32,

    /// Text inserted at a column break.
    pub column_break: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            vertical_tolerance: 5.0,
            column_gap: 100.0,
            word_gap: 10.0,
            column_break: "  ".to_string(),
        }
    }
}

/// Column detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Number of leading lines searched for the header.
    pub header_scan_lines: usize,

    /// Distance left of the "cliente" keyword where the client column starts.
    pub client_left_padding: f32,

    /// Width of the client column.
    pub client_width: f32,

    /// Distance left of the "consegna" keyword where the delivery column starts.
    pub delivery_left_padding: f32,

    /// The delivery column never starts left of this offset.
    pub delivery_min_x: f32,

    /// Width of the delivery column, measured from the keyword.
    pub delivery_width: f32,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            header_scan_lines: 20,
            client_left_padding: 20.0,
            client_width: 150.0,
            delivery_left_padding: 20.0,
            delivery_min_x: 290.0,
            delivery_width: 300.0,
        }
    }
}

/// Delivery address strategy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressConfig {
    /// Minimum confidence for taking the best result verbatim instead of merging.
    pub confidence_threshold: f32,

    /// Number of lines scanned below a column header.
    pub column_lines: usize,

    /// Horizontal tolerance around a keyword column.
    pub column_tolerance: f32,

    /// Lines of context searched around a delivery keyword.
    pub keyword_context_radius: usize,

    /// Maximum address lines kept around a delivery keyword.
    pub keyword_max_candidates: usize,

    /// Tokens right of this offset are considered part of the delivery column.
    pub right_column_min_x: f32,

    /// Offset right of the client name where the delivery column is assumed.
    pub relative_column_offset: f32,

    /// Lines searched after each client name occurrence.
    pub fuzzy_lookahead: usize,

    /// Maximum row distance between pattern matches of the same address.
    pub match_group_distance: usize,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            column_lines: 10,
            column_tolerance: 100.0,
            keyword_context_radius: 5,
            keyword_max_candidates: 5,
            right_column_min_x: 250.0,
            relative_column_offset: 100.0,
            fuzzy_lookahead: 5,
            match_group_distance: 2,
        }
    }
}

/// Document field parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// VAT numbers of the issuer, never reported as the client's.
    pub issuer_vat_exclusions: Vec<String>,

    /// Allowed difference between printed and computed totals.
    pub total_tolerance: Decimal,

    /// Number of trailing lines searched for the printed total.
    pub totals_scan_lines: usize,

    /// Year used to complete order dates with a missing or corrupted year.
    /// Defaults to the current local year.
    pub reference_year: Option<i32>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            issuer_vat_exclusions: vec!["03247720042".to_string()],
            total_tolerance: Decimal::new(1, 2),
            totals_scan_lines: 10,
            reference_year: None,
        }
    }
}

impl ExtractionConfig {
    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn check(&self) -> Result<()> {
        let threshold = self.address.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DdtxError::Config(format!(
                "address.confidence_threshold must be within 0.0..=1.0, got {threshold}"
            )));
        }
        if self.layout.word_gap > self.layout.column_gap {
            return Err(DdtxError::Config(
                "layout.word_gap must not exceed layout.column_gap".to_string(),
            ));
        }
        Ok(())
    }
}
