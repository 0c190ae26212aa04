//! Delivery address extraction.
//!
//! Independent strategies each try to find the delivery address in the line
//! model; the [`StrategyPipeline`] runs them behind a failure boundary and the
//! [`ResultCombiner`] picks or merges their results by confidence.

pub mod combiner;
pub mod grammar;
pub mod pipeline;
pub mod strategies;

pub use combiner::ResultCombiner;
pub use pipeline::StrategyPipeline;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::layout::Line;

/// Structured Italian address. Empty strings mark absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub street: String,
    pub additional_info: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

impl AddressFields {
    /// True when no field is populated.
    pub fn is_empty(&self) -> bool {
        self.street.is_empty()
            && self.additional_info.is_empty()
            && self.postal_code.is_empty()
            && self.city.is_empty()
            && self.province.is_empty()
    }

    /// Render as `street additional_info postal_code city province`, skipping empty parts.
    pub fn format(&self) -> String {
        [
            &self.street,
            &self.additional_info,
            &self.postal_code,
            &self.city,
            &self.province,
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Identifier of an address strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    TwoColumnLayout,
    ColumnPosition,
    KeywordProximity,
    PatternMatching,
    RelativePosition,
    FuzzySearch,
}

impl StrategyId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoColumnLayout => "two_column_layout",
            Self::ColumnPosition => "column_position",
            Self::KeywordProximity => "keyword_proximity",
            Self::PatternMatching => "pattern_matching",
            Self::RelativePosition => "relative_position",
            Self::FuzzySearch => "fuzzy_search",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate address produced by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    address: AddressFields,
    confidence: f32,
    method: StrategyId,
}

impl ExtractionResult {
    pub fn new(address: AddressFields, confidence: f32, method: StrategyId) -> Self {
        Self {
            address,
            confidence,
            method,
        }
    }

    pub fn address(&self) -> &AddressFields {
        &self.address
    }

    /// Ordering key for combination; not a calibrated probability.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn method(&self) -> StrategyId {
        self.method
    }
}

/// Optional knowledge about the document that anchors some strategies.
#[derive(Debug, Clone, Default)]
pub struct ExtractionHints {
    /// Client name, when already known.
    pub client_name: Option<String>,
}

impl ExtractionHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client name. Blank names are ignored.
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.trim();
        self.client_name = (!name.is_empty()).then(|| name.to_string());
        self
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }
}

/// One independent way of finding the delivery address.
pub trait AddressStrategy: Send + Sync {
    /// Identifier used for logging and provenance.
    fn id(&self) -> StrategyId;

    /// Try to extract the delivery address. `Ok(None)` means "nothing found".
    fn extract(
        &self,
        lines: &[Line],
        hints: &ExtractionHints,
    ) -> Result<Option<ExtractionResult>, StrategyError>;
}

/// Address selected or merged by the [`ResultCombiner`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub fields: AddressFields,
    /// Formatted single-line address.
    pub formatted: String,
    pub confidence: f32,
    /// Strategy whose result was taken verbatim; `None` for merged results.
    pub method: Option<StrategyId>,
    /// Strategies that contributed at least one field.
    pub sources: Vec<StrategyId>,
}
