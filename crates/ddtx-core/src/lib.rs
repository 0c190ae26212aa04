//! Core library for DDT/FT field extraction.
//!
//! This crate provides:
//! - Line grouping of positioned text tokens (as produced by a PDF text layer)
//! - Column detection for two-column delivery note templates
//! - A pipeline of delivery address strategies with confidence-based combination
//! - A template parser for header metadata, order references, line items and totals
//!
//! Extraction is pure: no I/O, no global state. Build a [`DocumentExtractor`] per
//! configuration and call it from as many threads as needed.

pub mod address;
pub mod document;
pub mod error;
pub mod extractor;
pub mod layout;
pub mod models;

pub use address::{
    AddressFields, AddressStrategy, ExtractionHints, ExtractionResult, ResolvedAddress,
    ResultCombiner, StrategyId, StrategyPipeline,
};
pub use document::TemplateDocumentParser;
pub use error::{DdtxError, ExtractionError, Result, StrategyError};
pub use extractor::DocumentExtractor;
pub use layout::{Line, LineGrouper, LineSegment, PositionedToken};
pub use models::config::ExtractionConfig;
pub use models::document::{
    AddressResolution, Document, DocumentMetadata, DocumentType, Item, SourceDocument,
};
