//! Data models for extraction configuration and extracted documents.

pub mod config;
pub mod document;

pub use config::{AddressConfig, ColumnConfig, DocumentConfig, ExtractionConfig, LayoutConfig};
pub use document::{
    AddressResolution, Document, DocumentMetadata, DocumentType, Item, SourceDocument,
};
