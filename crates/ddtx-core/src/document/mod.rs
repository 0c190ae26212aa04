//! Document field parsing for the two-column DDT/FT template.

pub mod parser;
pub mod rules;

pub use parser::TemplateDocumentParser;
