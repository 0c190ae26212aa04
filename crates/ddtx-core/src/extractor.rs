//! End-to-end extraction of one source document.

use tracing::{debug, info, warn};

use crate::address::{ExtractionHints, ResolvedAddress, ResultCombiner, StrategyPipeline};
use crate::document::TemplateDocumentParser;
use crate::error::{ExtractionError, Result};
use crate::layout::{Line, LineGrouper};
use crate::models::config::ExtractionConfig;
use crate::models::document::{AddressResolution, Document, SourceDocument};

/// Extracts a [`Document`] from positioned tokens.
///
/// Holds only configuration and the strategy registry; every call works on its
/// own data, so one extractor can be shared across threads.
pub struct DocumentExtractor {
    config: ExtractionConfig,
    grouper: LineGrouper,
    parser: TemplateDocumentParser,
    pipeline: StrategyPipeline,
    combiner: ResultCombiner,
}

impl DocumentExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            grouper: LineGrouper::new(&config.layout),
            parser: TemplateDocumentParser::new(&config.document),
            pipeline: StrategyPipeline::new(&config.address, &config.columns),
            combiner: ResultCombiner::new(config.address.confidence_threshold),
            config,
        }
    }

    /// Replace the address strategy pipeline.
    pub fn with_pipeline(mut self, pipeline: StrategyPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract a document from its pages of tokens.
    pub fn extract(&self, source: &SourceDocument) -> Result<Document> {
        let lines = self.grouper.group_pages(&source.pages);
        if lines.is_empty() {
            return Err(ExtractionError::NoText.into());
        }

        let document_type = source.document_type();
        debug!("{} lines, type hint {:?}", lines.len(), document_type);

        let mut document = self.parser.parse(&lines, document_type)?;

        let hints = ExtractionHints::new().with_client_name(document.client_name.clone());
        let resolved = self
            .resolve_delivery_address(&lines, &hints)
            .filter(|r| !r.formatted.is_empty());

        match resolved {
            Some(resolved)
                if document.delivery_address.is_empty()
                    || resolved.confidence >= self.config.address.confidence_threshold =>
            {
                document.metadata.address_resolution = resolution_of(&resolved);
                document.delivery_address = resolved.formatted;
            }
            _ => {}
        }

        if document.delivery_address.is_empty() {
            warn!("Delivery address not determined for {}", document.document_number);
            document.metadata.address_resolution = AddressResolution::Undetermined;
            document.metadata.needs_review = true;
            document
                .metadata
                .warnings
                .push(ExtractionError::AddressNotDetermined.to_string());
        }

        let issues = document.validate();
        document.metadata.warnings.extend(issues);
        document.metadata.warnings.dedup();

        info!(
            "Extracted {} ({} items, address via {:?})",
            document.document_number,
            document.items.len(),
            document.metadata.address_resolution
        );
        Ok(document)
    }

    /// Run the address strategies and combine their results.
    ///
    /// `None` means no strategy produced anything; the caller should report the
    /// address as not determined.
    pub fn resolve_delivery_address(
        &self,
        lines: &[Line],
        hints: &ExtractionHints,
    ) -> Option<ResolvedAddress> {
        let results = self.pipeline.run(lines, hints);
        self.combiner.combine(&results)
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

fn resolution_of(resolved: &ResolvedAddress) -> AddressResolution {
    match resolved.method {
        Some(method) => AddressResolution::Strategy {
            method,
            confidence: resolved.confidence,
        },
        None => AddressResolution::Merged {
            confidence: resolved.confidence,
            sources: resolved.sources.clone(),
        },
    }
}
