//! Two-column layout strategy.

use tracing::debug;

use crate::address::grammar::{is_payment_or_operator, parse_address_lines};
use crate::address::{AddressStrategy, ExtractionHints, ExtractionResult, StrategyId};
use crate::error::StrategyError;
use crate::layout::{ColumnLocator, Line};
use crate::models::config::AddressConfig;

use super::drop_client_name;

const CONFIDENCE: f32 = 0.95;

/// Reads the delivery column located from the "cliente"/"consegna" header.
pub struct TwoColumnLayoutStrategy {
    locator: ColumnLocator,
    column_lines: usize,
}

impl TwoColumnLayoutStrategy {
    pub fn new(locator: ColumnLocator, config: &AddressConfig) -> Self {
        Self {
            locator,
            column_lines: config.column_lines,
        }
    }
}

impl AddressStrategy for TwoColumnLayoutStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::TwoColumnLayout
    }

    fn extract(
        &self,
        lines: &[Line],
        hints: &ExtractionHints,
    ) -> Result<Option<ExtractionResult>, StrategyError> {
        let layout = self.locator.locate(lines);
        let (Some(header), Some(delivery)) = (layout.header_index, layout.delivery) else {
            return Ok(None);
        };

        let mut candidates = Vec::new();
        for line in lines.iter().skip(header + 1).take(self.column_lines) {
            let text = line
                .tokens()
                .iter()
                .filter(|t| delivery.contains(t.x()))
                .map(|t| t.text().trim())
                .collect::<Vec<_>>()
                .join(" ");

            if text.is_empty() || is_payment_or_operator(&text) {
                continue;
            }
            candidates.push(text);
        }

        let candidates = drop_client_name(candidates, hints.client_name());
        debug!("Delivery column candidates: {:?}", candidates);

        let fields = parse_address_lines(&candidates);
        if fields.street.is_empty() {
            return Ok(None);
        }

        Ok(Some(ExtractionResult::new(fields, CONFIDENCE, self.id())))
    }
}
