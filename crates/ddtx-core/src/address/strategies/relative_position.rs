//! Relative position strategy.

use crate::address::grammar::{is_address_line, parse_address_lines};
use crate::address::{AddressStrategy, ExtractionHints, ExtractionResult, StrategyId};
use crate::error::StrategyError;
use crate::layout::Line;
use crate::models::config::AddressConfig;

const CONFIDENCE: f32 = 0.6;

/// Treats everything well right of the client name as the delivery column.
pub struct RelativePositionStrategy {
    offset: f32,
    column_lines: usize,
}

impl RelativePositionStrategy {
    pub fn new(config: &AddressConfig) -> Self {
        Self {
            offset: config.relative_column_offset,
            column_lines: config.column_lines,
        }
    }
}

impl AddressStrategy for RelativePositionStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::RelativePosition
    }

    fn extract(
        &self,
        lines: &[Line],
        hints: &ExtractionHints,
    ) -> Result<Option<ExtractionResult>, StrategyError> {
        let Some(name) = hints.client_name() else {
            return Ok(None);
        };

        let Some(anchor) = lines.iter().position(|line| line.contains_ignore_case(name)) else {
            return Ok(None);
        };
        let min_x = lines[anchor].average_x() + self.offset;

        let candidates: Vec<String> = lines
            .iter()
            .skip(anchor + 1)
            .take(self.column_lines)
            .map(|line| {
                line.tokens()
                    .iter()
                    .filter(|t| t.x() > min_x)
                    .map(|t| t.text().trim())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|text| is_address_line(text))
            .collect();

        let fields = parse_address_lines(&candidates);
        if fields.is_empty() {
            return Ok(None);
        }

        Ok(Some(ExtractionResult::new(fields, CONFIDENCE, self.id())))
    }
}
