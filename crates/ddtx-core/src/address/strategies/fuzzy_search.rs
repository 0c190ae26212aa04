//! Fuzzy search strategy.

use crate::address::grammar::{is_address_line, parse_address_lines};
use crate::address::{
    AddressFields, AddressStrategy, ExtractionHints, ExtractionResult, StrategyId,
};
use crate::error::StrategyError;
use crate::layout::Line;
use crate::models::config::AddressConfig;

const BASE_CONFIDENCE: f32 = 0.5;
const RIGHT_COLUMN_BONUS: f32 = 0.2;

/// Looks for address lines below every occurrence of the client name and keeps
/// the one found under the rightmost occurrence.
pub struct FuzzySearchStrategy {
    lookahead: usize,
    tolerance: f32,
    right_column_min_x: f32,
}

impl FuzzySearchStrategy {
    pub fn new(config: &AddressConfig) -> Self {
        Self {
            lookahead: config.fuzzy_lookahead,
            tolerance: config.column_tolerance,
            right_column_min_x: config.right_column_min_x,
        }
    }

    /// Address-shaped segments below an occurrence, aligned with its X.
    fn candidates_below(&self, lines: &[Line], row: usize, x: f32) -> Vec<String> {
        lines
            .iter()
            .skip(row + 1)
            .take(self.lookahead)
            .flat_map(|line| line.segments())
            .filter(|segment| (segment.x() - x).abs() <= self.tolerance)
            .filter(|segment| is_address_line(segment.text()))
            .map(|segment| segment.text().to_string())
            .collect()
    }
}

impl AddressStrategy for FuzzySearchStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::FuzzySearch
    }

    fn extract(
        &self,
        lines: &[Line],
        hints: &ExtractionHints,
    ) -> Result<Option<ExtractionResult>, StrategyError> {
        let Some(name) = hints.client_name() else {
            return Ok(None);
        };
        let name = name.to_lowercase();

        let mut best: Option<(f32, AddressFields)> = None;
        for (row, line) in lines.iter().enumerate() {
            for segment in line.segments() {
                if !segment.text().to_lowercase().contains(&name) {
                    continue;
                }

                let candidates = self.candidates_below(lines, row, segment.x());
                let fields = parse_address_lines(&candidates);
                if fields.is_empty() {
                    continue;
                }

                if best.as_ref().is_none_or(|(best_x, _)| segment.x() > *best_x) {
                    best = Some((segment.x(), fields));
                }
            }
        }

        Ok(best.map(|(x, fields)| {
            let confidence = if x > self.right_column_min_x {
                BASE_CONFIDENCE + RIGHT_COLUMN_BONUS
            } else {
                BASE_CONFIDENCE
            };
            ExtractionResult::new(fields, confidence, self.id())
        }))
    }
}
