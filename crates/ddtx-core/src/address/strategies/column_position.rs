//! Column position strategy.

use tracing::debug;

use crate::address::grammar::{is_address_line, is_header_or_footer, parse_address_lines};
use crate::address::{AddressStrategy, ExtractionHints, ExtractionResult, StrategyId};
use crate::error::StrategyError;
use crate::layout::Line;
use crate::models::config::{AddressConfig, ColumnConfig};

const CONFIDENCE: f32 = 0.9;

/// Keywords whose token X marks the delivery column, most specific first.
const COLUMN_KEYWORDS: &[&str] = &["luogo di consegna", "destinazione", "consegna", "destino"];

/// Collects tokens aligned with the first delivery keyword of the header area.
pub struct ColumnPositionStrategy {
    header_scan_lines: usize,
    column_lines: usize,
    tolerance: f32,
}

impl ColumnPositionStrategy {
    pub fn new(address: &AddressConfig, columns: &ColumnConfig) -> Self {
        Self {
            header_scan_lines: columns.header_scan_lines,
            column_lines: address.column_lines,
            tolerance: address.column_tolerance,
        }
    }

    /// First header row holding a keyword inside a single token, with that token's X.
    ///
    /// Rows are scanned top-down and every keyword is tried on a row before
    /// moving to the next one, so the earliest row wins.
    fn find_header(&self, lines: &[Line]) -> Option<(usize, &'static str, f32)> {
        lines
            .iter()
            .take(self.header_scan_lines)
            .enumerate()
            .find_map(|(index, line)| {
                let text = line.text().to_lowercase();
                COLUMN_KEYWORDS
                    .iter()
                    .copied()
                    .filter(|keyword| text.contains(keyword))
                    .find_map(|keyword| {
                        line.tokens()
                            .iter()
                            .find(|t| t.text().to_lowercase().contains(keyword))
                            .map(|t| (index, keyword, t.x()))
                    })
            })
    }

    fn column_below(&self, lines: &[Line], header: usize, column_x: f32) -> Vec<String> {
        lines
            .iter()
            .skip(header + 1)
            .take(self.column_lines)
            .map(|line| {
                line.tokens()
                    .iter()
                    .filter(|t| (t.x() - column_x).abs() <= self.tolerance)
                    .map(|t| t.text().trim())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|text| !text.is_empty() && !is_header_or_footer(text))
            .collect()
    }
}

impl AddressStrategy for ColumnPositionStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::ColumnPosition
    }

    fn extract(
        &self,
        lines: &[Line],
        hints: &ExtractionHints,
    ) -> Result<Option<ExtractionResult>, StrategyError> {
        let Some((header, keyword, column_x)) = self.find_header(lines) else {
            debug!("No delivery keyword in first {} lines", self.header_scan_lines);
            return Ok(None);
        };

        let mut candidates = self.column_below(lines, header, column_x);

        // Leading client name, only when an address line follows it.
        if let (Some(name), Some(first)) = (hints.client_name(), candidates.first()) {
            let repeats_name = first.to_uppercase().contains(&name.to_uppercase());
            let followed_by_address = candidates.get(1).is_some_and(|next| is_address_line(next));
            if repeats_name && followed_by_address {
                candidates.remove(0);
            }
        }

        let fields = parse_address_lines(&candidates);
        if fields.street.is_empty() {
            return Ok(None);
        }

        debug!("Column keyword '{}' at line {} x={} yielded {:?}", keyword, header, column_x, fields);
        Ok(Some(ExtractionResult::new(fields, CONFIDENCE, self.id())))
    }
}
