//! Column detection from header keywords.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::config::ColumnConfig;

use super::Line;

/// Semantic meaning of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnLabel {
    Client,
    Delivery,
}

/// Horizontal band of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub label: ColumnLabel,
    pub min_x: f32,
    pub max_x: f32,
}

impl ColumnSpec {
    /// Check if an X coordinate falls inside the column.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }
}

/// Columns derived from the header line of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLayout {
    /// Index of the header line.
    pub header_index: Option<usize>,
    pub client: Option<ColumnSpec>,
    pub delivery: Option<ColumnSpec>,
}

/// Locates the "cliente"/"consegna" header and derives column bands from it.
#[derive(Debug, Clone)]
pub struct ColumnLocator {
    config: ColumnConfig,
}

impl ColumnLocator {
    pub fn new(config: &ColumnConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Scan the leading lines for the header and derive columns from its tokens.
    ///
    /// Returns an empty layout when no header line is found.
    pub fn locate(&self, lines: &[Line]) -> ColumnLayout {
        let header = lines
            .iter()
            .take(self.config.header_scan_lines)
            .position(|line| {
                let text = line.text().to_lowercase();
                text.contains("cliente") && text.contains("consegna")
            });

        let Some(header_index) = header else {
            debug!("No column header found in first {} lines", self.config.header_scan_lines);
            return ColumnLayout::default();
        };

        let mut layout = ColumnLayout {
            header_index: Some(header_index),
            ..ColumnLayout::default()
        };

        for token in lines[header_index].tokens() {
            let text = token.text().to_lowercase();
            let x = token.x();

            if text.contains("cliente") && !text.contains("consegna") {
                layout.client.get_or_insert(ColumnSpec {
                    label: ColumnLabel::Client,
                    min_x: x - self.config.client_left_padding,
                    max_x: x + self.config.client_width,
                });
            } else if text.contains("consegna") || text.contains("destinazione") {
                layout.delivery.get_or_insert(ColumnSpec {
                    label: ColumnLabel::Delivery,
                    min_x: (x - self.config.delivery_left_padding).max(self.config.delivery_min_x),
                    max_x: x + self.config.delivery_width,
                });
            }
        }

        debug!(
            "Column header at line {}: client={:?}, delivery={:?}",
            header_index, layout.client, layout.delivery
        );
        layout
    }
}

impl Default for ColumnLocator {
    fn default() -> Self {
        Self::new(&ColumnConfig::default())
    }
}
