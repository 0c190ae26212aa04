//! Line grouping of positioned tokens.

use std::mem;

use tracing::trace;

use crate::models::config::LayoutConfig;

use super::{Line, LineSegment, PositionedToken};

/// Groups a token stream into lines by vertical tolerance.
#[derive(Debug, Clone)]
pub struct LineGrouper {
    vertical_tolerance: f32,
    column_gap: f32,
    word_gap: f32,
    column_break: String,
}

impl LineGrouper {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            vertical_tolerance: config.vertical_tolerance,
            column_gap: config.column_gap,
            word_gap: config.word_gap,
            column_break: config.column_break.clone(),
        }
    }

    /// Group tokens given in reading order into lines.
    ///
    /// A token joins the current line while its Y stays within the vertical
    /// tolerance of the previous token; otherwise it starts a new line.
    /// Whitespace-only tokens are dropped.
    pub fn group(&self, tokens: &[PositionedToken]) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut current: Vec<PositionedToken> = Vec::new();
        let mut current_y: Option<f32> = None;

        for token in tokens.iter().filter(|t| !t.text().trim().is_empty()) {
            if let Some(y) = current_y {
                if (token.y() - y).abs() > self.vertical_tolerance {
                    lines.push(self.build_line(mem::take(&mut current)));
                }
            }
            current_y = Some(token.y());
            current.push(token.clone());
        }

        if !current.is_empty() {
            lines.push(self.build_line(current));
        }

        trace!("Grouped {} tokens into {} lines", tokens.len(), lines.len());
        lines
    }

    /// Group each page independently and concatenate the lines in page order.
    pub fn group_pages(&self, pages: &[Vec<PositionedToken>]) -> Vec<Line> {
        pages.iter().flat_map(|page| self.group(page)).collect()
    }

    fn build_line(&self, mut tokens: Vec<PositionedToken>) -> Line {
        tokens.sort_by(|a, b| a.x().total_cmp(&b.x()));

        let mut text = String::new();
        let mut segments = Vec::new();
        let mut segment_text = String::new();
        let mut segment_x = tokens.first().map(|t| t.x()).unwrap_or_default();
        let mut last_x = 0.0_f32;

        for (i, token) in tokens.iter().enumerate() {
            let gap = token.x() - last_x;

            if gap > self.column_gap && !text.is_empty() {
                text.push_str(&self.column_break);
                segments.push(LineSegment::new(mem::take(&mut segment_text), segment_x));
                segment_x = token.x();
            } else if i > 0 && gap > self.word_gap {
                text.push(' ');
                segment_text.push(' ');
            }

            text.push_str(token.text());
            segment_text.push_str(token.text());
            last_x = token.end_x();
        }

        if !segment_text.is_empty() {
            segments.push(LineSegment::new(segment_text, segment_x));
        }

        Line::new(tokens, text, segments)
    }
}

impl Default for LineGrouper {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}
