//! Token and line model for positioned text.

pub mod columns;
pub mod grouper;

pub use columns::{ColumnLabel, ColumnLayout, ColumnLocator, ColumnSpec};
pub use grouper::LineGrouper;

use serde::{Deserialize, Serialize};

/// A piece of text with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    text: String,
    x: f32,
    y: f32,
    #[serde(default)]
    width: f32,
}

impl PositionedToken {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Right edge of the token.
    pub fn end_x(&self) -> f32 {
        self.x + self.width
    }
}

/// Run of tokens within a line that is not interrupted by a column break.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    text: String,
    x: f32,
}

impl LineSegment {
    pub(crate) fn new(text: String, x: f32) -> Self {
        Self { text, x }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// X of the first token in the segment.
    pub fn x(&self) -> f32 {
        self.x
    }
}

/// Tokens sharing a vertical band, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    tokens: Vec<PositionedToken>,
    text: String,
    segments: Vec<LineSegment>,
}

impl Line {
    pub(crate) fn new(tokens: Vec<PositionedToken>, text: String, segments: Vec<LineSegment>) -> Self {
        Self {
            tokens,
            text,
            segments,
        }
    }

    /// Build a single-token line at X = 0 from already reconstructed text.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            tokens: vec![PositionedToken::new(text.clone(), 0.0, 0.0, 0.0)],
            segments: vec![LineSegment::new(text.clone(), 0.0)],
            text,
        }
    }

    /// Reconstructed text with gap-sensitive spacing.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[PositionedToken] {
        &self.tokens
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    /// Mean X of the line's tokens.
    pub fn average_x(&self) -> f32 {
        if self.tokens.is_empty() {
            return 0.0;
        }
        self.tokens.iter().map(|t| t.x()).sum::<f32>() / self.tokens.len() as f32
    }

    /// Y of the first token of the line.
    pub fn y(&self) -> f32 {
        self.tokens.first().map(|t| t.y()).unwrap_or_default()
    }

    /// Case-insensitive substring test on the line text.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(&needle.to_lowercase())
    }
}
