//! Pattern matching strategy.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::address::grammar::parse_address_lines;
use crate::address::{AddressStrategy, ExtractionHints, ExtractionResult, StrategyId};
use crate::error::StrategyError;
use crate::layout::Line;
use crate::models::config::AddressConfig;

const RIGHT_COLUMN_CONFIDENCE: f32 = 0.9;
const LEFT_COLUMN_CONFIDENCE: f32 = 0.7;
const RIGHT_COLUMN_BONUS: usize = 50;

lazy_static! {
    static ref STREET_MATCH: Regex = Regex::new(
        r"(?i)\b(?:via|v\.le|viale|corso|c\.so|piazza|p\.zza|strada|loc\.|località)\s+[^,\n]+(?:,\s*\d+)?"
    ).unwrap();

    static ref POSTAL_MATCH: Regex = Regex::new(
        r"\b\d{5}\s+[A-Z][A-Za-z\s\-]+\s+[A-Z]{2}\b"
    ).unwrap();

    static ref UNLOADING_ENTRANCE_MATCH: Regex = Regex::new(
        r"(?i)ingr\.?\s*(?:scarico|consegna)?\s*:?\s*(?:via|v\.le)[^\n]+"
    ).unwrap();

    // Carrier section: addresses below it belong to the transporter.
    static ref CARRIER_SECTION: Regex = Regex::new(r"(?i)vettore|trasportatore").unwrap();
}

fn address_patterns() -> [&'static Regex; 3] {
    [&*STREET_MATCH, &*POSTAL_MATCH, &*UNLOADING_ENTRANCE_MATCH]
}

#[derive(Debug, Clone)]
struct PatternMatch {
    row: usize,
    x: f32,
    text: String,
    confidence: f32,
}

/// Applies street and postal regexes to every line before the carrier section.
pub struct PatternMatchingStrategy {
    right_column_min_x: f32,
    group_distance: usize,
}

impl PatternMatchingStrategy {
    pub fn new(config: &AddressConfig) -> Self {
        Self {
            right_column_min_x: config.right_column_min_x,
            group_distance: config.match_group_distance,
        }
    }

    fn collect_matches(&self, lines: &[Line]) -> Vec<PatternMatch> {
        let carrier = lines
            .iter()
            .position(|line| CARRIER_SECTION.is_match(line.text()))
            .unwrap_or(lines.len());

        let mut matches = Vec::new();
        for (row, line) in lines[..carrier].iter().enumerate() {
            for segment in line.segments() {
                for pattern in address_patterns() {
                    for m in pattern.find_iter(segment.text()) {
                        let confidence = if segment.x() > self.right_column_min_x {
                            RIGHT_COLUMN_CONFIDENCE
                        } else {
                            LEFT_COLUMN_CONFIDENCE
                        };
                        matches.push(PatternMatch {
                            row,
                            x: segment.x(),
                            text: m.as_str().trim().to_string(),
                            confidence,
                        });
                    }
                }
            }
        }
        matches
    }

    /// Split row-ordered matches into groups of nearby rows.
    fn group(&self, mut matches: Vec<PatternMatch>) -> Vec<Vec<PatternMatch>> {
        matches.sort_by_key(|m| m.row);

        let mut groups: Vec<Vec<PatternMatch>> = Vec::new();
        for m in matches {
            match groups.last_mut() {
                Some(group)
                    if group
                        .last()
                        .is_some_and(|last| m.row - last.row <= self.group_distance) =>
                {
                    group.push(m)
                }
                _ => groups.push(vec![m]),
            }
        }
        groups
    }

    fn score(&self, group: &[PatternMatch]) -> usize {
        let average_x = group.iter().map(|m| m.x).sum::<f32>() / group.len() as f32;
        let bonus = if average_x > self.right_column_min_x {
            RIGHT_COLUMN_BONUS
        } else {
            0
        };
        group.len() * 10 + bonus
    }
}

impl AddressStrategy for PatternMatchingStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::PatternMatching
    }

    fn extract(
        &self,
        lines: &[Line],
        _hints: &ExtractionHints,
    ) -> Result<Option<ExtractionResult>, StrategyError> {
        let groups = self.group(self.collect_matches(lines));

        let mut best: Option<(usize, Vec<PatternMatch>)> = None;
        for group in groups {
            let score = self.score(&group);
            if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
                best = Some((score, group));
            }
        }

        let Some((score, mut group)) = best else {
            return Ok(None);
        };

        // Right-column matches first, so they win first-wins field assignment.
        group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let confidence = group
            .iter()
            .map(|m| m.confidence)
            .fold(RIGHT_COLUMN_CONFIDENCE, f32::min);

        let texts: Vec<&str> = group.iter().map(|m| m.text.as_str()).collect();
        debug!("Best pattern group (score {}): {:?}", score, texts);

        let fields = parse_address_lines(&texts);
        if fields.is_empty() {
            return Ok(None);
        }

        Ok(Some(ExtractionResult::new(fields, confidence, self.id())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::strategies::test_support::lines;
    use pretty_assertions::assert_eq;

    fn strategy() -> PatternMatchingStrategy {
        PatternMatchingStrategy::new(&AddressConfig::default())
    }

    #[test]
    fn test_prefers_right_column_group() {
        let lines = lines(&[
            ("VIA ROMA 12", 50.0, 700.0),
            ("VIA SALUZZO 10", 320.0, 700.0),
            ("10100 TORINO TO", 50.0, 680.0),
            ("12030 MONASTEROLO DI SAVIGLIANO CN", 320.0, 680.0),
        ]);

        let result = strategy().extract(&lines, &ExtractionHints::new()).unwrap().unwrap();

        assert_eq!(result.address().street, "VIA SALUZZO 10");
        assert_eq!(result.address().postal_code, "12030");
        assert_eq!(result.address().city, "MONASTEROLO DI SAVIGLIANO");
        // Group mixes both columns, so it scores with the weakest match.
        assert_eq!(result.confidence(), 0.7);
    }

    #[test]
    fn test_right_column_only_scores_high() {
        let lines = lines(&[
            ("VIA SALUZZO 10", 320.0, 700.0),
            ("12030 MONASTEROLO DI SAVIGLIANO CN", 320.0, 680.0),
        ]);

        let result = strategy().extract(&lines, &ExtractionHints::new()).unwrap().unwrap();
        assert_eq!(result.confidence(), 0.9);
    }

    #[test]
    fn test_ignores_carrier_section() {
        let lines = lines(&[
            ("Vettore: TRASPORTI VELOCI", 50.0, 300.0),
            ("VIA DEI CAMION 1", 320.0, 280.0),
            ("12100 CUNEO CN", 320.0, 260.0),
        ]);

        assert!(strategy().extract(&lines, &ExtractionHints::new()).unwrap().is_none());
    }

    #[test]
    fn test_larger_group_wins() {
        let lines = lines(&[
            ("VIA SOLITARIA 1", 50.0, 900.0),
            ("riga", 50.0, 880.0),
            ("riga", 50.0, 860.0),
            ("riga", 50.0, 840.0),
            ("CORSO FRANCIA 5", 50.0, 820.0),
            ("10138 TORINO TO", 50.0, 800.0),
        ]);

        let result = strategy().extract(&lines, &ExtractionHints::new()).unwrap().unwrap();
        assert_eq!(result.address().street, "CORSO FRANCIA 5");
        assert_eq!(result.address().city, "TORINO");
    }
}
