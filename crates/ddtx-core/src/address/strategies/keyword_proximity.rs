//! Keyword proximity strategy.

use std::collections::BTreeMap;

use crate::address::grammar::{is_address_line, parse_address_lines};
use crate::address::{AddressStrategy, ExtractionHints, ExtractionResult, StrategyId};
use crate::error::StrategyError;
use crate::layout::Line;
use crate::models::config::AddressConfig;

const CONFIDENCE: f32 = 0.7;

const DELIVERY_KEYWORDS: &[&str] = &[
    "consegna",
    "scarico",
    "destinazione",
    "destino",
    "presso",
    "recapito",
];

/// Collects address-shaped lines around delivery keywords.
pub struct KeywordProximityStrategy {
    radius: usize,
    max_candidates: usize,
}

impl KeywordProximityStrategy {
    pub fn new(config: &AddressConfig) -> Self {
        Self {
            radius: config.keyword_context_radius,
            max_candidates: config.keyword_max_candidates,
        }
    }
}

impl AddressStrategy for KeywordProximityStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::KeywordProximity
    }

    fn extract(
        &self,
        lines: &[Line],
        _hints: &ExtractionHints,
    ) -> Result<Option<ExtractionResult>, StrategyError> {
        // line index -> closest distance to any keyword line
        let mut nearby: BTreeMap<usize, usize> = BTreeMap::new();

        for (index, line) in lines.iter().enumerate() {
            let text = line.text().to_lowercase();
            if !DELIVERY_KEYWORDS.iter().any(|k| text.contains(k)) {
                continue;
            }

            let start = index.saturating_sub(self.radius);
            let end = (index + self.radius).min(lines.len() - 1);
            for candidate in start..=end {
                if candidate == index || !is_address_line(lines[candidate].text()) {
                    continue;
                }
                let distance = candidate.abs_diff(index);
                nearby
                    .entry(candidate)
                    .and_modify(|d| *d = (*d).min(distance))
                    .or_insert(distance);
            }
        }

        if nearby.is_empty() {
            return Ok(None);
        }

        let mut ranked: Vec<(usize, usize)> = nearby.into_iter().collect();
        ranked.sort_by_key(|&(index, distance)| (distance, index));
        ranked.truncate(self.max_candidates);
        ranked.sort_by_key(|&(index, _)| index);

        let candidates: Vec<&str> = ranked.iter().map(|&(index, _)| lines[index].text()).collect();
        let fields = parse_address_lines(&candidates);
        if fields.is_empty() {
            return Ok(None);
        }

        Ok(Some(ExtractionResult::new(fields, CONFIDENCE, self.id())))
    }
}
