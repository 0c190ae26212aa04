//! Confidence-based combination of strategy results.

use tracing::debug;

use super::{AddressFields, ExtractionResult, ResolvedAddress, StrategyId};

/// Picks the best result when it is confident enough, otherwise merges fields.
#[derive(Debug, Clone)]
pub struct ResultCombiner {
    threshold: f32,
}

impl ResultCombiner {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Combine strategy results into one address.
    ///
    /// Returns `None` only when there are no results. Results are ranked by
    /// descending confidence, ties keeping their input (registry) order. A top
    /// result at or above the threshold is returned verbatim; otherwise each
    /// field takes the first non-empty value in rank order, so a field once
    /// filled is never overwritten by a lower-ranked result.
    pub fn combine(&self, results: &[ExtractionResult]) -> Option<ResolvedAddress> {
        let mut ranked: Vec<&ExtractionResult> = results.iter().collect();
        ranked.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));

        let top = *ranked.first()?;
        if top.confidence() >= self.threshold {
            debug!("Using {} result verbatim ({:.2})", top.method(), top.confidence());
            return Some(ResolvedAddress {
                fields: top.address().clone(),
                formatted: top.address().format(),
                confidence: top.confidence(),
                method: Some(top.method()),
                sources: vec![top.method()],
            });
        }

        let mut fields = AddressFields::default();
        let mut sources: Vec<StrategyId> = Vec::new();

        for result in &ranked {
            let address = result.address();
            let mut contributed = false;

            for (target, value) in [
                (&mut fields.street, &address.street),
                (&mut fields.additional_info, &address.additional_info),
                (&mut fields.postal_code, &address.postal_code),
                (&mut fields.city, &address.city),
                (&mut fields.province, &address.province),
            ] {
                if target.is_empty() && !value.is_empty() {
                    *target = value.clone();
                    contributed = true;
                }
            }

            if contributed && !sources.contains(&result.method()) {
                sources.push(result.method());
            }
        }

        debug!("Merged address from {:?}", sources);
        Some(ResolvedAddress {
            formatted: fields.format(),
            fields,
            confidence: top.confidence(),
            method: None,
            sources,
        })
    }
}

impl Default for ResultCombiner {
    fn default() -> Self {
        Self::new(0.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(
        street: &str,
        postal_code: &str,
        city: &str,
        confidence: f32,
        method: StrategyId,
    ) -> ExtractionResult {
        ExtractionResult::new(
            AddressFields {
                street: street.to_string(),
                postal_code: postal_code.to_string(),
                city: city.to_string(),
                ..AddressFields::default()
            },
            confidence,
            method,
        )
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert_eq!(ResultCombiner::default().combine(&[]), None);
    }

    #[test]
    fn test_confident_result_is_taken_verbatim() {
        let results = vec![
            result("VIA ROMA 1", "10100", "TORINO", 0.7, StrategyId::KeywordProximity),
            result("VIA SALUZZO 10", "", "", 0.9, StrategyId::ColumnPosition),
        ];

        let resolved = ResultCombiner::default().combine(&results).unwrap();
        assert_eq!(&resolved.fields, results[1].address());
        assert_eq!(resolved.formatted, "VIA SALUZZO 10");
        assert_eq!(resolved.method, Some(StrategyId::ColumnPosition));
        assert_eq!(resolved.confidence, 0.9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let results = vec![result("VIA PO 1", "", "", 0.8, StrategyId::PatternMatching)];
        let resolved = ResultCombiner::default().combine(&results).unwrap();
        assert_eq!(resolved.method, Some(StrategyId::PatternMatching));
    }

    #[test]
    fn test_merge_fills_fields_without_overwriting() {
        let results = vec![
            result("", "12030", "MONASTEROLO", 0.5, StrategyId::FuzzySearch),
            result("VIA SALUZZO 10", "", "", 0.7, StrategyId::PatternMatching),
            result("VIA ROMA 1", "10100", "TORINO", 0.6, StrategyId::RelativePosition),
        ];

        let resolved = ResultCombiner::default().combine(&results).unwrap();
        assert_eq!(resolved.fields.street, "VIA SALUZZO 10");
        assert_eq!(resolved.fields.postal_code, "10100");
        assert_eq!(resolved.fields.city, "TORINO");
        assert_eq!(resolved.fields.province, "");
        assert_eq!(resolved.method, None);
        assert_eq!(resolved.confidence, 0.7);
        assert_eq!(
            resolved.sources,
            vec![StrategyId::PatternMatching, StrategyId::RelativePosition]
        );
    }

    #[test]
    fn test_merge_never_regresses() {
        let results = vec![
            result("", "", "", 0.6, StrategyId::RelativePosition),
            result("", "", "CUNEO", 0.5, StrategyId::FuzzySearch),
        ];

        let resolved = ResultCombiner::default().combine(&results).unwrap();
        let fields = &resolved.fields;
        assert!(fields.street.is_empty());
        assert!(fields.postal_code.is_empty());
        assert_eq!(fields.city, "CUNEO");
    }

    #[test]
    fn test_equal_confidence_keeps_registry_order() {
        let results = vec![
            result("VIA PRIMA 1", "", "", 0.7, StrategyId::KeywordProximity),
            result("VIA SECONDA 2", "", "", 0.7, StrategyId::PatternMatching),
        ];

        let resolved = ResultCombiner::default().combine(&results).unwrap();
        assert_eq!(resolved.fields.street, "VIA PRIMA 1");
    }
}
