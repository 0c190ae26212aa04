//! Address strategies, in priority order.

pub mod column_position;
pub mod fuzzy_search;
pub mod keyword_proximity;
pub mod pattern_matching;
pub mod relative_position;
pub mod two_column;

pub use column_position::ColumnPositionStrategy;
pub use fuzzy_search::FuzzySearchStrategy;
pub use keyword_proximity::KeywordProximityStrategy;
pub use pattern_matching::PatternMatchingStrategy;
pub use relative_position::RelativePositionStrategy;
pub use two_column::TwoColumnLayoutStrategy;

use crate::layout::ColumnLocator;
use crate::models::config::{AddressConfig, ColumnConfig};

use super::AddressStrategy;

/// Build the default strategy registry. Order breaks confidence ties.
pub fn default_strategies(
    address: &AddressConfig,
    columns: &ColumnConfig,
) -> Vec<Box<dyn AddressStrategy>> {
    vec![
        Box::new(TwoColumnLayoutStrategy::new(ColumnLocator::new(columns), address)),
        Box::new(ColumnPositionStrategy::new(address, columns)),
        Box::new(KeywordProximityStrategy::new(address)),
        Box::new(PatternMatchingStrategy::new(address)),
        Box::new(RelativePositionStrategy::new(address)),
        Box::new(FuzzySearchStrategy::new(address)),
    ]
}

/// Drop candidate lines that repeat the client name, and collapse a name
/// printed twice on one line ("ACME ACME") to a single occurrence.
pub(crate) fn drop_client_name(lines: Vec<String>, client_name: Option<&str>) -> Vec<String> {
    let Some(name) = client_name else {
        return lines;
    };
    let name = name.to_uppercase();
    let doubled = format!("{name} {name}");

    lines
        .into_iter()
        .filter(|line| {
            let upper = line.trim().to_uppercase();
            let collapsed = upper.split_whitespace().collect::<Vec<_>>().join(" ");
            collapsed != name && collapsed != doubled
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::layout::{Line, LineGrouper, PositionedToken};

    /// Build lines from `(text, x, y)` tokens; every token is 6 units per char wide.
    pub fn lines(tokens: &[(&str, f32, f32)]) -> Vec<Line> {
        let tokens: Vec<PositionedToken> = tokens
            .iter()
            .map(|(text, x, y)| PositionedToken::new(*text, *x, *y, text.len() as f32 * 6.0))
            .collect();
        LineGrouper::default().group(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_drop_client_name() {
        let lines = vec![
            "Donac S.R.L.".to_string(),
            "DONAC S.R.L.  DONAC S.R.L.".to_string(),
            "VIA SALUZZO 10".to_string(),
        ];
        assert_eq!(
            drop_client_name(lines.clone(), Some("DONAC S.R.L.")),
            vec!["VIA SALUZZO 10".to_string()]
        );
        assert_eq!(drop_client_name(lines.clone(), None), lines);
    }

    #[test]
    fn test_default_registry_order() {
        let ids: Vec<_> = default_strategies(&AddressConfig::default(), &ColumnConfig::default())
            .iter()
            .map(|s| s.id())
            .collect();
        assert_eq!(
            ids,
            vec![
                crate::address::StrategyId::TwoColumnLayout,
                crate::address::StrategyId::ColumnPosition,
                crate::address::StrategyId::KeywordProximity,
                crate::address::StrategyId::PatternMatching,
                crate::address::StrategyId::RelativePosition,
                crate::address::StrategyId::FuzzySearch,
            ]
        );
    }
}
