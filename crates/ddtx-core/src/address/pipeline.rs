//! Strategy pipeline with a per-strategy failure boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::error::StrategyError;
use crate::layout::Line;
use crate::models::config::{AddressConfig, ColumnConfig};

use super::strategies::default_strategies;
use super::{AddressStrategy, ExtractionHints, ExtractionResult, StrategyId};

/// Ordered registry of address strategies.
pub struct StrategyPipeline {
    strategies: Vec<Box<dyn AddressStrategy>>,
}

impl StrategyPipeline {
    /// Create a pipeline with the default strategies.
    pub fn new(address: &AddressConfig, columns: &ColumnConfig) -> Self {
        Self {
            strategies: default_strategies(address, columns),
        }
    }

    /// Create a pipeline without strategies.
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Append a strategy; it runs after the ones already registered.
    pub fn with_strategy(mut self, strategy: Box<dyn AddressStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Identifiers of the registered strategies, in run order.
    pub fn strategy_ids(&self) -> Vec<StrategyId> {
        self.strategies.iter().map(|s| s.id()).collect()
    }

    /// Run every strategy and collect their results in registry order.
    ///
    /// A strategy that errors or panics is logged and treated as having
    /// produced nothing; the remaining strategies still run.
    pub fn run(&self, lines: &[Line], hints: &ExtractionHints) -> Vec<ExtractionResult> {
        let mut results = Vec::new();

        for strategy in &self.strategies {
            let id = strategy.id();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.extract(lines, hints)))
                .unwrap_or_else(|payload| {
                    Err(StrategyError::Panicked {
                        strategy: id.to_string(),
                        message: panic_message(payload.as_ref()),
                    })
                });

            match outcome {
                Ok(Some(result)) if result.confidence() > 0.0 => {
                    debug!(
                        strategy = %id,
                        confidence = result.confidence(),
                        "Strategy produced {}",
                        result.address().format()
                    );
                    results.push(result);
                }
                Ok(_) => debug!(strategy = %id, "Strategy produced no result"),
                Err(err) => warn!(strategy = %id, "Address strategy skipped: {}", err),
            }
        }

        results
    }
}

impl Default for StrategyPipeline {
    fn default() -> Self {
        Self::new(&AddressConfig::default(), &ColumnConfig::default())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
