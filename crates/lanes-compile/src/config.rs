//! Compilation settings.

use std::fmt;
use std::str::FromStr;

use lanes_analysis::DEFAULT_MAX_ITERATIONS;
use lanes_arch::{BusReuseHeuristic, PathHeuristic, ZeroHeuristic};
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::placement::{
    ConflictAwarePlacementStrategy, LogicalPlacementStrategy, PlacementStrategy,
};
use crate::routing::HeuristicFactory;

/// The built-in placement strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// [`LogicalPlacementStrategy`].
    #[default]
    Logical,
    /// [`ConflictAwarePlacementStrategy`].
    ConflictAware,
}

impl StrategyKind {
    /// All built-in strategies.
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Logical, StrategyKind::ConflictAware];

    /// Configuration name of the strategy.
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Logical => "logical",
            StrategyKind::ConflictAware => "conflict_aware",
        }
    }

    /// Instantiate the strategy.
    pub fn build(self) -> Box<dyn PlacementStrategy> {
        match self {
            StrategyKind::Logical => Box::new(LogicalPlacementStrategy),
            StrategyKind::ConflictAware => Box::new(ConflictAwarePlacementStrategy),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.replace('-', "_"))
            .ok_or_else(|| CompileError::UnknownStrategy(s.to_string()))
    }
}

/// The built-in path tie-break heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    /// [`ZeroHeuristic`]: the first shortest path wins.
    Zero,
    /// [`BusReuseHeuristic`]: prefer buses already used in the layer.
    #[default]
    BusReuse,
}

impl HeuristicKind {
    /// All built-in heuristics.
    pub const ALL: [HeuristicKind; 2] = [HeuristicKind::Zero, HeuristicKind::BusReuse];

    /// Configuration name of the heuristic.
    pub fn name(self) -> &'static str {
        match self {
            HeuristicKind::Zero => "zero",
            HeuristicKind::BusReuse => "bus_reuse",
        }
    }
}

impl HeuristicFactory for HeuristicKind {
    fn layer_heuristic(&self) -> Box<dyn PathHeuristic> {
        match self {
            HeuristicKind::Zero => Box::new(ZeroHeuristic),
            HeuristicKind::BusReuse => Box::new(BusReuseHeuristic::new()),
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HeuristicKind {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeuristicKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.replace('-', "_"))
            .ok_or_else(|| CompileError::UnknownHeuristic(s.to_string()))
    }
}

/// Settings for one compilation.
///
/// Every field has a default, so a configuration file only needs the
/// fields it changes:
///
/// ```
/// use lanes_compile::{CompileConfig, StrategyKind};
///
/// let config: CompileConfig = serde_json::from_str(r#"{"strategy": "conflict_aware"}"#).unwrap();
/// assert_eq!(config.strategy, StrategyKind::ConflictAware);
/// assert!(config.validate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Placement strategy.
    pub strategy: StrategyKind,
    /// Path tie-break heuristic for placement and synthesis.
    pub heuristic: HeuristicKind,
    /// Run address validation on the lowered program.
    pub validate: bool,
    /// Block-visit cap for atom-state interpretation.
    pub max_iterations: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            heuristic: HeuristicKind::default(),
            validate: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
            assert_eq!(kind.build().name(), kind.name());
        }
        assert_eq!(
            "conflict-aware".parse::<StrategyKind>().unwrap(),
            StrategyKind::ConflictAware
        );
        assert!(matches!(
            "sabre".parse::<StrategyKind>(),
            Err(CompileError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_yaml_defaults() {
        let config: CompileConfig = serde_yaml_ng::from_str("validate: false\n").unwrap();
        assert_eq!(config.strategy, StrategyKind::Logical);
        assert_eq!(config.heuristic, HeuristicKind::BusReuse);
        assert!(!config.validate);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_heuristic_names() {
        for kind in HeuristicKind::ALL {
            assert_eq!(kind.to_string().parse::<HeuristicKind>().unwrap(), kind);
        }
        assert_eq!(
            "bus-reuse".parse::<HeuristicKind>().unwrap(),
            HeuristicKind::BusReuse
        );
        assert!(matches!(
            "random".parse::<HeuristicKind>(),
            Err(CompileError::UnknownHeuristic(_))
        ));

        let config: CompileConfig = serde_json::from_str(r#"{"heuristic": "zero"}"#).unwrap();
        assert_eq!(config.heuristic, HeuristicKind::Zero);
        assert_eq!(config.strategy, StrategyKind::Logical);
    }
}
