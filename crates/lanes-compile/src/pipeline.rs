//! End-to-end compilation from gate layers to a checked movement program.

use std::sync::Arc;

use lanes_analysis::{AtomAnalysis, PostProcessing};
use lanes_arch::{ArchSpec, PathFinder};
use lanes_ir::{GateProgram, MoveProgram};
use tracing::{info, instrument};

use crate::config::{CompileConfig, HeuristicKind, StrategyKind};
use crate::error::{CompileError, CompileResult};
use crate::lower::lower_to_move_program;
use crate::manager::PassManagerBuilder;
use crate::placement::{InitialLayout, LayerPlacement, PlacementAnalysis, PlacementStrategy};
use crate::property::PropertySet;
use crate::routing::HeuristicFactory;
use crate::synthesis::{MoveLayer, compute_move_layers_along};

/// The output of [`Compiler::compile`].
#[derive(Debug)]
pub struct CompiledProgram {
    /// The lowered and cleaned-up movement program.
    pub program: MoveProgram,
    /// Placement before and after every gate layer.
    pub placements: Vec<LayerPlacement>,
    /// Move layers issued before every gate layer.
    pub move_layers: Vec<Vec<MoveLayer>>,
    /// Atom-state analysis of `program`.
    pub analysis: AtomAnalysis,
    /// Per-shot result extraction.
    pub post_processing: PostProcessing,
}

impl CompiledProgram {
    /// Total number of move layers.
    pub fn num_move_layers(&self) -> usize {
        self.move_layers.iter().map(Vec::len).sum()
    }

    /// Total number of lanes moved across all layers.
    pub fn num_moves(&self) -> usize {
        self.move_layers.iter().flatten().map(MoveLayer::len).sum()
    }
}

/// Compiles gate programs for one architecture.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use lanes_arch::{LocationAddress, presets};
/// use lanes_compile::{Compiler, InitialLayout};
/// use lanes_ir::{GateProgram, QubitId};
///
/// let arch = Arc::new(presets::logical().unwrap());
/// let mut program = GateProgram::new(2);
/// program.cz([QubitId(0)], [QubitId(1)]).measure();
///
/// let layout = InitialLayout::new([LocationAddress::new(0, 0), LocationAddress::new(0, 1)]);
/// let compiled = Compiler::new(arch).compile(&program, &layout).unwrap();
/// assert_eq!(compiled.num_moves(), 1);
/// ```
pub struct Compiler {
    path_finder: Arc<PathFinder>,
    strategy: Box<dyn PlacementStrategy>,
    heuristics: Box<dyn HeuristicFactory>,
    config: CompileConfig,
}

impl Compiler {
    /// Create a compiler with the default configuration.
    pub fn new(arch: Arc<ArchSpec>) -> Self {
        Self::from_path_finder(Arc::new(PathFinder::new(arch)))
    }

    /// Create a compiler sharing an existing lane graph.
    pub fn from_path_finder(path_finder: Arc<PathFinder>) -> Self {
        let config = CompileConfig::default();
        Self {
            path_finder,
            strategy: config.strategy.build(),
            heuristics: Box::new(config.heuristic),
            config,
        }
    }

    /// Replace the configuration, including strategy and heuristic.
    #[must_use]
    pub fn with_config(mut self, config: CompileConfig) -> Self {
        self.strategy = config.strategy.build();
        self.heuristics = Box::new(config.heuristic);
        self.config = config;
        self
    }

    /// Use a custom placement strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl PlacementStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    /// Use a built-in placement strategy.
    #[must_use]
    pub fn with_strategy_kind(mut self, kind: StrategyKind) -> Self {
        self.config.strategy = kind;
        self.strategy = kind.build();
        self
    }

    /// Use a custom source of path tie-break heuristics.
    ///
    /// The factory is asked for a fresh heuristic for every gate layer, in
    /// placement and again in synthesis.
    #[must_use]
    pub fn with_heuristic(mut self, heuristics: impl HeuristicFactory + 'static) -> Self {
        self.heuristics = Box::new(heuristics);
        self
    }

    /// Use a built-in path tie-break heuristic.
    #[must_use]
    pub fn with_heuristic_kind(mut self, kind: HeuristicKind) -> Self {
        self.config.heuristic = kind;
        self.heuristics = Box::new(kind);
        self
    }

    /// Enable or disable address validation.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.config.validate = validate;
        self
    }

    /// Set the interpreter's block-visit cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// The target architecture.
    pub fn arch(&self) -> &ArchSpec {
        self.path_finder.arch()
    }

    /// The active configuration.
    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Name of the active placement strategy.
    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Place, synthesize, lower and analyze a gate program.
    #[instrument(
        skip_all,
        fields(
            qubits = program.num_qubits,
            layers = program.layers.len(),
            strategy = self.strategy.name(),
        )
    )]
    pub fn compile(
        &self,
        program: &GateProgram,
        initial: &InitialLayout,
    ) -> CompileResult<CompiledProgram> {
        program.validate()?;
        let arch = self.arch();

        let placement = PlacementAnalysis::new(&self.path_finder, self.strategy.as_ref(), initial)
            .with_heuristics(self.heuristics.as_ref());
        let num_qubits = usize::try_from(program.num_qubits).unwrap_or(usize::MAX);
        let initial_state = placement.get_initial_state(num_qubits)?;
        let placements = placement.run(program)?;

        let move_layers = placements
            .iter()
            .map(|layer| {
                let imprecise = || CompileError::ImprecisePlacement { layer: layer.index };
                let before = layer.before.as_concrete().ok_or_else(imprecise)?;
                let after = layer.after.as_concrete().ok_or_else(imprecise)?;
                compute_move_layers_along(
                    &self.path_finder,
                    before,
                    after,
                    &layer.paths,
                    self.heuristics.layer_heuristic(),
                )
            })
            .collect::<CompileResult<Vec<_>>>()?;

        let lowered =
            lower_to_move_program(arch, program, &initial_state, &placements, &move_layers)?;
        let (program, analysis) = self.run_passes(lowered)?;
        let post_processing = analysis.post_processing()?;

        let compiled = CompiledProgram {
            program,
            placements,
            move_layers,
            analysis,
            post_processing,
        };
        info!(
            move_layers = compiled.num_move_layers(),
            moves = compiled.num_moves(),
            statements = compiled.program.num_statements(),
            "Compiled gate program"
        );
        Ok(compiled)
    }

    /// Run the standard pass pipeline on an already lowered program.
    pub fn run_passes(
        &self,
        mut program: MoveProgram,
    ) -> CompileResult<(MoveProgram, AtomAnalysis)> {
        let properties = PropertySet::new()
            .with_path_finder(Arc::clone(&self.path_finder))
            .with_max_iterations(self.config.max_iterations);
        let (pm, mut properties) = PassManagerBuilder::new()
            .with_validation(self.config.validate)
            .with_properties(properties)
            .build();
        pm.run(&mut program, &mut properties)?;
        let analysis = properties
            .remove::<AtomAnalysis>()
            .ok_or(CompileError::MissingProperty("atom state analysis"))?;
        Ok((program, analysis))
    }
}

#[cfg(test)]
mod tests {
    use lanes_arch::{LocationAddress, presets};
    use lanes_ir::QubitId;

    use super::*;

    fn compiler() -> Compiler {
        Compiler::new(Arc::new(presets::logical().unwrap()))
    }

    #[test]
    fn test_config_selects_strategy() {
        let compiler = compiler().with_config(CompileConfig {
            strategy: StrategyKind::ConflictAware,
            ..CompileConfig::default()
        });
        assert_eq!(compiler.strategy_name(), "conflict_aware");
        let compiler = compiler.with_strategy_kind(StrategyKind::Logical);
        assert_eq!(compiler.strategy_name(), "logical");
        assert_eq!(compiler.config().strategy, StrategyKind::Logical);
    }

    #[test]
    fn test_too_few_sites() {
        let mut program = GateProgram::new(3);
        program.measure();
        let layout = InitialLayout::new([LocationAddress::new(0, 0)]);
        assert!(matches!(
            compiler().compile(&program, &layout),
            Err(CompileError::TooFewSites {
                required: 3,
                available: 1
            })
        ));
    }

    #[test]
    fn test_invalid_program_is_rejected() {
        let mut program = GateProgram::new(1);
        program.cz([QubitId(0)], [QubitId(4)]);
        let layout = InitialLayout::new([LocationAddress::new(0, 0)]);
        assert!(matches!(
            compiler().compile(&program, &layout),
            Err(CompileError::Ir(_))
        ));
    }

    #[test]
    fn test_heuristic_follows_config() {
        let compiler = compiler().with_config(CompileConfig {
            heuristic: HeuristicKind::Zero,
            ..CompileConfig::default()
        });
        assert_eq!(compiler.config().heuristic, HeuristicKind::Zero);
        let compiler = compiler.with_heuristic_kind(HeuristicKind::BusReuse);
        assert_eq!(compiler.config().heuristic, HeuristicKind::BusReuse);
    }
}
