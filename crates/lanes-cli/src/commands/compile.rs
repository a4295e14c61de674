//! Compile command implementation.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use lanes_compile::{CompileConfig, Compiler, InitialLayout, LayerPlacement, MoveLayer};
use lanes_ir::{GateProgram, MoveProgram};

use super::common::{load_arch, load_document};

/// Arguments of the compile command.
pub struct CompileArgs<'a> {
    pub input: &'a str,
    pub layout: &'a str,
    pub output: Option<&'a str>,
    pub arch: &'a str,
    pub config: Option<&'a str>,
    pub strategy: Option<&'a str>,
    pub heuristic: Option<&'a str>,
    pub validate: bool,
}

#[derive(Serialize)]
struct CompileOutput<'a> {
    program: &'a MoveProgram,
    placements: &'a [LayerPlacement],
    move_layers: &'a [Vec<MoveLayer>],
    min_bits: usize,
    num_detectors: usize,
    num_observables: usize,
}

/// Execute the compile command.
pub fn execute(args: &CompileArgs<'_>) -> Result<()> {
    eprintln!(
        "{} Compiling {} for {}",
        style("→").cyan().bold(),
        style(args.input).green(),
        style(args.arch).yellow()
    );

    let arch = Arc::new(load_arch(args.arch)?);
    let program: GateProgram = load_document(args.input)?;
    let layout: InitialLayout = load_document(args.layout)?;

    let mut config: CompileConfig = match args.config {
        Some(path) => load_document(path)?,
        None => CompileConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.parse()?;
    }
    if let Some(heuristic) = args.heuristic {
        config.heuristic = heuristic.parse()?;
    }
    if !args.validate {
        config.validate = false;
    }

    eprintln!(
        "  Loaded: {} qubits, {} gate layers, strategy {}, heuristic {}",
        program.num_qubits,
        program.layers.len(),
        config.strategy,
        config.heuristic
    );

    let compiled = Compiler::new(arch)
        .with_config(config)
        .compile(&program, &layout)?;

    eprintln!("{} Compilation complete", style("✓").green().bold());
    eprintln!(
        "  Result: {} move layers, {} lane moves, {} statements",
        compiled.num_move_layers(),
        compiled.num_moves(),
        compiled.program.num_statements()
    );

    let output = CompileOutput {
        program: &compiled.program,
        placements: &compiled.placements,
        move_layers: &compiled.move_layers,
        min_bits: compiled.post_processing.min_bits(),
        num_detectors: compiled.post_processing.num_detectors(),
        num_observables: compiled.post_processing.num_observables(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
            eprintln!("  Output: {}", style(path).green());
        }
        None => println!("{json}"),
    }

    Ok(())
}
