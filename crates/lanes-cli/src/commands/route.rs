//! Route command implementation.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;

use lanes_arch::{Encode, PathFinder};
use lanes_compile::{HeuristicFactory, HeuristicKind};

use super::common::{load_arch, parse_location};

/// Execute the route command.
///
/// A single query has nothing committed, so the heuristic defaults to
/// [`HeuristicKind::Zero`].
pub fn execute(
    arch: &str,
    from: &str,
    to: &str,
    avoid: &[String],
    heuristic: Option<&str>,
) -> Result<()> {
    let arch = Arc::new(load_arch(arch)?);
    let start = parse_location(from)?;
    let end = parse_location(to)?;
    let occupied = avoid
        .iter()
        .map(|s| parse_location(s))
        .collect::<Result<BTreeSet<_>>>()?;
    let heuristic = match heuristic {
        Some(name) => name.parse()?,
        None => HeuristicKind::Zero,
    };

    arch.validate_location(start)?;
    arch.validate_location(end)?;
    let encoding = arch.encoding();
    let finder = PathFinder::new(arch);

    println!(
        "{} Routing {} to {} over {} lanes ({} heuristic)",
        style("→").cyan().bold(),
        style(start).green(),
        style(end).green(),
        finder.num_lanes(),
        heuristic
    );

    let path = finder
        .find_path(start, end, &occupied, heuristic.layer_heuristic().as_ref())
        .with_context(|| format!("No path from {start} to {end}"))?;

    if path.is_empty() {
        println!("{} Already there", style("✓").green().bold());
        return Ok(());
    }

    for segment in &path.segments {
        let address = segment.lane.get_address(encoding)?;
        println!(
            "  {} {} -> {}  {}",
            style(segment.lane).cyan(),
            segment.src,
            segment.dst,
            style(format!("{address:#x}")).dim()
        );
    }
    println!(
        "{} {} lanes",
        style("✓").green().bold(),
        style(path.len()).yellow()
    );

    Ok(())
}
