//! Arch command implementation.

use anyhow::Result;
use console::style;

use lanes_arch::ArchDescription;

use super::common::load_arch;

/// Execute the arch command.
pub fn execute(name: &str, json: bool) -> Result<()> {
    let arch = load_arch(name)?;

    if json {
        let description = ArchDescription::from(arch);
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }

    println!(
        "{} Architecture {}",
        style("→").cyan().bold(),
        style(name).green()
    );
    println!("  Words:       {}", arch.num_words());
    println!(
        "  Sites:       {}",
        arch.words().iter().map(|w| w.num_sites()).sum::<usize>()
    );
    println!("  Zones:       {}", arch.zones().len());
    println!("  Site buses:  {}", arch.site_buses().len());
    println!("  Word buses:  {}", arch.word_buses().len());
    println!("  Encoding:    {}", style(arch.encoding()).yellow());

    let word_bus_sites: Vec<String> = arch.word_bus_sites().map(|s| s.to_string()).collect();
    println!("  Word-bus sites: {}", word_bus_sites.join(", "));

    for (zone, words) in arch.zones().iter().enumerate() {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        println!("  Zone {}: words {}", style(zone).cyan(), words.join(", "));
    }

    Ok(())
}
