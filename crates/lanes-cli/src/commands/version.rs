//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - move compilation for neutral-atom devices",
        style("Lanes").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  lanes-arch      Architecture model, addressing and path finding");
    println!("  lanes-ir        Movement programs and gate layers");
    println!("  lanes-analysis  Atom-state interpretation and post-processing");
    println!("  lanes-compile   Placement, move synthesis and pass pipeline");
    println!("  lanes-cli       Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
