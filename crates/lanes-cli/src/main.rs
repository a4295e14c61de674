//! Lanes Command-Line Interface
//!
//! Inspect architectures, route single atoms and compile gate programs
//! into movement programs.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{arch, compile, route, version};

/// Lanes - move compilation for neutral-atom devices
#[derive(Parser)]
#[command(name = "lanes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe an architecture
    Arch {
        /// Preset name or architecture file (YAML or JSON)
        #[arg(short, long, default_value = "logical")]
        arch: String,

        /// Print the full description as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find the shortest lane path between two sites
    Route {
        /// Preset name or architecture file (YAML or JSON)
        #[arg(short, long, default_value = "logical")]
        arch: String,

        /// Starting site as WORD,SITE
        #[arg(long)]
        from: String,

        /// Destination site as WORD,SITE
        #[arg(long)]
        to: String,

        /// Sites that may not be entered, as WORD,SITE
        #[arg(long, value_delimiter = ';')]
        avoid: Vec<String>,

        /// Tie-break heuristic (zero, bus_reuse)
        #[arg(long)]
        heuristic: Option<String>,
    },

    /// Compile a gate program into a movement program
    Compile {
        /// Gate program (JSON or YAML)
        #[arg(short, long)]
        input: String,

        /// Initial layout (JSON or YAML)
        #[arg(short, long)]
        layout: String,

        /// Output file for the compiled program (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Preset name or architecture file (YAML or JSON)
        #[arg(short, long, default_value = "logical")]
        arch: String,

        /// Compiler configuration file (JSON or YAML)
        #[arg(short, long)]
        config: Option<String>,

        /// Placement strategy (logical, conflict_aware)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Path tie-break heuristic (zero, bus_reuse)
        #[arg(long)]
        heuristic: Option<String>,

        /// Skip address validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Arch { arch: name, json } => arch::execute(&name, json),

        Commands::Route {
            arch,
            from,
            to,
            avoid,
            heuristic,
        } => route::execute(&arch, &from, &to, &avoid, heuristic.as_deref()),

        Commands::Compile {
            input,
            layout,
            output,
            arch,
            config,
            strategy,
            heuristic,
            no_validate,
        } => compile::execute(&compile::CompileArgs {
            input: &input,
            layout: &layout,
            output: output.as_deref(),
            arch: &arch,
            config: config.as_deref(),
            strategy: strategy.as_deref(),
            heuristic: heuristic.as_deref(),
            validate: !no_validate,
        }),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
