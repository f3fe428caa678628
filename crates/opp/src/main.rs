//! OPP - the Obfuscated Pre-Processor
//!
//! Usage: opp [OPTIONS] [INPUT]

use clap::Parser as ClapParser;
use log::LevelFilter;
use opp::driver::parse_define;
use opp::{Driver, DriverOptions, PreprocessorConfig};
use std::path::PathBuf;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "opp")]
#[command(author = "OPP Team")]
#[command(version)]
#[command(about = "Obfuscated Pre-Processor: macros, NAND conditionals and escaped includes", long_about = None)]
struct Args {
    /// Input file; omit or use `-` for standard input
    input: Option<PathBuf>,

    /// Output file (standard output if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Define NAME, optionally with a value (NAME or NAME=VALUE)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    defines: Vec<String>,

    /// Initial seed for ##$
    #[arg(long)]
    seed: Option<u32>,

    /// Maximum nesting of ##< includes
    #[arg(long)]
    max_include_depth: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = PreprocessorConfig::default();
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(depth) = args.max_include_depth {
        config.max_include_depth = depth;
    }

    let options = DriverOptions {
        input: args.input,
        output: args.output,
        defines: args.defines.iter().map(|d| parse_define(d)).collect(),
        config,
    };

    Driver::new(options).run()
}
