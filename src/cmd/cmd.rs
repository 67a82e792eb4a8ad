use std::{process::exit, str::FromStr};

use clap::{CommandFactory, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::{
    config::{CONFIG_FILE, Config, Mode, OutputFormat, load_config_file},
    driver::link,
    error::{LinkError, Res},
    module::Manifest,
    util::{file_exists, write_file},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging and debug diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a default modlink.toml
    Init,
    /// Link a module graph manifest and print the result
    Link(LinkArgs),
}

#[derive(clap::Args)]
struct LinkArgs {
    /// Module graph manifest (toml)
    manifest: String,
    /// Config file, modlink.toml in the working directory if present
    #[arg(short, long)]
    config: Option<String>,
    /// Output format (iife|esm|cjs)
    #[arg(short, long)]
    format: Option<String>,
    /// Output mode (bundle|convert)
    #[arg(short, long)]
    mode: Option<String>,
    /// Print every resolved export table
    #[arg(short, long)]
    tables: bool,
}

pub fn run() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return;
    };

    match run_command(command, cli.verbose) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(err) => {
            println!("error: {}", err);
            exit(1);
        }
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .compact()
        .init();
}

/// Returns false when the link report has errors.
fn run_command(command: Command, verbose: bool) -> Res<bool> {
    match command {
        Command::Init => modlink_init().map(|_| true),
        Command::Link(args) => modlink_link(args, verbose),
    }
}

fn modlink_link(args: LinkArgs, verbose: bool) -> Res<bool> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None if file_exists(CONFIG_FILE) => load_config_file(CONFIG_FILE)?,
        None => Config::default(),
    };

    if let Some(format) = args.format {
        config.format = OutputFormat::from_str(&format).map_err(|_| LinkError::InvalidOption {
            option: "--format",
            value: format,
        })?;
    }
    if let Some(mode) = args.mode {
        config.mode = Mode::from_str(&mode).map_err(|_| LinkError::InvalidOption {
            option: "--mode",
            value: mode,
        })?;
    }
    config.verbose |= verbose;
    config.print_tables |= args.tables;

    debug!("Linking {} as {}", args.manifest, config.format);
    let graph = Manifest::load(&args.manifest)?.into_graph()?;
    let out = link(&graph, &config)?;

    print!("{}", out.report.render());
    print!("{}", out.render_plans(&graph));
    Ok(!out.report.has_errors())
}

pub static DEFAULT_MODLINK_TOML: &str = r#"# Modlink configuration

[output]
format = "esm"  # Output format (iife|esm|cjs)
mode = "bundle" # Link mode (bundle|convert)
exports = "auto" # Export mode of the entry module (auto|named|default|none)
# entry = "index.js"

[options]
verbose = false # Report debug diagnostics
max-fixed-point-iterations = 64
"#;

fn modlink_init() -> Res<()> {
    if file_exists(CONFIG_FILE) {
        println!("File {} already exists", CONFIG_FILE);
        return Ok(());
    }

    write_file(CONFIG_FILE, DEFAULT_MODLINK_TOML)?;
    println!("Created {}", CONFIG_FILE);
    Ok(())
}
