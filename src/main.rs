//! vanish - versioned, combined and cache-busted asset references.

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use std::io::Write;

use vanish::cli::{self, Cli, Commands};
use vanish::config::VanishConfig;
use vanish::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to get current working directory")?;

    match &cli.command {
        Commands::Init { force } => cli::init::write_config(&cwd, &cli.config, *force).map(|_| ()),
        Commands::Render { args } => {
            let config = VanishConfig::discover(&cli.config, &cwd)?;
            let out = cli::render::render(args, &config)?;

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(out.as_bytes())?;
            if args.json {
                writeln!(stdout)?;
            }
            Ok(())
        }
    }
}
