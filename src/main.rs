use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config_overlay::overlay::ignore_unrecognized;
use config_overlay::{obscure_secrets, Config, Error};

/// Merge override tokens over TOML defaults and print the result.
///
/// Pass `show=all` (or `show=<text>`) to list values and where they came
/// from instead of the merged TOML.
#[derive(Debug, Parser)]
#[command(name = "config-overlay", version, about)]
struct Cli {
    /// Base config file; later files override earlier ones
    #[arg(short, long = "defaults", value_name = "FILE")]
    defaults: Vec<PathBuf>,

    /// Warn about unrecognized overrides instead of failing
    #[arg(long)]
    ignore_unrecognized: bool,

    /// Print every value with its origin instead of TOML
    #[arg(long)]
    summary: bool,

    /// Leave out values the environment or host properties also supply
    #[arg(long)]
    without_system: bool,

    /// Overrides: key=value pairs, config files or file:// URLs, first wins
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    overrides: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(?cli, "parsed arguments");

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, Error> {
    let mut builder = Config::builder();
    for path in &cli.defaults {
        builder = builder.with_file(path, true);
    }
    builder = builder.with_args(cli.overrides.iter().cloned());
    if cli.ignore_unrecognized {
        builder = builder.on_unrecognized(ignore_unrecognized);
    }

    let config = builder.build()?;
    let config = if cli.without_system {
        config.without_system()
    } else {
        config
    };

    if let Some(shown) = config.show_if_specified(&obscure_secrets) {
        return Ok(shown);
    }
    if cli.summary {
        let lines: Vec<String> = config
            .summary(&obscure_secrets)
            .iter()
            .map(ToString::to_string)
            .collect();
        return Ok(lines.join("\n"));
    }
    Ok(config.render()?)
}
