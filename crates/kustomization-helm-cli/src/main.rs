//! kustomization-helm CLI - a converter from Helm charts to kustomizations

use clap::Parser;
use kustomization_helm_core::{Config, ConversionReport, load_config};
use std::path::PathBuf;
use std::process::ExitCode;

mod context;
mod display;
mod error;
mod exit_codes;
mod logging;
mod version;

use context::ExecutionContext;
use error::CliError;
use version::VersionInfo;

#[derive(Parser, Debug)]
#[command(name = "kustomization-helm")]
#[command(version = VersionInfo::current().version, long_version = VersionInfo::current().render())]
#[command(about = "A converter from helm charts to kustomizations", long_about = None)]
struct Cli {
    /// Directory containing kustomization-helm.yaml
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    // Setup miette for nice panic display
    miette::set_panic_hook();

    let cli = Cli::parse();
    logging::init(cli.debug);

    match execute(&cli) {
        Ok((dir, report)) => {
            display::print_report(&report, &dir);
            ExitCode::from(exit_codes::SUCCESS)
        }
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}

/// Resolve the directory, load the configuration and run the conversion
fn execute(cli: &Cli) -> error::Result<(PathBuf, ConversionReport)> {
    let ctx = ExecutionContext::init(&cli.dir).map_err(CliError::initialize)?;

    let config_path = Config::file_path(ctx.dir());
    let config = load_config(ctx.source(), &config_path).map_err(CliError::load_config)?;

    let report = kustomization_helm_core::run(ctx.dir(), &config).map_err(CliError::run)?;
    tracing::debug!(
        written = report.written.len(),
        pruned = report.pruned.len(),
        "conversion finished"
    );

    Ok((ctx.dir().to_path_buf(), report))
}
