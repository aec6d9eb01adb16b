use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// DICOM to BIDS conversion module.
///
/// Converts the DICOM series in the input folder into a BIDS directory
/// tree using dcm2bids and places the result in the output folder for the
/// routing platform to pick up.
#[derive(Parser)]
#[command(name = "oxibids", version, about)]
struct Cli {
    /// Folder containing the received DICOM series and task.json
    input_folder: Utf8PathBuf,
    /// Folder where results are placed for routing
    output_folder: Utf8PathBuf,
}

fn main() -> ExitCode {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .finish(),
    )
    .unwrap_or_else(|e| eprintln!("Could not set up global logger: {e}"));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // wrong arguments: report usage and quit before touching anything
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match oxibids::run_from_env(&cli.input_folder, &cli.output_folder) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
