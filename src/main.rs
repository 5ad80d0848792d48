use clap::Parser;
use form_autofill::cli::commands::{cmd_check_config, cmd_classify, cmd_fill};
use form_autofill::cli::config::{Cli, Commands, verbosity_filter};
use form_autofill::error::AppError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Fill {
            snapshot,
            config,
            output,
            format,
            seed,
            trace,
        } => {
            let report = cmd_fill(
                &snapshot,
                config.as_deref(),
                output.as_deref(),
                format,
                seed,
                trace.as_deref(),
            )?;
            print!("{}", report);
        }
        Commands::Classify { snapshot, config } => {
            print!("{}", cmd_classify(&snapshot, config.as_deref())?);
        }
        Commands::CheckConfig { config } => {
            let (out, has_errors) = cmd_check_config(&config)?;
            print!("{}", out);
            if has_errors {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the `-v` count. Logs go to stderr so reports stay pipeable.
fn init_logging(verbose: u8) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbose)));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| AppError::Logging(e.to_string()))
}
