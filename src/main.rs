use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cc_notify::{App, CcNotifyError, Cli, Outcome};

const LOG_ENV: &str = "CC_NOTIFY_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CcNotifyError> {
    let app = App::discover()?;
    let outcome = app.handle(&cli.into_action(), &mut io::stdin().lock())?;

    match &outcome {
        Outcome::Template(template) => print!("{template}"),
        Outcome::Hooks { reports, .. } if reports.is_empty() => {}
        _ => println!("{outcome}"),
    }
    if let Outcome::Hooks { failures, .. } = &outcome {
        for failure in failures {
            eprintln!("{failure}");
        }
    }
    Ok(())
}
