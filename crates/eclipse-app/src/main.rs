use std::process::ExitCode;

use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use eclipse_raster::{RunOptions, USAGE};

fn main() -> ExitCode {
    // Init logging; RUST_LOG overrides the default filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(filter)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let options = match RunOptions::from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    if options.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    info!("Eclipse starting");
    match launch(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Eclipse error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Desktop wallpaper on Windows unless `--headless` asks for the pixmap run.
#[cfg(windows)]
fn launch(options: RunOptions) -> eclipse_platform::Result<()> {
    if options.headless {
        eclipse_raster::run_app(options)
    } else {
        eclipse_win::run_app(options)
    }
}

#[cfg(not(windows))]
fn launch(options: RunOptions) -> eclipse_platform::Result<()> {
    eclipse_raster::run_app(options)
}
