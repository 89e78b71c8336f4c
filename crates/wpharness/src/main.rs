//! wpharness CLI
//!
//! Binary name: `wpharness`

use std::process;

use tracing_subscriber::EnvFilter;
use wpharness::cli::{build_cli, handlers};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let level = if matches.get_flag("verbose") {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = handlers::dispatch(&matches).await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {err:#}");
        }

        let code = err
            .downcast_ref::<wpharness_core::Error>()
            .map_or(1, wpharness_core::Error::exit_code);

        #[allow(clippy::exit)]
        process::exit(code);
    }
}
