//! `json-dict` command-line entry point.

use anyhow::Result;
use clap::Parser;
use json_dict::cli::{self, Cli};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Cli::parse();
    let _guard = cli::init_logging(args.log_json, args.log_file.as_deref(), args.default_log_level());

    let dict = args.open_dictionary()?;

    match &args.command {
        #[cfg(feature = "http")]
        cli::Command::Serve { host, port } => serve(dict, host, *port),
        command => {
            let stdout = std::io::stdout();
            cli::execute(&dict, command, &mut stdout.lock())
        }
    }
}

#[cfg(feature = "http")]
fn serve(dict: json_dict::Dictionary, host: &str, port: u16) -> Result<()> {
    use json_dict::http::{self, HttpConfig};
    use std::sync::Arc;

    let config = HttpConfig {
        host: host.to_owned(),
        port,
    };
    let dict = Arc::new(dict);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(http::serve(Arc::clone(&dict), &config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl+c: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown requested");
    }))?;

    // Let mutations that were already queued land before exiting.
    dict.shutdown();
    Ok(())
}
