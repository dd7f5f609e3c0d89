//! infractl - reconcile, provision and tear down Terraform-managed Azure infrastructure

use clap::Parser;
use tracing_subscriber::EnvFilter;

use infractl::cli::Cli;
use infractl::output::json;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;
    if let Err(e) = cli.run().await {
        match json.then(|| json::format_error(&format!("{e:#}"), json::error_code(&e))) {
            Some(Ok(out)) => println!("{out}"),
            _ => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "infractl=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
