use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::Settings;

/// Mock books REST API.
#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API until Ctrl-C or SIGTERM.
    Serve {
        /// Interface to bind, overriding `server.host`.
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding `server.port`.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the merged OpenAPI document as JSON.
    Openapi,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load().with_context(|| "failed to load shelf settings")?;

    match args.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            shelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "shelf serve");

            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(shelf_app::run(settings))
        }
        Command::Openapi => {
            let registry = shelf_app::registry()?;
            let document =
                shelf_http::router::openapi_document(&registry, &settings.server.route_prefix);
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
    }
}
