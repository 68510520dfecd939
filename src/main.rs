//! `sass-serve`: a development static file server that compiles stylesheets
//! on request.
//!
//! ```text
//! GET /css/main.css
//!     → public/scss/main.scss exists? compile → public/css/main.css (+ .map)
//!     → ServeDir answers with public/css/main.css
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use sass_interceptor::config::{load_config, ServerConfig};
use sass_interceptor::observability::logging::init_logging;
use sass_interceptor::DevServer;

#[derive(Parser)]
#[command(name = "sass-serve")]
#[command(about = "Serve a directory, compiling SCSS/Sass into CSS on request", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overrides the config file.
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory to serve, overrides the config file.
    #[arg(short, long)]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(root) = cli.root {
        config.public_root = root;
    }

    init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        public_root = %config.public_root.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = DevServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
