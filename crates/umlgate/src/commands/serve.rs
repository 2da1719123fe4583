//! `umlgate serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use umlgate_config::{CliSettings, Config};
use umlgate_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover umlgate.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long)]
    kroki_url: Option<String>,

    /// Serve SVG output without the test-server watermark.
    #[arg(long)]
    no_watermark: bool,

    /// Enable verbose output (request and render logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            kroki_url: self.kroki_url,
            watermark_enabled: self.no_watermark.then_some(false),
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!("Kroki URL: {}", config.engine_resolved.kroki_url));
        if let Some(config_file) = &config.engine_resolved.config_file {
            output.info(&format!("Config lines: {}", config_file.display()));
        }
        if config.engine_resolved.allow_include {
            output.info("Local includes: enabled");
        }
        if config.watermark.enabled {
            output.info(&format!(
                "Watermark: enabled (opt out under /{}/)",
                config.watermark.public_segment
            ));
        } else {
            output.info("Watermark: disabled");
        }

        let server_config = server_config_from_config(&config, version.to_owned());
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
