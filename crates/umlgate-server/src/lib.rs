//! HTTP gateway serving rendered `PlantUML` diagrams.
//!
//! Requests carry diagram source in the URL or the body; the gateway
//! decodes it, hands it to a [`DiagramEngine`](umlgate_engine::DiagramEngine)
//! and shapes the response:
//! - conditional requests answered with 304 from entity tag and date
//! - SVG output watermarked unless served under the opt-out segment
//! - invalid diagrams sent as error images with status 400 and
//!   diagnostic headers
//!
//! # Routes
//!
//! | Route | Body |
//! |---|---|
//! | `GET /{format}/[{index}/]{token}` | source as URL token |
//! | `POST /{format}/[{index}/][{scheme}]` | source encoded by `scheme` |
//! | `POST /coder` | source; answers with its URL token |
//!
//! `format` is one of `png`, `svg`, `txt`, `pdf`, `base64`, `map`,
//! `check`. Diagram routes are repeated under `/{public_segment}/`.
//!
//! # Quick Start
//!
//! ```ignore
//! use umlgate_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         kroki_url: "https://kroki.io".to_owned(),
//!         version: "1.0.0".to_owned(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod emit;
mod error;
mod handlers;
mod negotiate;
mod route;
mod state;
#[cfg(test)]
mod testing;
mod watermark;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use state::AppState;
use umlgate_engine::{ConfigLines, KrokiEngine};

pub use error::ServerError;
pub use watermark::{WatermarkError, WatermarkTemplate};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Kroki server URL.
    pub kroki_url: String,
    /// Timeout of one render request.
    pub timeout: Duration,
    /// File with config lines applied to every diagram.
    pub config_file: Option<PathBuf>,
    /// Directories for local `!include` resolution (`None` leaves
    /// directives to the render service).
    pub include_dirs: Option<Vec<PathBuf>>,
    /// Watermark SVG output outside the opt-out namespace.
    pub watermark_enabled: bool,
    /// Path segment of the opt-out namespace.
    pub public_segment: String,
    /// Application version (for `X-Powered-By`).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            kroki_url: "https://kroki.io".to_owned(),
            timeout: Duration::from_secs(30),
            config_file: None,
            include_dirs: None,
            watermark_enabled: true,
            public_segment: "iunderstandiusetestpublicplantuml".to_owned(),
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the watermark template cannot be built or the
/// server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = KrokiEngine::new(&config.kroki_url).timeout(config.timeout);
    if let Some(dirs) = &config.include_dirs {
        engine = engine.include_dirs(dirs);
    }

    // Built before binding so a broken template stops startup
    let watermark = if config.watermark_enabled {
        Some(WatermarkTemplate::new(&config.public_segment)?)
    } else {
        None
    };

    let state = Arc::new(AppState {
        engine: Box::new(engine),
        config_lines: ConfigLines::new(config.config_file.clone()),
        watermark,
        powered_by: format!("umlgate {}", config.version),
    });

    let app = app::create_router(state, &config.public_segment);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        kroki_url = %config.kroki_url,
        watermark = config.watermark_enabled,
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from umlgate config.
///
/// # Arguments
///
/// * `config` - umlgate configuration
/// * `version` - Application version
#[must_use]
pub fn server_config_from_config(config: &umlgate_config::Config, version: String) -> ServerConfig {
    let engine = &config.engine_resolved;
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        kroki_url: engine.kroki_url.clone(),
        timeout: engine.timeout,
        config_file: engine.config_file.clone(),
        include_dirs: engine.allow_include.then(|| engine.include_dirs.clone()),
        watermark_enabled: config.watermark.enabled,
        public_segment: config.watermark.public_segment.clone(),
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_config_from_default_config() {
        let config = umlgate_config::Config::default();
        let server = server_config_from_config(&config, "1.2.3".to_owned());

        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 8080);
        assert_eq!(server.kroki_url, "https://kroki.io");
        assert_eq!(server.include_dirs, None);
        assert!(server.watermark_enabled);
        assert_eq!(server.public_segment, "iunderstandiusetestpublicplantuml");
        assert_eq!(server.version, "1.2.3");
    }

    #[test]
    fn test_include_dirs_only_when_allowed() {
        let mut config = umlgate_config::Config::default();
        config.engine_resolved.allow_include = true;
        config.engine_resolved.include_dirs = vec![PathBuf::from("/srv/includes")];

        let server = server_config_from_config(&config, String::new());
        assert_eq!(
            server.include_dirs,
            Some(vec![PathBuf::from("/srv/includes")])
        );
    }
}
