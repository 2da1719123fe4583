//! Kroki-backed render engine.
//!
//! Every block of a source becomes one [`KrokiDiagram`], rendered by
//! `POST {kroki_url}/plantuml/{format}` with the block as body:
//! - HTTP 200: the image
//! - HTTP 400: the source is invalid; the diagram turns into an error
//!   diagram whose image is rendered from a generated error description
//! - anything else: [`EngineError`]
//!
//! Whether a block is an error diagram is only known after Kroki has seen
//! it, so [`Diagram::metadata`] probes the block once (as SVG) and keeps
//! the answer.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use ureq::Agent;

use crate::cache::DiagramKey;
use crate::consts::{DEFAULT_TIMEOUT, ERROR_DESCRIPTION, PLANTUML_ENDPOINT};
use crate::plantuml::prepare_block;
use crate::source::split_blocks;
use crate::{
    Diagram, DiagramEngine, DiagramIssue, DiagramMetadata, EngineError, FileFormat, ImageData,
};

/// Line marker in Kroki error messages, e.g. `Syntax Error? (line: 3)`.
static LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(line:\s*(\d+)\)").expect("invalid line regex"));

/// Create HTTP agent with the specified timeout.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Outcome of one render call.
enum Reply {
    /// Rendered image bytes.
    Image(Vec<u8>),
    /// Source rejected; body holds the error message.
    Rejected(String),
}

/// Connection to a Kroki server, shared by all diagrams of an engine.
struct KrokiClient {
    agent: Agent,
    base_url: String,
}

impl KrokiClient {
    /// Send a block to Kroki.
    fn send(&self, source: &str, format: FileFormat) -> Result<Reply, EngineError> {
        let url = format!("{}/{PLANTUML_ENDPOINT}/{}", self.base_url, format.name());

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(source.as_bytes())?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        match status {
            200..=299 => Ok(Reply::Image(body.read_to_vec()?)),
            400 => Ok(Reply::Rejected(
                body.read_to_string()
                    .unwrap_or_else(|_| String::from("Syntax Error?")),
            )),
            _ => Err(EngineError::Service {
                status,
                body: body
                    .read_to_string()
                    .unwrap_or_else(|_| String::from("(unable to read error body)")),
            }),
        }
    }
}

/// Render engine delegating to a Kroki server.
///
/// # Example
///
/// ```ignore
/// use umlgate_engine::{DiagramEngine, KrokiEngine};
///
/// let engine = KrokiEngine::new("https://kroki.io");
/// let diagrams = engine.parse("@startuml\nA -> B\n@enduml", &[])?;
/// ```
pub struct KrokiEngine {
    client: Arc<KrokiClient>,
    include_dirs: Option<Vec<PathBuf>>,
    epoch: DateTime<Utc>,
}

impl KrokiEngine {
    /// Create an engine for the given Kroki server URL.
    #[must_use]
    pub fn new(kroki_url: impl Into<String>) -> Self {
        let kroki_url = kroki_url.into();
        Self {
            client: Arc::new(KrokiClient {
                agent: create_agent(DEFAULT_TIMEOUT),
                base_url: kroki_url.trim_end_matches('/').to_owned(),
            }),
            include_dirs: None,
            epoch: whole_seconds(Utc::now()),
        }
    }

    /// Set HTTP timeout for Kroki requests.
    ///
    /// Default is 30 seconds.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client = Arc::new(KrokiClient {
            agent: create_agent(timeout),
            base_url: self.client.base_url.clone(),
        });
        self
    }

    /// Resolve local `!include` directives against these directories.
    ///
    /// Without this, directives are forwarded to Kroki untouched.
    #[must_use]
    pub fn include_dirs(mut self, dirs: &[PathBuf]) -> Self {
        self.include_dirs = Some(dirs.to_vec());
        self
    }
}

impl KrokiEngine {
    fn diagrams(&self, source: &str, config: &[String]) -> Vec<KrokiDiagram> {
        split_blocks(source)
            .into_iter()
            .enumerate()
            .map(|(position, block)| {
                let prepared = prepare_block(&block.text, config, self.include_dirs.as_deref());
                for warning in &prepared.warnings {
                    tracing::warn!(position, warning = %warning, "Diagram preparation warning");
                }
                let etag = DiagramKey {
                    source: &prepared.source,
                    endpoint: PLANTUML_ENDPOINT,
                    position,
                    config,
                }
                .etag();
                KrokiDiagram {
                    client: Arc::clone(&self.client),
                    source: prepared.source,
                    kind: block.kind,
                    etag,
                    last_modified: self.epoch,
                    probe: OnceLock::new(),
                }
            })
            .collect()
    }
}

impl DiagramEngine for KrokiEngine {
    fn parse(&self, source: &str, config: &[String]) -> Result<Vec<Box<dyn Diagram>>, EngineError> {
        Ok(self
            .diagrams(source, config)
            .into_iter()
            .map(|diagram| Box::new(diagram) as Box<dyn Diagram>)
            .collect())
    }
}

/// Result of showing a block to Kroki once.
enum Probe {
    /// Rendered fine; the SVG is kept for a later SVG render.
    Valid(Vec<u8>),
    /// Rejected with these errors.
    Invalid(Vec<DiagramIssue>),
}

/// One `PlantUML` block rendered through Kroki.
struct KrokiDiagram {
    client: Arc<KrokiClient>,
    source: String,
    kind: String,
    etag: String,
    last_modified: DateTime<Utc>,
    probe: OnceLock<Probe>,
}

impl KrokiDiagram {
    fn probe(&self) -> Result<&Probe, EngineError> {
        if let Some(probe) = self.probe.get() {
            return Ok(probe);
        }
        let probe = match self.client.send(&self.source, FileFormat::Svg)? {
            Reply::Image(svg) => Probe::Valid(svg),
            Reply::Rejected(message) => Probe::Invalid(parse_issues(&message)),
        };
        Ok(self.probe.get_or_init(|| probe))
    }

    /// Render the generated error diagram for `errors`.
    fn render_error(&self, errors: &[DiagramIssue], format: FileFormat) -> Result<Vec<u8>, EngineError> {
        match self.client.send(&error_source(errors), format)? {
            Reply::Image(bytes) => Ok(bytes),
            Reply::Rejected(body) => Err(EngineError::Service { status: 400, body }),
        }
    }
}

impl Diagram for KrokiDiagram {
    fn metadata(&self) -> Result<DiagramMetadata, EngineError> {
        let (description, errors) = match self.probe()? {
            Probe::Valid(_) => (format!("({} diagram)", self.kind), Vec::new()),
            Probe::Invalid(errors) => (ERROR_DESCRIPTION.to_owned(), errors.clone()),
        };
        Ok(DiagramMetadata {
            last_modified: self.last_modified,
            etag: self.etag.clone(),
            description,
            errors,
        })
    }

    fn render(&self, index: usize, format: FileFormat) -> Result<ImageData, EngineError> {
        if index != 0 {
            return Err(EngineError::NoSuchImage { index });
        }

        let bytes = match self.probe.get() {
            Some(Probe::Valid(svg)) if format == FileFormat::Svg => svg.clone(),
            Some(Probe::Invalid(errors)) => self.render_error(errors, format)?,
            _ => match self.client.send(&self.source, format)? {
                Reply::Image(bytes) => bytes,
                Reply::Rejected(message) => {
                    let errors = parse_issues(&message);
                    let bytes = self.render_error(&errors, format)?;
                    let _ = self.probe.set(Probe::Invalid(errors));
                    bytes
                }
            },
        };

        Ok(ImageData {
            bytes,
            image_map: None,
        })
    }
}

/// Truncate a timestamp to whole seconds.
fn whole_seconds(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

/// Extract error records from a Kroki error body.
///
/// Every non-empty line becomes one record; a `(line: N)` marker sets the
/// source line, otherwise the line is 0.
fn parse_issues(body: &str) -> Vec<DiagramIssue> {
    let issues: Vec<DiagramIssue> = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let number = LINE_PATTERN
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            let message = LINE_PATTERN.replace(line, "").trim().to_owned();
            DiagramIssue {
                message: if message.is_empty() {
                    line.to_owned()
                } else {
                    message
                },
                line: number,
            }
        })
        .collect();

    if issues.is_empty() {
        vec![DiagramIssue {
            message: "Syntax Error?".to_owned(),
            line: 0,
        }]
    } else {
        issues
    }
}

/// `PlantUML` source of a diagram depicting `errors`.
fn error_source(errors: &[DiagramIssue]) -> String {
    let mut source = String::from("@startuml\ntitle Syntax error\nlegend\n");
    for issue in errors {
        // Legend text is line-based; keep each record on one line
        let message: String = issue
            .message
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        source.push_str(&format!("line {}: {message}\n", issue.line));
    }
    source.push_str("endlegend\n@enduml");
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_issues_with_line_marker() {
        let issues = parse_issues("Syntax Error? (Assumed diagram type: sequence) (line: 2)\n");
        assert_eq!(
            issues,
            vec![DiagramIssue {
                message: "Syntax Error? (Assumed diagram type: sequence)".to_owned(),
                line: 2,
            }]
        );
    }

    #[test]
    fn test_parse_issues_without_marker() {
        let issues = parse_issues("Error 400: bad diagram");
        assert_eq!(issues[0].message, "Error 400: bad diagram");
        assert_eq!(issues[0].line, 0);
    }

    #[test]
    fn test_parse_issues_empty_body() {
        let issues = parse_issues("  \n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Syntax Error?");
    }

    #[test]
    fn test_error_source_lists_issues() {
        let source = error_source(&[DiagramIssue {
            message: "Syntax Error?\tnear arrow".to_owned(),
            line: 3,
        }]);
        assert_eq!(
            source,
            "@startuml\ntitle Syntax error\nlegend\nline 3: Syntax Error? near arrow\nendlegend\n@enduml"
        );
    }

    #[test]
    fn test_whole_seconds() {
        let time = DateTime::from_timestamp(1_700_000_000, 999_000_000).unwrap();
        assert_eq!(whole_seconds(time).timestamp_subsec_nanos(), 0);
        assert_eq!(whole_seconds(time).timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_etags_stable_across_parses() {
        let engine = KrokiEngine::new("http://127.0.0.1:9/");
        let source = "@startuml\nA -> B\n@enduml\n@startuml\nA -> B\n@enduml";
        let tags = |config: &[String]| -> Vec<String> {
            engine
                .diagrams(source, config)
                .into_iter()
                .map(|d| d.etag)
                .collect()
        };

        let first = tags(&[]);
        assert_eq!(first.len(), 2);
        assert_eq!(first, tags(&[]));
        // Same text at another position is another diagram
        assert_ne!(first[0], first[1]);
        assert_ne!(first, tags(&["skinparam dpi 150".to_owned()]));
    }

    #[test]
    fn test_parse_applies_config_and_kind() {
        let engine = KrokiEngine::new("http://127.0.0.1:9");
        let diagrams = engine.diagrams(
            "@startmindmap\n* root\n@endmindmap",
            &["skinparam dpi 150".to_owned()],
        );
        assert_eq!(diagrams.len(), 1);
        assert_eq!(diagrams[0].kind, "mindmap");
        assert_eq!(
            diagrams[0].source,
            "@startmindmap\nskinparam dpi 150\n* root\n@endmindmap"
        );
        assert_eq!(diagrams[0].last_modified, engine.epoch);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let engine = KrokiEngine::new("https://kroki.io/");
        assert_eq!(engine.client.base_url, "https://kroki.io");
    }

    #[test]
    fn test_unreachable_service_is_engine_error() {
        let engine = KrokiEngine::new("http://127.0.0.1:9").timeout(Duration::from_millis(200));
        let diagrams = engine.parse("@startuml\nA -> B\n@enduml", &[]).unwrap();
        assert!(diagrams[0].metadata().is_err());
    }
}
