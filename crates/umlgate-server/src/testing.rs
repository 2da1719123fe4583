//! In-process render engine for handler tests.
//!
//! Each block renders to a small document echoing its source. Directives
//! in the source steer the outcome:
//! - `!error`: the block is an error diagram (line 2)
//! - `!malformed`: SVG output is not well-formed
//! - `[[`: PNG renders carry an image map
//!
//! A config line `!reject` makes every block an error diagram.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use umlgate_engine::source::split_blocks;
use umlgate_engine::{
    Diagram, DiagramEngine, DiagramIssue, DiagramKey, DiagramMetadata, EngineError, FileFormat,
    ImageData,
};

/// Last-modified time of every stub diagram.
pub(crate) const STUB_MODIFIED: i64 = 1_700_000_000;

#[derive(Default)]
pub(crate) struct StubEngine {
    /// Number of render calls across all diagrams.
    pub renders: Arc<AtomicUsize>,
}

impl DiagramEngine for StubEngine {
    fn parse(&self, source: &str, config: &[String]) -> Result<Vec<Box<dyn Diagram>>, EngineError> {
        Ok(split_blocks(source)
            .into_iter()
            .enumerate()
            .map(|(position, block)| {
                let etag = DiagramKey {
                    source: &block.text,
                    endpoint: "stub",
                    position,
                    config,
                }
                .etag();
                let rejected = config.iter().any(|line| line == "!reject");
                Box::new(StubDiagram {
                    source: block.text,
                    etag,
                    rejected,
                    renders: Arc::clone(&self.renders),
                }) as Box<dyn Diagram>
            })
            .collect())
    }
}

struct StubDiagram {
    source: String,
    etag: String,
    rejected: bool,
    renders: Arc<AtomicUsize>,
}

impl Diagram for StubDiagram {
    fn metadata(&self) -> Result<DiagramMetadata, EngineError> {
        let is_error = self.rejected || self.source.contains("!error");
        let errors = if is_error {
            vec![DiagramIssue {
                message: "Syntax Error?".to_owned(),
                line: 2,
            }]
        } else {
            Vec::new()
        };
        Ok(DiagramMetadata {
            last_modified: DateTime::<Utc>::from_timestamp(STUB_MODIFIED, 0).unwrap_or_default(),
            etag: self.etag.clone(),
            description: if is_error { "(Error)" } else { "(stub diagram)" }.to_owned(),
            errors,
        })
    }

    fn render(&self, index: usize, format: FileFormat) -> Result<ImageData, EngineError> {
        if index != 0 {
            return Err(EngineError::NoSuchImage { index });
        }
        self.renders.fetch_add(1, Ordering::SeqCst);

        let escaped = self
            .source
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        let bytes = match format {
            FileFormat::Svg if self.source.contains("!malformed") => {
                format!(r#"<svg width="120px" height="80px"><g><text>{escaped}</text></svg>"#)
                    .into_bytes()
            }
            FileFormat::Svg => format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="120px" height="80px" viewBox="0 0 120 80"><g><text>{escaped}</text></g></svg>"#
            )
            .into_bytes(),
            FileFormat::Png => [b"\x89PNG".as_slice(), self.source.as_bytes()].concat(),
            FileFormat::Txt => self.source.clone().into_bytes(),
            FileFormat::Pdf => [b"%PDF".as_slice(), self.source.as_bytes()].concat(),
        };
        let image_map = (format == FileFormat::Png && self.source.contains("[["))
            .then(|| r#"<map id="plantuml_map" name="plantuml_map"></map>"#.to_owned());

        Ok(ImageData { bytes, image_map })
    }
}
