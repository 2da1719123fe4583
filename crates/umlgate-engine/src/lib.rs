//! Diagram render engine for umlgate.
//!
//! The gateway treats rendering as an opaque collaborator. This crate pins
//! down that contract and ships one implementation of it:
//!
//! - [`DiagramEngine`] / [`Diagram`]: parse source into diagrams, query their
//!   [`DiagramMetadata`], render one image in a [`FileFormat`]
//! - [`KrokiEngine`]: renders `PlantUML` through a Kroki service over HTTP
//! - [`ConfigLines`]: process-wide config lines, read once on first use
//! - [`source`]: block splitting, cacheability, image selection
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`diagram`]: engine traits and the metadata/image types
//! - [`format`]: renderable file formats and their MIME types
//! - [`source`]: source-level helpers shared by every engine
//! - `kroki`: the Kroki-backed engine
//! - `plantuml`: per-block preprocessing (config lines, `!include`)
//! - `cache`: entity tag computation

mod cache;
mod config_lines;
mod consts;
pub mod diagram;
mod error;
pub mod format;
mod kroki;
mod plantuml;
pub mod source;

pub use cache::DiagramKey;
pub use config_lines::ConfigLines;
pub use diagram::{Diagram, DiagramEngine, DiagramIssue, DiagramMetadata, ImageData};
pub use error::EngineError;
pub use format::FileFormat;
pub use kroki::KrokiEngine;
