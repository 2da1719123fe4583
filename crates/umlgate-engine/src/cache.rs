//! Entity tag computation.
//!
//! Provides [`DiagramKey`] for computing content-based hashes used as entity tags.

use sha2::{Digest, Sha256};

/// Length of an entity tag in hex characters (128 bits).
const ETAG_LEN: usize = 32;

/// Diagram parameters for entity tag computation.
///
/// Contains everything that affects the rendered output, so two equal keys
/// always describe the same image.
#[derive(Debug)]
pub struct DiagramKey<'a> {
    /// Block source (after preprocessing).
    pub source: &'a str,
    /// Render endpoint (e.g., "plantuml").
    pub endpoint: &'a str,
    /// Position of the block within the request source.
    pub position: usize,
    /// Config lines applied to the render.
    pub config: &'a [String],
}

impl DiagramKey<'_> {
    /// Compute a content hash for this diagram key.
    ///
    /// # Hash Format
    ///
    /// SHA-256 of `"{endpoint}:{position}:{config lines joined by \n}:{source}"`.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let content = format!(
            "{}:{}:{}:{}",
            self.endpoint,
            self.position,
            self.config.join("\n"),
            self.source
        );
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let result = hasher.finalize();
        hex::encode(result)
    }

    /// Entity tag for this key (truncated hash, unquoted).
    #[must_use]
    pub fn etag(&self) -> String {
        let mut hash = self.compute_hash();
        hash.truncate(ETAG_LEN);
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key<'a>(source: &'a str, config: &'a [String]) -> DiagramKey<'a> {
        DiagramKey {
            source,
            endpoint: "plantuml",
            position: 0,
            config,
        }
    }

    #[test]
    fn test_diagram_key_hash() {
        let key1 = make_key("@startuml\nA -> B\n@enduml", &[]);
        let key2 = make_key("@startuml\nA -> B\n@enduml", &[]);
        let key3 = make_key("@startuml\nC -> D\n@enduml", &[]);

        assert_eq!(key1.compute_hash(), key2.compute_hash());
        assert_ne!(key1.compute_hash(), key3.compute_hash());
        assert_eq!(key1.compute_hash().len(), 64);
    }

    #[test]
    fn test_diagram_key_config_matters() {
        let config = vec!["skinparam monochrome true".to_owned()];
        let plain = make_key("source", &[]);
        let configured = make_key("source", &config);

        assert_ne!(plain.etag(), configured.etag());
    }

    #[test]
    fn test_diagram_key_position_matters() {
        let first = make_key("source", &[]);
        let second = DiagramKey {
            position: 1,
            ..first
        };

        assert_ne!(first.etag(), second.etag());
    }

    #[test]
    fn test_etag_format() {
        let etag = make_key("test source", &[]).etag();

        assert_eq!(etag.len(), 32);
        assert!(etag.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
