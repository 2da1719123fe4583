//! Source-level helpers shared by every engine.

use crate::Diagram;

/// One `@start…`/`@end…` block of a diagram source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Diagram kind from the start marker (`uml`, `mindmap`, ...).
    pub kind: String,
    /// Block text including its start and end lines.
    pub text: String,
}

/// Start-of-source prefixes of diagrams whose content changes between renders.
const VOLATILE_PREFIXES: &[&str] = &[
    "@startuml\nversion",
    "@startuml\ntestdot",
    "@startuml\ncheckversion",
];

/// Builtins that expand to the current time.
const VOLATILE_BUILTINS: &[&str] = &["%date", "%now", "%time"];

/// Split a source into its diagram blocks.
///
/// Text outside blocks is ignored. A source without any start marker is
/// treated as a single `@startuml` block. An unterminated block runs to the
/// end of the source.
#[must_use]
pub fn split_blocks(source: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in source.lines() {
        let trimmed = line.trim_start();
        match current.as_mut() {
            None => {
                if let Some(rest) = trimmed.strip_prefix("@start") {
                    current = Some((marker_kind(rest), vec![line]));
                }
            }
            Some((_, lines)) => {
                lines.push(line);
                if trimmed.starts_with("@end")
                    && let Some((kind, lines)) = current.take()
                {
                    blocks.push(Block {
                        kind,
                        text: lines.join("\n"),
                    });
                }
            }
        }
    }

    if let Some((kind, lines)) = current {
        blocks.push(Block {
            kind,
            text: lines.join("\n"),
        });
    }

    if blocks.is_empty() {
        let body = source.trim_matches('\n');
        let text = if body.is_empty() {
            "@startuml\n@enduml".to_owned()
        } else {
            format!("@startuml\n{body}\n@enduml")
        };
        blocks.push(Block {
            kind: "uml".to_owned(),
            text,
        });
    }

    blocks
}

/// Diagram kind from the text following `@start` (`uml(id=x)` gives `uml`).
fn marker_kind(rest: &str) -> String {
    let kind: String = rest
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect();
    if kind.is_empty() { "uml".to_owned() } else { kind }
}

/// Whether responses for this source may be cached by clients.
///
/// Sources that print version information or the current time render
/// differently on every request.
#[must_use]
pub fn is_cacheable(source: &str) -> bool {
    let lower = source.to_lowercase().replace("\r\n", "\n");
    if VOLATILE_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        return false;
    }
    !VOLATILE_BUILTINS
        .iter()
        .any(|builtin| lower.contains(builtin))
}

/// Locate image `index` across diagrams, counting images in order.
///
/// Returns the diagram and the image index within it.
#[must_use]
pub fn select_image(diagrams: &[Box<dyn Diagram>], index: usize) -> Option<(&dyn Diagram, usize)> {
    let mut remaining = index;
    for diagram in diagrams {
        let count = diagram.image_count();
        if remaining < count {
            return Some((diagram.as_ref(), remaining));
        }
        remaining -= count;
    }
    None
}
