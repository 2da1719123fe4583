//! `PlantUML` block preprocessing.
//!
//! This module prepares a block before it is sent to the render service:
//! - Resolves local `!include` directives when includes are allowed
//! - Injects the process-wide config lines after the `@start` line

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::consts::MAX_INCLUDE_DEPTH;

static INCLUDE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\s*)!include\s+(.+)$").expect("invalid include regex"));

/// Indent content with the given whitespace prefix, preserving empty lines.
fn indent_content(content: &str, indent: &str) -> String {
    if indent.is_empty() {
        return content.to_owned();
    }
    content
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result of preparing a block with potential warnings.
#[derive(Debug)]
pub(crate) struct PrepareResult {
    /// Prepared block source.
    pub source: String,
    /// Warnings generated during preparation (e.g., unresolved includes).
    pub warnings: Vec<String>,
}

/// Whether an include path stays inside the directory it is joined to.
fn is_contained(include_path: &str) -> bool {
    Path::new(include_path)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Resolve `!include` directives against the include directories.
fn resolve_includes(
    source: &str,
    include_dirs: &[PathBuf],
    depth: usize,
    warnings: &mut Vec<String>,
) -> String {
    if depth > MAX_INCLUDE_DEPTH {
        warnings.push(format!(
            "Include depth exceeded maximum of {MAX_INCLUDE_DEPTH}"
        ));
        return source.to_owned();
    }

    let mut result = source.to_owned();

    for caps in INCLUDE_PATTERN.captures_iter(source) {
        let leading_whitespace = caps.get(1).map_or("", |m| m.as_str());
        let include_path = caps.get(2).map_or("", |m| m.as_str()).trim();
        let full_match = caps.get(0).map_or("", |m| m.as_str());

        // Standard library and remote includes are the engine's business
        if (include_path.starts_with('<') && include_path.ends_with('>'))
            || include_path.starts_with("http://")
            || include_path.starts_with("https://")
        {
            continue;
        }

        if !is_contained(include_path) {
            warnings.push(format!(
                "Include path escapes include directories: '{include_path}'"
            ));
            continue;
        }

        let resolved = include_dirs.iter().find_map(|dir| {
            std::fs::read_to_string(dir.join(include_path)).ok()
        });

        if let Some(content) = resolved {
            let resolved_content = resolve_includes(&content, include_dirs, depth + 1, warnings);
            let indented_content = indent_content(&resolved_content, leading_whitespace);
            result = result.replace(full_match, &indented_content);
        } else {
            let searched_paths: Vec<_> = include_dirs
                .iter()
                .map(|d| d.join(include_path).display().to_string())
                .collect();
            warnings.push(format!(
                "Include file not found: '{}' (searched: {})",
                include_path,
                searched_paths.join(", ")
            ));
        }
    }

    result
}

/// Prepare a block for rendering.
///
/// Resolves includes when `include_dirs` is given, then injects `config`
/// lines right after the `@start` line.
///
/// # Arguments
/// * `block` - Block text starting with its `@start` line
/// * `config` - Config lines applied to every diagram
/// * `include_dirs` - Directories for `!include` resolution (`None` leaves directives alone)
pub(crate) fn prepare_block(
    block: &str,
    config: &[String],
    include_dirs: Option<&[PathBuf]>,
) -> PrepareResult {
    let mut warnings = Vec::new();
    let resolved = match include_dirs {
        Some(dirs) => resolve_includes(block, dirs, 0, &mut warnings),
        None => block.to_owned(),
    };

    if config.is_empty() {
        return PrepareResult {
            source: resolved,
            warnings,
        };
    }

    let mut config_block = config.join("\n");
    config_block.push('\n');

    let final_source = if let Some(newline_pos) = resolved.find('\n') {
        let insert_pos = newline_pos + 1;
        let mut result = String::with_capacity(resolved.len() + config_block.len());
        result.push_str(&resolved[..insert_pos]);
        result.push_str(&config_block);
        result.push_str(&resolved[insert_pos..]);
        result
    } else {
        format!("{resolved}\n{config_block}")
    };

    PrepareResult {
        source: final_source,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| (*l).to_owned()).collect()
    }

    #[test]
    fn test_prepare_without_config_is_identity() {
        let block = "@startuml\nAlice -> Bob\n@enduml";
        let result = prepare_block(block, &[], None);
        assert_eq!(result.source, block);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_prepare_injects_config_after_start_line() {
        let block = "@startuml\nAlice -> Bob\n@enduml";
        let result = prepare_block(
            block,
            &config(&["skinparam monochrome true", "skinparam dpi 150"]),
            None,
        );
        assert_eq!(
            result.source,
            "@startuml\nskinparam monochrome true\nskinparam dpi 150\nAlice -> Bob\n@enduml"
        );
    }

    #[test]
    fn test_prepare_single_line_block() {
        let result = prepare_block("@startuml", &config(&["skinparam dpi 150"]), None);
        assert_eq!(result.source, "@startuml\nskinparam dpi 150\n");
    }

    #[test]
    fn test_includes_untouched_when_disabled() {
        let block = "@startuml\n!include missing.iuml\n@enduml";
        let result = prepare_block(block, &[], None);
        assert_eq!(result.source, block);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unresolved_include_with_dirs_shows_searched_paths() {
        let block = "@startuml\n!include missing.iuml\nAlice -> Bob\n@enduml";
        let include_dirs = vec![PathBuf::from("/tmp/includes")];
        let result = prepare_block(block, &[], Some(&include_dirs));

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("missing.iuml"));
        assert!(result.warnings[0].contains("/tmp/includes"));
    }

    #[test]
    fn test_stdlib_include_no_warning() {
        let block = "@startuml\n!include <C4/C4_Container>\n@enduml";
        let result = prepare_block(block, &[], Some(&[]));

        assert!(result.warnings.is_empty());
        assert!(result.source.contains("!include <C4/C4_Container>"));
    }

    #[test]
    fn test_escaping_include_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let block = "@startuml\n!include ../../etc/passwd\n@enduml";
        let result = prepare_block(block, &[], Some(&[dir.path().to_path_buf()]));

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("escapes"));
        assert!(result.source.contains("!include ../../etc/passwd"));
    }

    #[test]
    fn test_indented_include_resolved() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("component.iuml"), "Line1\n\nLine3").unwrap();

        let block = "@startuml\nnode n {\n  !include component.iuml\n}\n@enduml";
        let result = prepare_block(block, &[], Some(&[dir.path().to_path_buf()]));

        assert!(result.warnings.is_empty());
        assert!(result.source.contains("  Line1\n\n  Line3"));
        assert!(!result.source.contains("!include"));
    }

    #[test]
    fn test_include_depth_exceeded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("recursive.iuml"),
            "!include recursive.iuml\nContent",
        )
        .unwrap();

        let block = "@startuml\n!include recursive.iuml\n@enduml";
        let result = prepare_block(block, &[], Some(&[dir.path().to_path_buf()]));

        assert!(result.warnings.iter().any(|w| w.contains("depth exceeded")));
    }

    #[test]
    fn test_include_then_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("part.iuml"), "Alice -> Bob").unwrap();

        let block = "@startuml\n!include part.iuml\n@enduml";
        let result = prepare_block(
            block,
            &config(&["skinparam monochrome true"]),
            Some(&[dir.path().to_path_buf()]),
        );

        assert_eq!(
            result.source,
            "@startuml\nskinparam monochrome true\nAlice -> Bob\n@enduml"
        );
    }
}
