//! Watermark compositor for SVG output.
//!
//! Rewrites a rendered SVG so that a disclaimer block sits above the
//! original diagram and a rotated background text runs behind it:
//!
//! 1. Width grows to at least [`MIN_WIDTH`], height by [`HEADER_HEIGHT`];
//!    `viewBox` follows the new size
//! 2. The first top-level `<g>` (the diagram) is translated down by
//!    [`HEADER_HEIGHT`]
//! 3. The background block goes right before that group, the disclaimer
//!    block after everything else
//!
//! Without a top-level `<g>` only the resize happens. The rewrite is best effort: on any failure the rendered bytes are
//! returned untouched.

mod parser;
mod serializer;
mod template;
mod tree;

pub use template::WatermarkTemplate;

use tree::{Element, Node};

/// Minimum width of a watermarked image.
const MIN_WIDTH: u32 = 400;

/// Vertical room reserved for the disclaimer block.
const HEADER_HEIGHT: u32 = 150;

/// Transform shifting the diagram below the disclaimer.
const CONTENT_SHIFT: &str = "translate(0, 150)";

/// Failure to rewrite an SVG document.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WatermarkError {
    /// Document is not UTF-8.
    #[error("SVG is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// XML syntax error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Attribute syntax error.
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Well-formed XML that is not a usable document.
    #[error("malformed document: {0}")]
    Malformed(&'static str),

    /// Root `width`/`height` missing or not a number.
    #[error("invalid {attr} attribute: {value:?}")]
    Dimension {
        /// Attribute name.
        attr: &'static str,
        /// Raw attribute value, empty when missing.
        value: String,
    },

    /// Overlay template is unusable.
    #[error("invalid watermark template: {0}")]
    Template(&'static str),
}

/// Add the watermark to `svg`, or return `svg` unchanged if that fails.
pub(crate) fn apply(svg: &[u8], template: &WatermarkTemplate) -> Vec<u8> {
    match compose(svg, template) {
        Ok(out) => out.into_bytes(),
        Err(err) => {
            tracing::debug!(error = %err, "Watermark skipped");
            svg.to_vec()
        }
    }
}

fn compose(svg: &[u8], template: &WatermarkTemplate) -> Result<String, WatermarkError> {
    let mut doc = parser::parse(std::str::from_utf8(svg)?)?;
    let root = &mut doc.root;
    if root.local_name() != "svg" {
        return Err(WatermarkError::Malformed("root element is not <svg>"));
    }

    let width = dimension(root, "width")?.max(MIN_WIDTH);
    let height = dimension(root, "height")?.saturating_add(HEADER_HEIGHT);
    root.set_attr("width", format!("{width}px"));
    root.set_attr("height", format!("{height}px"));
    root.set_attr("viewBox", format!("0 0 {width} {height}"));

    let group = root
        .children
        .iter()
        .position(|node| node.as_element().is_some_and(|e| e.local_name() == "g"));
    let Some(position) = group else {
        tracing::debug!("No top-level <g>, overlay skipped");
        return Ok(serializer::serialize(&doc));
    };
    if let Some(Node::Element(content)) = root.children.get_mut(position) {
        let transform = match content.attr("transform") {
            Some(existing) => format!("{CONTENT_SHIFT} {existing}"),
            None => CONTENT_SHIFT.to_owned(),
        };
        content.set_attr("transform", transform);
    }

    root.children.push(Node::Element(template.disclaimer()));
    root.children
        .insert(position, Node::Element(template.background(width, height)));

    Ok(serializer::serialize(&doc))
}

/// Integer value of a size attribute, ignoring a unit suffix (`120px`).
fn dimension(root: &Element, attr: &'static str) -> Result<u32, WatermarkError> {
    let raw = root.attr(attr).unwrap_or_default();
    let number = raw.trim().trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let whole = number.split_once('.').map_or(number, |(whole, _)| whole);
    whole.parse().map_err(|_| WatermarkError::Dimension {
        attr,
        value: raw.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONTENT: &str = r#"<g id="content"><rect x="1" y="2" width="3" height="4"/><text>Alice &amp; Bob</text></g>"#;

    fn svg(width: &str, height: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="us-ascii" standalone="no"?><svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 1 1"><defs/>{CONTENT}</svg>"#
        )
    }

    fn template() -> WatermarkTemplate {
        WatermarkTemplate::new("iunderstandiusetestpublicplantuml").unwrap()
    }

    fn watermark(input: &str) -> tree::Document {
        let out = apply(input.as_bytes(), &template());
        parser::parse(std::str::from_utf8(&out).unwrap()).unwrap()
    }

    #[test]
    fn test_narrow_image_widened() {
        let doc = watermark(&svg("120px", "80px"));
        assert_eq!(doc.root.attr("width"), Some("400px"));
        assert_eq!(doc.root.attr("height"), Some("230px"));
        assert_eq!(doc.root.attr("viewBox"), Some("0 0 400 230"));
    }

    #[test]
    fn test_wide_image_keeps_width() {
        let doc = watermark(&svg("812px", "600px"));
        assert_eq!(doc.root.attr("width"), Some("812px"));
        assert_eq!(doc.root.attr("height"), Some("750px"));
        assert_eq!(doc.root.attr("viewBox"), Some("0 0 812 750"));
    }

    #[test]
    fn test_unitless_dimensions() {
        let doc = watermark(&svg("500", "300.5"));
        assert_eq!(doc.root.attr("width"), Some("500px"));
        assert_eq!(doc.root.attr("height"), Some("450px"));
    }

    #[test]
    fn test_missing_view_box_added() {
        let input = format!(r#"<svg width="10px" height="10px">{CONTENT}</svg>"#);
        let doc = watermark(&input);
        assert_eq!(doc.root.attr("viewBox"), Some("0 0 400 160"));
    }

    #[test]
    fn test_layout_order() {
        let doc = watermark(&svg("400px", "400px"));
        let names: Vec<_> = doc.root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["defs", "g", "g", "g"]);

        let mut groups = doc.root.elements().skip(1);
        let background = groups.next().unwrap();
        let content = groups.next().unwrap();
        let disclaimer = groups.next().unwrap();

        let rotated = background.elements().next().unwrap();
        assert_eq!(rotated.attr("transform"), Some("rotate(-45 200 275)"));
        assert_eq!(rotated.attr("font-size"), Some("66px"));
        assert_eq!(content.attr("id"), Some("content"));
        assert_eq!(disclaimer, &template().disclaimer());
    }

    #[test]
    fn test_content_only_translated() {
        let input = svg("300px", "200px");
        let original = parser::parse(&input).unwrap();
        let doc = watermark(&input);

        let before = original.root.elements().nth(1).unwrap();
        let after = doc.root.elements().nth(2).unwrap();

        assert_eq!(after.attr("transform"), Some("translate(0, 150)"));
        assert_eq!(after.children, before.children);
        let other: Vec<_> = after.attrs.iter().filter(|(k, _)| k != "transform").collect();
        let expected: Vec<_> = before.attrs.iter().collect();
        assert_eq!(other, expected);
    }

    #[test]
    fn test_existing_transform_kept_after_shift() {
        let input = r#"<svg width="400px" height="100px"><g transform="scale(2)"><rect/></g></svg>"#;
        let doc = watermark(input);
        let content = doc.root.elements().nth(1).unwrap();
        assert_eq!(content.attr("transform"), Some("translate(0, 150) scale(2)"));
    }

    #[test]
    fn test_malformed_svg_returned_unchanged() {
        let template = template();
        for input in [
            "<svg width=\"10px\" height=\"10px\"><g></svg>".as_bytes(),
            b"<svg width=\"auto\" height=\"10px\"><g/></svg>",
            b"<html><g/></html>",
            b"\xff\xfe<svg/>",
            b"",
        ] {
            assert_eq!(apply(input, &template), input);
        }
    }

    #[test]
    fn test_without_group_only_resized() {
        let input = r#"<svg width="100px" height="50px" viewBox="0 0 100 50"><rect/></svg>"#;
        let doc = watermark(input);

        assert_eq!(doc.root.attr("width"), Some("400px"));
        assert_eq!(doc.root.attr("height"), Some("200px"));
        assert_eq!(doc.root.attr("viewBox"), Some("0 0 400 200"));
        let names: Vec<_> = doc.root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["rect"]);
    }

    #[test]
    fn test_output_declares_utf8() {
        let out = apply(svg("400px", "400px").as_bytes(), &template());
        assert!(out.starts_with(br#"<?xml version="1.0" encoding="UTF-8""#));
    }
}
