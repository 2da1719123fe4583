//! Watermark overlay fragments.

use super::WatermarkError;
use super::parser::parse;
use super::tree::Element;

/// Overlay source: a disclaimer group followed by a background group.
///
/// `{segment}` is replaced by the opt-out path segment.
const TEMPLATE_SOURCE: &str = concat!(
    r#"<svg xmlns="http://www.w3.org/2000/svg">"#,
    "<g>",
    r##"<text font-family="sans-serif" font-size="12" y="19" x="19" stroke-width="0" fill="#bf0000">"##,
    "<tspan>You are using a public test server</tspan>",
    r#"<tspan x="19" dy="1.2em">for diagram rendering.</tspan>"#,
    r#"<tspan x="19" dy="1.2em">If you accept that it is meant for testing</tspan>"#,
    r#"<tspan x="19" dy="1.2em">and public use only, and want to render</tspan>"#,
    r#"<tspan x="19" dy="1.2em">without this notice, add this segment</tspan>"#,
    r#"<tspan x="19" dy="1.2em">in front of the diagram path:</tspan>"#,
    r#"<tspan x="19" dy="1.2em">/{segment}/</tspan>"#,
    "</text>",
    "</g>",
    "<g>",
    r##"<text transform="rotate(-45 200 212)" opacity="0.2" stroke="#000" font-family="sans-serif" "##,
    r##"font-size="67px" y="50%" x="50%" text-anchor="middle" dominant-baseline="central" fill="#bf0000">"##,
    "<tspan>test</tspan>",
    r#"<tspan x="50%" dy="-1.2em">public</tspan>"#,
    r#"<tspan x="50%" dy="2.4em">server</tspan>"#,
    "</text>",
    "</g>",
    "</svg>"
);

/// Parsed overlay fragments, built once at startup.
///
/// Fragments are only ever cloned; every request edits its own copy.
#[derive(Debug)]
pub struct WatermarkTemplate {
    disclaimer: Element,
    background: Element,
}

impl WatermarkTemplate {
    /// Build the template, naming `public_segment` as the opt-out path.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::Template`] if the overlay cannot be built.
    pub fn new(public_segment: &str) -> Result<Self, WatermarkError> {
        let source = TEMPLATE_SOURCE.replace("{segment}", &escape_text(public_segment));
        let doc = parse(&source)?;

        let mut groups = doc.root.elements().cloned();
        let (Some(disclaimer), Some(background)) = (groups.next(), groups.next()) else {
            return Err(WatermarkError::Template("expected two groups"));
        };
        if background.elements().next().is_none() {
            return Err(WatermarkError::Template("background group has no text"));
        }

        Ok(Self {
            disclaimer,
            background,
        })
    }

    /// Copy of the disclaimer block, anchored at the top-left corner.
    #[must_use]
    pub(crate) fn disclaimer(&self) -> Element {
        self.disclaimer.clone()
    }

    /// Copy of the background block centered on a `width` x `height` canvas.
    #[must_use]
    pub(crate) fn background(&self, width: u32, height: u32) -> Element {
        let x_center = width / 2;
        let y_center = height / 2;
        let font_size = width.min(height) / 6;

        let mut background = self.background.clone();
        if let Some(text) = background.elements_mut().next() {
            text.set_attr("transform", format!("rotate(-45 {x_center} {y_center})"));
            text.set_attr("x", format!("{x_center}px"));
            text.set_attr("y", format!("{y_center}px"));
            text.set_attr("font-size", format!("{font_size}px"));
            for span in text.elements_mut() {
                if span.attr("x").is_some() {
                    span.set_attr("x", format!("{x_center}px"));
                }
            }
        }
        background
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_template_builds() {
        let template = WatermarkTemplate::new("opt-out").unwrap();
        assert_eq!(template.disclaimer().name, "g");
        assert_eq!(template.background(400, 400).name, "g");
    }

    #[test]
    fn test_disclaimer_names_segment() {
        let template = WatermarkTemplate::new("a&b").unwrap();
        let text = template.disclaimer.elements().next().unwrap();
        let last = text.elements().last().unwrap();
        assert_eq!(
            last.children,
            vec![super::super::tree::Node::Text("/a&amp;b/".to_owned())]
        );
    }

    #[test]
    fn test_background_geometry() {
        let template = WatermarkTemplate::new("opt-out").unwrap();
        let background = template.background(400, 350);
        let text = background.elements().next().unwrap();

        assert_eq!(text.attr("transform"), Some("rotate(-45 200 175)"));
        assert_eq!(text.attr("x"), Some("200px"));
        assert_eq!(text.attr("y"), Some("175px"));
        assert_eq!(text.attr("font-size"), Some("58px"));

        let spans: Vec<_> = text.elements().map(|span| span.attr("x")).collect();
        assert_eq!(spans, [None, Some("200px"), Some("200px")]);
    }

    #[test]
    fn test_background_leaves_template_untouched() {
        let template = WatermarkTemplate::new("opt-out").unwrap();
        let _ = template.background(1000, 800);
        let text = template.background.elements().next().unwrap();
        assert_eq!(text.attr("transform"), Some("rotate(-45 200 212)"));
        assert_eq!(text.attr("font-size"), Some("67px"));
    }
}
