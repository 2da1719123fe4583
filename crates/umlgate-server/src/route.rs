//! Output kinds selected by the first path segment.

use umlgate_engine::FileFormat;

/// MIME type of the textual outputs.
const TEXT_PLAIN: &str = "text/plain;charset=UTF-8";

/// What a request asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Image bytes in the given format.
    Image(FileFormat),
    /// PNG image as a `data:` URI.
    Base64,
    /// Client-side image map markup.
    Map,
    /// Syntax check report.
    Check,
}

impl OutputFormat {
    /// Output kind for a route segment (`png`, `svg`, `base64`, `map`, ...).
    pub(crate) fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "base64" => Some(Self::Base64),
            "map" => Some(Self::Map),
            "check" => Some(Self::Check),
            other => FileFormat::from_name(other).map(Self::Image),
        }
    }

    /// `Content-Type` of the response body.
    pub(crate) fn mime_type(self) -> &'static str {
        match self {
            Self::Image(format) => format.mime_type(),
            Self::Base64 | Self::Map | Self::Check => TEXT_PLAIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_segment() {
        assert_eq!(
            OutputFormat::from_segment("svg"),
            Some(OutputFormat::Image(FileFormat::Svg))
        );
        assert_eq!(
            OutputFormat::from_segment("png"),
            Some(OutputFormat::Image(FileFormat::Png))
        );
        assert_eq!(OutputFormat::from_segment("base64"), Some(OutputFormat::Base64));
        assert_eq!(OutputFormat::from_segment("map"), Some(OutputFormat::Map));
        assert_eq!(OutputFormat::from_segment("check"), Some(OutputFormat::Check));
        assert_eq!(OutputFormat::from_segment("gif"), None);
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(
            OutputFormat::Image(FileFormat::Svg).mime_type(),
            "image/svg+xml"
        );
        assert_eq!(OutputFormat::Image(FileFormat::Png).mime_type(), "image/png");
        assert_eq!(OutputFormat::Base64.mime_type(), "text/plain;charset=UTF-8");
        assert_eq!(OutputFormat::Map.mime_type(), "text/plain;charset=UTF-8");
    }
}
