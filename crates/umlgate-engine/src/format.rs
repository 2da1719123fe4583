//! Renderable file formats.

use std::fmt;

/// Format of a rendered diagram image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Raster image.
    Png,
    /// Vector image (XML document).
    Svg,
    /// ASCII art.
    Txt,
    /// PDF document.
    Pdf,
}

impl FileFormat {
    /// MIME type sent as `Content-Type`.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
            Self::Txt => "text/plain;charset=UTF-8",
            Self::Pdf => "application/pdf",
        }
    }

    /// Format name used in render service URLs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Txt => "txt",
            Self::Pdf => "pdf",
        }
    }

    /// Parse a format name (`png`, `svg`, `txt`, `pdf`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "txt" => Some(Self::Txt),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for format in [FileFormat::Png, FileFormat::Svg, FileFormat::Txt, FileFormat::Pdf] {
            assert_eq!(FileFormat::from_name(format.name()), Some(format));
        }
        assert_eq!(FileFormat::from_name("eps"), None);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(FileFormat::Svg.mime_type(), "image/svg+xml");
        assert_eq!(FileFormat::Png.mime_type(), "image/png");
    }
}
