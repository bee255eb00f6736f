use std::fmt;

/// Orientation bucket of a video, derived from its display aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    Landscape,
    Portrait,
    Other,
}

impl Geometry {
    /// Classify an ffprobe `display_aspect_ratio` string.
    ///
    /// Only the exact ratios `16:9` and `9:16` are recognised.
    pub fn from_aspect_ratio(ratio: &str) -> Self {
        match ratio {
            "16:9" => Geometry::Landscape,
            "9:16" => Geometry::Portrait,
            _ => Geometry::Other,
        }
    }

    /// Object key namespace for videos of this geometry.
    pub fn key_prefix(self) -> &'static str {
        match self {
            Geometry::Landscape => "landscape/",
            Geometry::Portrait => "portrait/",
            Geometry::Other => "other/",
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Geometry::Landscape => "landscape",
            Geometry::Portrait => "portrait",
            Geometry::Other => "other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_table() {
        let cases = [
            ("16:9", "landscape/"),
            ("9:16", "portrait/"),
            ("4:3", "other/"),
            ("1:1", "other/"),
            ("", "other/"),
            ("16:09", "other/"),
            (" 16:9", "other/"),
            ("N/A", "other/"),
        ];
        for (ratio, prefix) in cases {
            assert_eq!(
                Geometry::from_aspect_ratio(ratio).key_prefix(),
                prefix,
                "ratio {:?}",
                ratio
            );
        }
    }
}
