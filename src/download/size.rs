//! Image size keywords accepted by the image host.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One of the image variants every printing exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ImageSize {
    /// Full-resolution PNG with transparent corners
    #[default]
    Png,
    /// Large JPEG
    Large,
    /// Normal JPEG
    Normal,
    /// Small JPEG
    Small,
    /// Artwork only
    ArtCrop,
    /// Full card with the border trimmed
    BorderCrop,
}

impl ImageSize {
    /// Every keyword, in the order shown to users.
    pub const ALL: [ImageSize; 6] = [
        ImageSize::Png,
        ImageSize::Large,
        ImageSize::Normal,
        ImageSize::Small,
        ImageSize::ArtCrop,
        ImageSize::BorderCrop,
    ];

    /// Keyword used as the key of the API's `image_uris` map.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Large => "large",
            Self::Normal => "normal",
            Self::Small => "small",
            Self::ArtCrop => "art_crop",
            Self::BorderCrop => "border_crop",
        }
    }

    /// Extension used when the image URL does not carry one.
    #[must_use]
    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Png => ".png",
            _ => ".jpg",
        }
    }

    /// Comma-separated list of valid keywords, for error messages.
    #[must_use]
    pub fn valid_keywords() -> String {
        Self::ALL
            .iter()
            .map(|size| size.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a size keyword is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown image size '{0}' (expected one of: {valid})", valid = ImageSize::valid_keywords())]
pub struct UnknownImageSize(pub String);

impl FromStr for ImageSize {
    type Err = UnknownImageSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == wanted)
            .ok_or_else(|| UnknownImageSize(s.to_string()))
    }
}
