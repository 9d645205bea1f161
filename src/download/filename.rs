//! Destination naming for card images.
//!
//! Filenames follow `{name}[-{face}] ({set}) {collector}[_{copy}]{ext}` and are
//! placed under the output root, optionally inside a per-set folder.

use std::path::{Path, PathBuf};

use url::Url;

use super::size::ImageSize;
use crate::resolver::ResolvedCard;

/// Folder used when no input file names the output root.
pub const DEFAULT_OUTPUT_DIR: &str = "cards";

/// Layout and naming choices for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingOptions {
    /// Directory every image is written under
    pub output_root: PathBuf,
    /// Place images in a sub-folder named after the set code
    pub by_set: bool,
    /// One image per printing regardless of quantity
    pub unique: bool,
    /// Image variant to download
    pub size: ImageSize,
}

impl NamingOptions {
    /// Creates options with every switch off and the default size.
    #[must_use]
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            by_set: false,
            unique: false,
            size: ImageSize::default(),
        }
    }
}

/// Output root derived from the input file stem, or [`DEFAULT_OUTPUT_DIR`].
#[must_use]
pub fn default_output_root(input: Option<&Path>) -> PathBuf {
    input
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy())
        .map(|stem| sanitize_component(&stem))
        .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from)
}

/// Computes the destination of one image.
///
/// `copy` is the 1-based copy number, or `None` when only one file is written
/// for the printing. The face suffix is added only for multi-face cards.
#[must_use]
pub fn destination_path(
    root: &Path,
    card: &ResolvedCard,
    face_index: usize,
    copy: Option<u32>,
    options: &NamingOptions,
) -> PathBuf {
    let face = card.faces.get(face_index);
    let url = face.and_then(|f| f.image_urls.get(options.size.as_str()));

    let mut stem = card.canonical_name.clone();
    if card.is_multi_face()
        && let Some(face) = face
    {
        stem.push('-');
        stem.push_str(&face.face_name);
    }
    stem.push_str(&format!(" ({}) {}", card.set_code, card.collector_number));
    if let Some(copy) = copy {
        stem.push_str(&format!("_{copy}"));
    }

    let extension = url.map_or_else(
        || options.size.default_extension().to_string(),
        |url| extension_for(url, options.size),
    );
    let filename = format!("{}{extension}", sanitize_component(&stem));

    let mut path = root.to_path_buf();
    if options.by_set {
        path.push(sanitize_component(&card.set_code));
    }
    path.push(filename);
    path
}

/// Extension taken from the URL path when it is an image extension,
/// otherwise the size's default.
#[must_use]
pub fn extension_for(url: &str, size: ImageSize) -> String {
    extension_from_url(url)
        .filter(|ext| matches!(ext.as_str(), ".png" | ".jpg" | ".jpeg"))
        .unwrap_or_else(|| size.default_extension().to_string())
}

fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last_segment = parsed.path_segments()?.next_back()?;
    let dot_index = last_segment.rfind('.')?;
    let ext = &last_segment[dot_index..];
    if ext.len() <= 1 || ext.len() > 12 {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Makes a value safe to use as one path component.
///
/// Strips `/ \ : * ? " < > |` and control characters, collapses whitespace,
/// and trims leading and trailing dots and spaces. Yields `card` when
/// nothing is left.
#[must_use]
pub fn sanitize_component(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if c.is_control() {
                None
            } else {
                Some(c)
            }
        })
        .collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "card".to_string()
    } else {
        trimmed.to_string()
    }
}
