//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension, and
//! decides which extensions are streamed as media.

use std::collections::HashSet;
use std::path::Path;

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use lan_share::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
/// assert_eq!(get_content_type(Some("MP4")), "video/mp4");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let extension = extension.map(str::to_ascii_lowercase);
    match extension.as_deref() {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md" | "log") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv",
        Some("srt") => "application/x-subrip",
        Some("vtt") => "text/vtt",
        Some("xml") => "application/xml",
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",

        // Video
        Some("mp4" | "m4v") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("ts") => "video/mp2t",
        Some("flv") => "video/x-flv",
        Some("wmv") => "video/x-ms-wmv",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",
        Some("ogg" | "oga") => "audio/ogg",

        // Documents and archives
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("7z") => "application/x-7z-compressed",

        // Default
        _ => "application/octet-stream",
    }
}

/// Content-Type for a media file
///
/// Always a `video/*` type: known containers use their registered
/// subtype, any other configured extension (audio ones included) maps to
/// `video/<extension>`.
pub fn media_content_type(extension: &str) -> String {
    let known = get_content_type(Some(extension));
    if known.starts_with("video/") {
        known.to_string()
    } else {
        format!("video/{}", extension.to_ascii_lowercase())
    }
}

/// Extensions served through the ranged streaming path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypes {
    extensions: HashSet<String>,
}

impl MediaTypes {
    /// Build from a list of extensions, with or without a leading dot
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    /// Media extension of `path`, if it is classified as media
    pub fn media_extension<'a>(&self, path: &'a Path) -> Option<&'a str> {
        let ext = path.extension()?.to_str()?;
        self.extensions
            .contains(&ext.to_ascii_lowercase())
            .then_some(ext)
    }

    pub fn is_media(&self, path: &Path) -> bool {
        self.media_extension(path).is_some()
    }
}

impl Default for MediaTypes {
    fn default() -> Self {
        Self::new(["mp4", "mkv", "avi"])
    }
}
