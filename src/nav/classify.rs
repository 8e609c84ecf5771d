//! Entry classification
//!
//! Decides which viewer handles an activated entry: directories are
//! descended into, files with a playable extension go to the media player,
//! everything else to the document viewer.

use super::path::NavigationPath;
use crate::services::accessor::Entry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Extensions the media pipeline can play, by preferred filename extension
pub const DEFAULT_MEDIA_EXTENSIONS: &[&str] = &[
    "3g2", "3gp", "aac", "ac3", "aif", "aifc", "aiff", "amr", "au", "caf", "eac3", "flac", "m4a",
    "m4b", "m4r", "m4v", "mov", "mp3", "mp4", "mpg", "mpeg", "qt", "snd", "wav",
];

/// Where an activated entry leads
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutingDecision {
    /// Open a new navigation level for this directory
    Descend(NavigationPath),
    /// Hand the file to the media player
    PlayMedia(NavigationPath),
    /// Hand the file to the generic document viewer
    ViewDocument(NavigationPath),
}

impl RoutingDecision {
    pub fn path(&self) -> &NavigationPath {
        match self {
            RoutingDecision::Descend(path)
            | RoutingDecision::PlayMedia(path)
            | RoutingDecision::ViewDocument(path) => path,
        }
    }

    /// Whether the decision leaves the browser for a viewer
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RoutingDecision::Descend(_))
    }
}

/// `descend: movies/2024`, `play media: clip.mp4`, `view document: notes.txt`
impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingDecision::Descend(path) => write!(f, "descend: {}", path),
            RoutingDecision::PlayMedia(path) => write!(f, "play media: {}", path),
            RoutingDecision::ViewDocument(path) => write!(f, "view document: {}", path),
        }
    }
}

/// How extensions are compared against the media set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionMatch {
    /// Fold both sides to lowercase: "CLIP.MP4" plays
    #[default]
    CaseInsensitive,
    /// Compare as given; the caller is expected to normalize the set
    CaseSensitive,
}

/// Set of playable extensions, without the leading dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaExtensions {
    extensions: HashSet<String>,
    matching: ExtensionMatch,
}

impl MediaExtensions {
    pub fn new<I, S>(extensions: I, matching: ExtensionMatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| match matching {
                ExtensionMatch::CaseInsensitive => ext.as_ref().to_lowercase(),
                ExtensionMatch::CaseSensitive => ext.as_ref().to_string(),
            })
            .collect();
        Self {
            extensions,
            matching,
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty::<&str>(), ExtensionMatch::default())
    }

    pub fn matching(&self) -> ExtensionMatch {
        self.matching
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn contains(&self, extension: &str) -> bool {
        match self.matching {
            ExtensionMatch::CaseInsensitive => {
                self.extensions.contains(&extension.to_lowercase())
            }
            ExtensionMatch::CaseSensitive => self.extensions.contains(extension),
        }
    }
}

impl Default for MediaExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_EXTENSIONS, ExtensionMatch::default())
    }
}

/// Extension of a file name: the text after the final dot
///
/// A leading dot marks a hidden name rather than an extension, and a
/// trailing dot yields no extension.
pub fn extension_of(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => {
            let ext = &name[idx + 1..];
            if ext.is_empty() {
                None
            } else {
                Some(ext)
            }
        }
    }
}

/// Route an activated entry to its viewer
pub fn classify(
    entry: &Entry,
    child_path: NavigationPath,
    media: &MediaExtensions,
) -> RoutingDecision {
    if entry.is_directory {
        return RoutingDecision::Descend(child_path);
    }

    match extension_of(&entry.name) {
        Some(ext) if media.contains(ext) => RoutingDecision::PlayMedia(child_path),
        _ => RoutingDecision::ViewDocument(child_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn mp4_mkv() -> MediaExtensions {
        MediaExtensions::new(["mp4", "mkv"], ExtensionMatch::CaseInsensitive)
    }

    fn path(s: &str) -> NavigationPath {
        NavigationPath::from_segments(s.split('/'))
    }

    #[test]
    fn test_directories_always_descend() {
        let dir = Entry::directory("x", UNIX_EPOCH);
        let p = path("movies/x");

        assert_eq!(
            classify(&dir, p.clone(), &MediaExtensions::empty()),
            RoutingDecision::Descend(p.clone())
        );
        assert_eq!(
            classify(&dir, p.clone(), &mp4_mkv()),
            RoutingDecision::Descend(p)
        );
    }

    #[test]
    fn test_directory_named_like_media_descends() {
        let dir = Entry::directory("trailers.mp4", UNIX_EPOCH);
        let p = path("trailers.mp4");

        assert_eq!(classify(&dir, p.clone(), &mp4_mkv()), RoutingDecision::Descend(p));
    }

    #[test]
    fn test_media_and_documents() {
        let clip = Entry::file("clip.mp4", 10, UNIX_EPOCH);
        let notes = Entry::file("notes.txt", 10, UNIX_EPOCH);
        let p = path("a/b");

        assert_eq!(
            classify(&clip, p.clone(), &mp4_mkv()),
            RoutingDecision::PlayMedia(p.clone())
        );
        assert_eq!(
            classify(&notes, p.clone(), &mp4_mkv()),
            RoutingDecision::ViewDocument(p)
        );
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let clip = Entry::file("HOLIDAY.MKV", 10, UNIX_EPOCH);
        let p = path("HOLIDAY.MKV");

        let upper_set = MediaExtensions::new(["MP4", "MKV"], ExtensionMatch::CaseInsensitive);
        assert_eq!(
            classify(&clip, p.clone(), &upper_set),
            RoutingDecision::PlayMedia(p.clone())
        );
        assert_eq!(
            classify(&clip, p.clone(), &mp4_mkv()),
            RoutingDecision::PlayMedia(p)
        );
    }

    #[test]
    fn test_case_sensitive_matching() {
        let set = MediaExtensions::new(["mp4"], ExtensionMatch::CaseSensitive);
        let p = path("x");

        assert_eq!(
            classify(&Entry::file("a.mp4", 1, UNIX_EPOCH), p.clone(), &set),
            RoutingDecision::PlayMedia(p.clone())
        );
        assert_eq!(
            classify(&Entry::file("a.MP4", 1, UNIX_EPOCH), p.clone(), &set),
            RoutingDecision::ViewDocument(p)
        );
    }

    #[test]
    fn test_extension_extraction() {
        assert_eq!(extension_of("clip.mp4"), Some("mp4"));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".mp4"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of(".config.mov"), Some("mov"));
    }

    #[test]
    fn test_files_without_extension_are_documents() {
        let p = path("Makefile");
        assert_eq!(
            classify(&Entry::file("Makefile", 1, UNIX_EPOCH), p.clone(), &MediaExtensions::default()),
            RoutingDecision::ViewDocument(p)
        );
    }

    #[test]
    fn test_default_set_covers_common_media() {
        let media = MediaExtensions::default();
        assert!(media.contains("mov"));
        assert!(media.contains("MP4"));
        assert!(media.contains("mp3"));
        assert!(!media.contains("pdf"));
        assert_eq!(media.len(), DEFAULT_MEDIA_EXTENSIONS.len());
    }

    #[test]
    fn test_decision_accessors() {
        let p = path("a/b.mp4");
        assert!(RoutingDecision::PlayMedia(p.clone()).is_terminal());
        assert!(RoutingDecision::ViewDocument(p.clone()).is_terminal());
        assert!(!RoutingDecision::Descend(p.clone()).is_terminal());
        assert_eq!(RoutingDecision::Descend(p.clone()).path(), &p);
    }

    #[test]
    fn test_decision_display_names_every_route() {
        assert_eq!(
            RoutingDecision::Descend(path("movies/2024")).to_string(),
            "descend: movies/2024"
        );
        assert_eq!(
            RoutingDecision::PlayMedia(path("movies/clip.mp4")).to_string(),
            "play media: movies/clip.mp4"
        );
        assert_eq!(
            RoutingDecision::ViewDocument(path("notes.txt")).to_string(),
            "view document: notes.txt"
        );
    }
}
