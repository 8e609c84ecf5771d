//! In-memory tree accessor and entry builders for integration tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tree_browser::services::accessor::{AccessorError, Entry, TreeAccessor};

/// Fixed timestamp so formatted rows are stable: 2024-03-07 23:30:00 UTC
pub fn timestamp() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_709_854_200)
}

pub fn file(name: &str, size: u64) -> Entry {
    Entry::file(name, size, timestamp())
}

pub fn dir(name: &str) -> Entry {
    Entry::directory(name, timestamp())
}

pub fn names(entries: &[Entry]) -> Vec<String> {
    entries.iter().map(|e| e.name.clone()).collect()
}

/// Tree accessor serving scripted listings and file contents
///
/// Unknown paths fail with "No such directory". Every listing request is
/// recorded so tests can assert how often the backend was hit.
#[derive(Default)]
pub struct MockAccessor {
    listings: Mutex<HashMap<String, Result<Vec<Entry>, AccessorError>>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    list_calls: Mutex<Vec<String>>,
}

impl MockAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listing(&self, path: &str, entries: Vec<Entry>) {
        self.listings
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(entries));
    }

    pub fn set_error(&self, path: &str, error: AccessorError) {
        self.listings
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(error));
    }

    pub fn set_file(&self, path: &str, contents: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_vec());
    }

    /// Paths listed so far, in request order
    pub fn list_calls(&self) -> Vec<String> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn list_count(&self, path: &str) -> usize {
        self.list_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }
}

#[async_trait]
impl TreeAccessor for MockAccessor {
    async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, AccessorError> {
        self.list_calls.lock().unwrap().push(path.to_string());
        self.listings
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(AccessorError::new("No such directory")))
    }

    async fn read_range(
        &self,
        path: &str,
        offset: u64,
        len: usize,
    ) -> Result<Vec<u8>, AccessorError> {
        let files = self.files.lock().unwrap();
        let contents = files
            .get(path)
            .ok_or_else(|| AccessorError::new("No such file"))?;
        let start = (offset as usize).min(contents.len());
        let end = start.saturating_add(len).min(contents.len());
        Ok(contents[start..end].to_vec())
    }
}

/// A small media share:
///
/// ```text
/// /            movies/ music/ notes.txt .DS_Store
/// movies/      Episode 1.mkv Episode 10.mkv Episode 2.mkv extras/
/// movies/extras  trailer.MP4
/// music/       song.mp3
/// ```
pub fn media_share() -> MockAccessor {
    let accessor = MockAccessor::new();
    accessor.set_listing(
        "",
        vec![
            dir("."),
            dir(".."),
            file("notes.txt", 1_500),
            dir("music"),
            file(".DS_Store", 6_148).with_hidden(true),
            dir("movies"),
        ],
    );
    accessor.set_listing(
        "movies",
        vec![
            file("Episode 10.mkv", 700_000_000),
            file("Episode 2.mkv", 650_000_000),
            dir("extras"),
            file("Episode 1.mkv", 2_250_000_000),
        ],
    );
    accessor.set_listing("movies/extras", vec![file("trailer.MP4", 12_000_000)]);
    accessor.set_listing("music", vec![file("song.mp3", 4_000_000)]);
    accessor.set_file("notes.txt", b"remember the popcorn");
    accessor
}
