//! One level of the browser: a path, its listing, and where selections lead
//!
//! Loads are split into three steps so they can run on any task while the
//! listing itself is only ever mutated by its owner:
//!
//! 1. [`Navigator::begin_load`] hands out a [`LoadTicket`] tagged with the
//!    current path and a fresh generation
//! 2. [`LoadTicket::fetch`] talks to the accessor (anywhere, any task)
//! 3. [`Navigator::apply`] installs the [`LoadOutcome`] if its tag still
//!    matches, and discards it otherwise
//!
//! Navigating away or starting another load bumps the generation, so a
//! result that arrives late never overwrites a newer listing.

use super::classify::{classify, MediaExtensions, RoutingDecision};
use super::error::ListingError;
use super::format::{display_rows, DisplayConfig, DisplayRow};
use super::listing::load_listing;
use super::path::NavigationPath;
use crate::services::accessor::{Entry, TreeAccessor};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Display state of a level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingState {
    entries: Vec<Entry>,
    loaded: bool,
    pending: bool,
    last_error: Option<ListingError>,
}

impl ListingState {
    /// Entries currently displayed, filtered and sorted
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Whether any load of this path ever succeeded
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a load has been started and not yet applied
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Failure of the most recent applied load, if it failed
    ///
    /// Kept for presentation only; a failure never clears `entries`.
    pub fn last_error(&self) -> Option<&ListingError> {
        self.last_error.as_ref()
    }
}

/// Result of a fetch, still tagged with what it was fetched for
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub path: NavigationPath,
    pub generation: u64,
    pub result: Result<Vec<Entry>, ListingError>,
}

/// Permission to fetch one listing on behalf of a [`Navigator`]
#[derive(Clone)]
pub struct LoadTicket {
    path: NavigationPath,
    generation: u64,
    accessor: Arc<dyn TreeAccessor>,
}

impl fmt::Debug for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadTicket")
            .field("path", &self.path)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fetch and normalize the listing
    pub async fn fetch(self) -> LoadOutcome {
        let result = load_listing(self.accessor.as_ref(), &self.path).await;
        LoadOutcome {
            path: self.path,
            generation: self.generation,
            result,
        }
    }
}

/// What [`Navigator::apply`] did with an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// The listing replaced the displayed entries
    Applied,
    /// The load failed; the displayed entries are unchanged
    Failed(ListingError),
    /// The outcome belongs to a path or load that is no longer current
    Stale,
}

pub struct Navigator {
    accessor: Arc<dyn TreeAccessor>,
    path: NavigationPath,
    state: ListingState,
    generation: u64,
    /// Generation source, shared between the levels of a session so that a
    /// level re-created at the same depth never reuses a generation
    sequence: Arc<AtomicU64>,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("path", &self.path)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Navigator {
    pub fn new(accessor: Arc<dyn TreeAccessor>, path: NavigationPath) -> Self {
        Self::with_sequence(accessor, path, Arc::new(AtomicU64::new(0)))
    }

    pub fn with_sequence(
        accessor: Arc<dyn TreeAccessor>,
        path: NavigationPath,
        sequence: Arc<AtomicU64>,
    ) -> Self {
        let generation = sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Self {
            accessor,
            path,
            state: ListingState::default(),
            generation,
            sequence,
        }
    }

    pub fn path(&self) -> &NavigationPath {
        &self.path
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn entries(&self) -> &[Entry] {
        self.state.entries()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Title of the level: its last path segment, none at the root
    pub fn title(&self) -> Option<&str> {
        self.path.last_segment()
    }

    fn bump_generation(&mut self) {
        self.generation = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
    }

    /// Point this level at another path
    ///
    /// The old listing is dropped and any in-flight load becomes stale.
    pub fn navigate_to(&mut self, path: NavigationPath) {
        tracing::debug!("Navigator moving from {:?} to {:?}", self.path.as_str(), path.as_str());
        self.path = path;
        self.state = ListingState::default();
        self.bump_generation();
    }

    /// Start a load of the current path
    ///
    /// Supersedes any load started earlier: only the newest ticket's
    /// outcome will be applied.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.bump_generation();
        self.state.pending = true;
        LoadTicket {
            path: self.path.clone(),
            generation: self.generation,
            accessor: Arc::clone(&self.accessor),
        }
    }

    /// Apply a fetched outcome, all at once or not at all
    pub fn apply(&mut self, outcome: LoadOutcome) -> ApplyResult {
        if outcome.generation != self.generation || outcome.path != self.path {
            tracing::debug!(
                "Discarding stale listing of {:?} (generation {}, current {:?} generation {})",
                outcome.path.as_str(),
                outcome.generation,
                self.path.as_str(),
                self.generation
            );
            return ApplyResult::Stale;
        }

        self.state.pending = false;
        match outcome.result {
            Ok(entries) => {
                tracing::debug!(
                    "Applied listing of {:?}: {} entries",
                    self.path.as_str(),
                    entries.len()
                );
                self.state.entries = entries;
                self.state.loaded = true;
                self.state.last_error = None;
                ApplyResult::Applied
            }
            Err(err) => {
                tracing::warn!("Failed to list {:?}: {}", self.path.as_str(), err);
                self.state.last_error = Some(err.clone());
                ApplyResult::Failed(err)
            }
        }
    }

    /// Load the current path and apply the result
    ///
    /// A retry after a failure is just another call.
    pub async fn reload(&mut self) -> Result<&[Entry], ListingError> {
        let outcome = self.begin_load().fetch().await;
        match self.apply(outcome) {
            ApplyResult::Failed(err) => Err(err),
            ApplyResult::Applied | ApplyResult::Stale => Ok(self.state.entries()),
        }
    }

    /// Index of the displayed entry called `name`
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.state.entries.iter().position(|e| e.name == name)
    }

    /// Child path and routing decision for the displayed entry at `index`
    pub fn route(&self, index: usize, media: &MediaExtensions) -> Option<RoutingDecision> {
        let entry = self.state.entries.get(index)?;
        let decision = classify(entry, self.path.child(&entry.name), media);
        tracing::debug!("Routing {:?} to {:?}", entry.name, decision);
        Some(decision)
    }

    pub fn display_rows(&self, config: &DisplayConfig) -> Vec<DisplayRow> {
        display_rows(&self.state.entries, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::accessor::AccessorError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::UNIX_EPOCH;

    /// Serves listings from a map; paths can be switched to failing
    #[derive(Default)]
    struct ScriptedAccessor {
        listings: Mutex<HashMap<String, Result<Vec<Entry>, AccessorError>>>,
    }

    impl ScriptedAccessor {
        fn set(&self, path: &str, result: Result<Vec<Entry>, AccessorError>) {
            self.listings
                .lock()
                .unwrap()
                .insert(path.to_string(), result);
        }
    }

    #[async_trait]
    impl TreeAccessor for ScriptedAccessor {
        async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, AccessorError> {
            self.listings
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .unwrap_or_else(|| Err(AccessorError::new("No such directory")))
        }

        async fn read_range(
            &self,
            _path: &str,
            _offset: u64,
            _len: usize,
        ) -> Result<Vec<u8>, AccessorError> {
            Ok(Vec::new())
        }
    }

    fn three_videos() -> Vec<Entry> {
        vec![
            Entry::file("b.mp4", 10, UNIX_EPOCH),
            Entry::file("a.mp4", 10, UNIX_EPOCH),
            Entry::directory("extras", UNIX_EPOCH),
        ]
    }

    fn setup() -> (Arc<ScriptedAccessor>, Navigator) {
        let accessor = Arc::new(ScriptedAccessor::default());
        let nav = Navigator::new(accessor.clone(), NavigationPath::root().child("videos"));
        (accessor, nav)
    }

    #[tokio::test]
    async fn test_reload_populates_sorted_entries() {
        let (accessor, mut nav) = setup();
        accessor.set("videos", Ok(three_videos()));

        let names: Vec<String> = nav
            .reload()
            .await
            .unwrap()
            .iter()
            .map(|e| e.name.clone())
            .collect();

        assert_eq!(names, vec!["a.mp4", "b.mp4", "extras"]);
        assert!(nav.state().has_loaded());
        assert!(!nav.state().is_pending());
        assert_eq!(nav.title(), Some("videos"));
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_entries() {
        let (accessor, mut nav) = setup();
        accessor.set("videos", Ok(three_videos()));
        nav.reload().await.unwrap();

        accessor.set(
            "videos",
            Err(AccessorError::new("Connection lost").with_reason("STATUS_CONNECTION_RESET")),
        );
        let err = nav.reload().await.unwrap_err();

        assert_eq!(err.summary, "Connection lost");
        assert_eq!(nav.entries().len(), 3);
        assert_eq!(nav.state().last_error(), Some(&err));
        assert!(nav.state().has_loaded());
    }

    #[tokio::test]
    async fn test_failed_first_load_stays_empty() {
        let (_accessor, mut nav) = setup();

        assert!(nav.reload().await.is_err());
        assert!(nav.entries().is_empty());
        assert!(!nav.state().has_loaded());
        assert!(nav.state().last_error().is_some());
    }

    #[tokio::test]
    async fn test_success_clears_last_error() {
        let (accessor, mut nav) = setup();
        assert!(nav.reload().await.is_err());

        accessor.set("videos", Ok(three_videos()));
        nav.reload().await.unwrap();
        assert!(nav.state().last_error().is_none());
    }

    #[tokio::test]
    async fn test_superseded_load_is_stale() {
        let (accessor, mut nav) = setup();
        accessor.set("videos", Ok(three_videos()));

        let first = nav.begin_load();
        let second = nav.begin_load();
        assert!(second.generation() > first.generation());
        assert_eq!(nav.generation(), second.generation());

        let late = first.fetch().await;
        assert_eq!(nav.apply(late), ApplyResult::Stale);
        assert!(nav.entries().is_empty());
        assert!(nav.state().is_pending());

        let current = second.fetch().await;
        assert_eq!(nav.apply(current), ApplyResult::Applied);
        assert_eq!(nav.entries().len(), 3);
    }

    #[tokio::test]
    async fn test_navigating_away_discards_in_flight_load() {
        let (accessor, mut nav) = setup();
        accessor.set("videos", Ok(three_videos()));
        accessor.set("videos/extras", Ok(vec![Entry::file("x.txt", 1, UNIX_EPOCH)]));

        let old = nav.begin_load();
        nav.navigate_to(NavigationPath::from_segments(["videos", "extras"]));
        let new = nav.begin_load();

        let new_outcome = new.fetch().await;
        assert_eq!(nav.apply(new_outcome), ApplyResult::Applied);

        let old_outcome = old.fetch().await;
        assert_eq!(nav.apply(old_outcome), ApplyResult::Stale);
        assert_eq!(nav.entries().len(), 1);
        assert_eq!(nav.entries()[0].name, "x.txt");
    }

    #[tokio::test]
    async fn test_route_selected_entries() {
        let (accessor, mut nav) = setup();
        accessor.set(
            "videos",
            Ok(vec![
                Entry::directory("extras", UNIX_EPOCH),
                Entry::file("clip.mp4", 1, UNIX_EPOCH),
                Entry::file("notes.txt", 1, UNIX_EPOCH),
            ]),
        );
        nav.reload().await.unwrap();
        let media = MediaExtensions::new(["mp4", "mkv"], Default::default());

        let idx = nav.position_of("clip.mp4").unwrap();
        assert_eq!(
            nav.route(idx, &media),
            Some(RoutingDecision::PlayMedia(NavigationPath::from_segments([
                "videos", "clip.mp4"
            ])))
        );

        let idx = nav.position_of("extras").unwrap();
        assert_eq!(
            nav.route(idx, &media),
            Some(RoutingDecision::Descend(NavigationPath::from_segments([
                "videos", "extras"
            ])))
        );

        let idx = nav.position_of("notes.txt").unwrap();
        assert!(matches!(
            nav.route(idx, &media),
            Some(RoutingDecision::ViewDocument(_))
        ));

        assert_eq!(nav.route(99, &media), None);
    }

    #[tokio::test]
    async fn test_display_rows_follow_entries() {
        let (accessor, mut nav) = setup();
        accessor.set("videos", Ok(three_videos()));
        nav.reload().await.unwrap();

        let rows = nav.display_rows(&DisplayConfig::default());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].name, "extras");
        assert!(rows[2].size.is_none());
        assert_eq!(rows[0].size.as_deref(), Some("10 bytes"));
    }
}
