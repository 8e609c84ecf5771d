//! The navigation stack of a browsing session
//!
//! The root level is created with the session; selecting a directory pushes
//! a new level and going back pops it. All levels share one accessor, fronted
//! by an [`AccessorManager`] so that concurrent loads of the same path hit
//! the backend once.

use super::classify::{MediaExtensions, RoutingDecision};
use super::error::ListingError;
use super::format::DisplayRow;
use super::navigator::{ApplyResult, LoadOutcome, LoadTicket, Navigator};
use super::path::NavigationPath;
use crate::config::BrowserConfig;
use crate::services::accessor::{AccessorManager, Entry, TreeAccessor};
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// Request to open a terminal viewer for a file
#[derive(Clone)]
pub struct ViewerLaunch {
    pub decision: RoutingDecision,
    /// The session's accessor, for the viewer's byte-range reads
    pub accessor: Arc<dyn TreeAccessor>,
}

impl fmt::Debug for ViewerLaunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerLaunch")
            .field("decision", &self.decision)
            .finish_non_exhaustive()
    }
}

impl ViewerLaunch {
    pub fn path(&self) -> &NavigationPath {
        self.decision.path()
    }
}

/// What selecting an entry did
#[derive(Debug, Clone)]
pub enum SelectOutcome {
    /// A new level was pushed for this directory; it has not been loaded yet
    Descended(NavigationPath),
    /// The entry leaves the browser
    Launch(ViewerLaunch),
}

/// A [`LoadTicket`] tagged with the level it was issued for
#[derive(Debug, Clone)]
pub struct SessionLoad {
    pub level: usize,
    pub ticket: LoadTicket,
}

impl SessionLoad {
    pub async fn fetch(self) -> SessionOutcome {
        SessionOutcome {
            level: self.level,
            outcome: self.ticket.fetch().await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub level: usize,
    pub outcome: LoadOutcome,
}

pub struct BrowserSession {
    accessor: Arc<dyn TreeAccessor>,
    config: BrowserConfig,
    media: MediaExtensions,
    /// Root first; never empty
    levels: Vec<Navigator>,
    sequence: Arc<AtomicU64>,
}

impl fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSession")
            .field("config", &self.config)
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

impl BrowserSession {
    /// Start a session at the tree root
    pub fn new(accessor: Arc<dyn TreeAccessor>, config: BrowserConfig) -> Self {
        let accessor: Arc<dyn TreeAccessor> = Arc::new(AccessorManager::new(accessor));
        let media = config.media.extension_set();
        let sequence = Arc::new(AtomicU64::new(0));
        let root = Navigator::with_sequence(
            Arc::clone(&accessor),
            NavigationPath::root(),
            Arc::clone(&sequence),
        );

        Self {
            accessor,
            config,
            media,
            levels: vec![root],
            sequence,
        }
    }

    /// Index of the top level; 0 at the root
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn current(&self) -> &Navigator {
        &self.levels[self.depth()]
    }

    pub fn current_mut(&mut self) -> &mut Navigator {
        let depth = self.depth();
        &mut self.levels[depth]
    }

    pub fn title(&self) -> Option<&str> {
        self.current().title()
    }

    /// Start loading the top level
    pub fn begin_load(&mut self) -> SessionLoad {
        let level = self.depth();
        SessionLoad {
            level,
            ticket: self.current_mut().begin_load(),
        }
    }

    /// Route a finished load to the level it was issued for
    ///
    /// Outcomes for levels that have since been popped are stale, including
    /// when another level now sits at the same depth.
    pub fn apply(&mut self, outcome: SessionOutcome) -> ApplyResult {
        match self.levels.get_mut(outcome.level) {
            Some(nav) => nav.apply(outcome.outcome),
            None => {
                tracing::debug!(
                    "Discarding listing of {:?} for popped level {}",
                    outcome.outcome.path.as_str(),
                    outcome.level
                );
                ApplyResult::Stale
            }
        }
    }

    /// Load the top level and apply the result
    pub async fn reload(&mut self) -> Result<&[Entry], ListingError> {
        self.current_mut().reload().await
    }

    /// Activate the displayed entry at `index` of the top level
    ///
    /// Returns `None` if there is no such entry.
    pub fn select(&mut self, index: usize) -> Option<SelectOutcome> {
        let decision = self.current().route(index, &self.media)?;

        match decision {
            RoutingDecision::Descend(path) => {
                tracing::debug!("Descending into {:?}", path.as_str());
                let nav = Navigator::with_sequence(
                    Arc::clone(&self.accessor),
                    path.clone(),
                    Arc::clone(&self.sequence),
                );
                self.levels.push(nav);
                Some(SelectOutcome::Descended(path))
            }
            decision => Some(SelectOutcome::Launch(ViewerLaunch {
                decision,
                accessor: Arc::clone(&self.accessor),
            })),
        }
    }

    /// Activate the displayed entry called `name`
    pub fn select_named(&mut self, name: &str) -> Option<SelectOutcome> {
        let index = self.current().position_of(name)?;
        self.select(index)
    }

    /// Leave the top level
    ///
    /// Returns the abandoned path; the root cannot be popped.
    pub fn pop(&mut self) -> Option<NavigationPath> {
        if self.levels.len() <= 1 {
            return None;
        }
        let nav = self.levels.pop()?;
        tracing::debug!("Leaving {:?}", nav.path().as_str());
        Some(nav.path().clone())
    }

    /// Rows for the top level, formatted with the session's display settings
    pub fn display_rows(&self) -> Vec<DisplayRow> {
        self.current().display_rows(&self.config.display)
    }
}
