//! Navigation core
//!
//! Path composition, listing normalization, entry classification and the
//! per-level state that ties them together. Nothing here knows how the tree
//! is served; that is behind [`crate::services::accessor::TreeAccessor`].

pub mod classify;
pub mod error;
pub mod format;
pub mod listing;
pub mod navigator;
pub mod path;
pub mod session;

pub use classify::{classify, ExtensionMatch, MediaExtensions, RoutingDecision};
pub use error::ListingError;
pub use format::{ByteCountStyle, DisplayConfig, DisplayRow};
pub use listing::{load_listing, normalize_listing};
pub use navigator::{ApplyResult, ListingState, LoadOutcome, LoadTicket, Navigator};
pub use path::{compose_child_path, NavigationPath};
pub use session::{BrowserSession, SelectOutcome, ViewerLaunch};
