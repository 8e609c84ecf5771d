// Tree accessor layer: the boundary to whatever serves the remote file tree
//
// The navigation core only depends on the `TreeAccessor` trait. Concrete
// accessors (local directory, protocol clients) and decorators (request
// deduplication, artificial latency) live here.

pub mod backend;
pub mod local;
pub mod manager;
pub mod slow;

pub use backend::{AccessorError, Entry, TreeAccessor};
pub use local::LocalTreeAccessor;
pub use manager::AccessorManager;
pub use slow::{AccessorMetrics, SlowAccessor, SlowAccessorConfig};
