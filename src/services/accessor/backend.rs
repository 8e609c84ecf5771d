use async_trait::async_trait;
use std::fmt;
use std::io;
use std::time::SystemTime;

/// One child of a remote directory, as reported by a [`TreeAccessor`]
///
/// Entries are snapshots: once returned from `list_directory` they are never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_directory: bool,
    pub is_hidden: bool,
    /// Byte count, meaningful only for files
    pub size: u64,
    pub last_modified: SystemTime,
}

impl Entry {
    pub fn file(name: impl Into<String>, size: u64, last_modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
            is_hidden: false,
            size,
            last_modified,
        }
    }

    pub fn directory(name: impl Into<String>, last_modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
            is_hidden: false,
            size: 0,
            last_modified,
        }
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.is_hidden = hidden;
        self
    }

    pub fn is_file(&self) -> bool {
        !self.is_directory
    }

    /// The self/parent pseudo-entries some servers include in listings
    pub fn is_dot_entry(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// Failure reported by a tree accessor
///
/// Opaque to the navigation core: a short message plus an optional reason,
/// passed through to whoever presents it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorError {
    pub message: String,
    pub reason: Option<String>,
}

impl AccessorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for AccessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {}", self.message, reason),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AccessorError {}

impl From<io::Error> for AccessorError {
    fn from(err: io::Error) -> Self {
        Self {
            message: err.to_string(),
            reason: Some(format!("{:?}", err.kind())),
        }
    }
}

/// Async access to a remote file tree
///
/// Paths are relative to the tree root, segments joined with `/`; the empty
/// string is the root itself. Implementations may be a network protocol
/// client, a local directory, or a test double. Listing is non-mutating, so
/// one accessor is shared by every level of a browsing session.
#[async_trait]
pub trait TreeAccessor: Send + Sync {
    /// List the children of a directory (non-recursive)
    ///
    /// # Errors
    ///
    /// Returns an error for any accessor-level failure: connectivity,
    /// permission, not-found, protocol error.
    async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, AccessorError>;

    /// Read up to `len` bytes of a file starting at `offset`
    ///
    /// Used by viewers to stream file contents; the navigation core never
    /// calls it. Returns fewer bytes than requested at end of file.
    async fn read_range(
        &self,
        path: &str,
        offset: u64,
        len: usize,
    ) -> Result<Vec<u8>, AccessorError>;
}
