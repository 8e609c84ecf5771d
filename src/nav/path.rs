use std::fmt;

/// Separator between segments of a [`NavigationPath`]
pub const SEPARATOR: char = '/';

/// Location of a directory or file relative to the tree root
///
/// Stored in its joined form so it can be handed to an accessor as-is. The
/// root is the empty path, with no leading separator. Segments are never
/// collapsed, reordered or normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavigationPath(String);

impl NavigationPath {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Build a path from segments, joining them with the separator
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        segments
            .into_iter()
            .fold(Self::root(), |path, segment| path.child(segment.as_ref()))
    }

    /// Compose the path of a child entry
    pub fn child(&self, entry_name: &str) -> Self {
        compose_child_path(self, entry_name)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segments in order from the root; empty for the root
    pub fn segments(&self) -> Vec<&str> {
        if self.is_root() {
            Vec::new()
        } else {
            self.0.split(SEPARATOR).collect()
        }
    }

    /// Last segment, used as the title of a navigation level
    pub fn last_segment(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit(SEPARATOR).next()
        }
    }

    /// Path of the enclosing directory; `None` for the root
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(SEPARATOR) {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    pub fn depth(&self) -> usize {
        self.segments().len()
    }
}

impl fmt::Display for NavigationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NavigationPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Path of `entry_name` inside `parent`
///
/// The root's children are just their names; everything below is
/// `parent/name`. Entry names are trusted not to contain the separator.
pub fn compose_child_path(parent: &NavigationPath, entry_name: &str) -> NavigationPath {
    if parent.is_root() {
        NavigationPath(entry_name.to_string())
    } else {
        NavigationPath(format!("{}{}{}", parent.0, SEPARATOR, entry_name))
    }
}
