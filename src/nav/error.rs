use super::path::NavigationPath;
use crate::services::accessor::AccessorError;
use std::fmt;

/// A directory listing could not be loaded
///
/// Carries the accessor's report unchanged: `summary` is its message and
/// `detail` its reason, if it gave one. The navigator neither interprets
/// nor retries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingError {
    pub path: NavigationPath,
    pub summary: String,
    pub detail: Option<String>,
}

impl ListingError {
    pub fn from_accessor(path: NavigationPath, err: AccessorError) -> Self {
        Self {
            path,
            summary: err.message,
            detail: err.reason,
        }
    }
}

impl fmt::Display for ListingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.summary, detail),
            None => write!(f, "{}", self.summary),
        }
    }
}

impl std::error::Error for ListingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_report_is_kept_verbatim() {
        let err = ListingError::from_accessor(
            NavigationPath::root().child("videos"),
            AccessorError::new("The operation couldn't be completed")
                .with_reason("STATUS_LOGON_FAILURE"),
        );

        assert_eq!(err.path.as_str(), "videos");
        assert_eq!(err.summary, "The operation couldn't be completed");
        assert_eq!(err.detail.as_deref(), Some("STATUS_LOGON_FAILURE"));
        assert_eq!(
            err.to_string(),
            "The operation couldn't be completed: STATUS_LOGON_FAILURE"
        );
    }

    #[test]
    fn test_display_without_detail() {
        let err = ListingError::from_accessor(NavigationPath::root(), AccessorError::new("Timed out"));
        assert_eq!(err.to_string(), "Timed out");
    }
}
