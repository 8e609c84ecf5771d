//! Listing retrieval and normalization
//!
//! Turns the raw listing an accessor returns into the display order: the
//! self/parent pseudo-entries and hidden entries are dropped, the rest is
//! sorted the way a file manager sorts names.

use super::error::ListingError;
use super::path::NavigationPath;
use crate::services::accessor::{Entry, TreeAccessor};
use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Fetch and normalize the listing of `path`
///
/// All-or-nothing: either the complete normalized listing or the accessor's
/// error, never a partial result.
///
/// # Errors
///
/// Returns the accessor's failure, unchanged, as a [`ListingError`].
pub async fn load_listing(
    accessor: &dyn TreeAccessor,
    path: &NavigationPath,
) -> Result<Vec<Entry>, ListingError> {
    tracing::debug!("Listing {:?}", path.as_str());

    let entries = accessor
        .list_directory(path.as_str())
        .await
        .map_err(|e| ListingError::from_accessor(path.clone(), e))?;

    let raw_count = entries.len();
    let normalized = normalize_listing(entries);
    tracing::debug!(
        "Listed {:?}: {} entries, {} displayed",
        path.as_str(),
        raw_count,
        normalized.len()
    );

    Ok(normalized)
}

/// Whether an entry belongs in the display set
pub fn is_displayable(entry: &Entry) -> bool {
    !entry.is_dot_entry() && !entry.is_hidden
}

/// Filter out non-displayable entries and sort the rest by name
pub fn normalize_listing(entries: Vec<Entry>) -> Vec<Entry> {
    let mut displayed: Vec<Entry> = entries.into_iter().filter(is_displayable).collect();
    displayed.sort_by(|a, b| compare_names(&a.name, &b.name));
    displayed
}

/// Display ordering of entry names
///
/// Case-insensitive, with runs of digits compared by numeric value so that
/// "Episode 9" sorts before "Episode 10". Names that compare equal that way
/// fall back to their raw bytes, which makes the order total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    natural_cmp(a, b).then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();

    loop {
        let (ca, cb) = match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => (ca, cb),
        };

        let ord = if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let run_a = take_digit_run(&mut a_chars);
            let run_b = take_digit_run(&mut b_chars);
            compare_digit_runs(&run_a, &run_b)
        } else {
            a_chars.next();
            b_chars.next();
            ca.to_lowercase().cmp(cb.to_lowercase())
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }
}

fn take_digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

/// Compare two digit strings by value, without overflowing on long runs
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
