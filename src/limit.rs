use std::sync::atomic::{AtomicUsize, Ordering};

/// The field size limit in effect when nothing else has been set, in bytes.
pub const DEFAULT_FIELD_SIZE_LIMIT: usize = 128 * 1024;

static FIELD_SIZE_LIMIT: AtomicUsize =
    AtomicUsize::new(DEFAULT_FIELD_SIZE_LIMIT);

/// Returns the process-wide maximum size of a parsed field, in bytes.
///
/// Readers pick this value up at the start of every line unless they were
/// built with their own limit via `ReaderBuilder::field_size_limit`.
pub fn field_size_limit() -> usize {
    FIELD_SIZE_LIMIT.load(Ordering::Relaxed)
}

/// Sets the process-wide maximum size of a parsed field and returns the
/// previous limit.
///
/// A field that grows beyond the limit fails to parse with
/// `ParseErrorKind::FieldTooLarge`.
///
/// # Example
///
/// ```
/// use csv_dialect::{field_size_limit, set_field_size_limit};
///
/// let old = set_field_size_limit(1 << 20);
/// assert_eq!(1 << 20, field_size_limit());
/// set_field_size_limit(old);
/// ```
pub fn set_field_size_limit(limit: usize) -> usize {
    let old = FIELD_SIZE_LIMIT.swap(limit, Ordering::Relaxed);
    log::debug!("field size limit changed from {} to {}", old, limit);
    old
}
