//! Run and task identifiers.

use rand::distr::{Alphanumeric, SampleString};

/// Default length of generated run ids.
pub const ID_LENGTH: usize = 24;

/// Generate a random alphanumeric identifier of `len` characters.
///
/// 62 symbols per character gives ~143 bits at the default length, enough
/// that independently started processes never collide in practice.
pub fn generate_unique_id(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), len)
}

/// Compose a sub-run id from parts, separated by `/`.
///
/// `:` and `#` are reserved by the queue wire format, so both are remapped
/// to `_` inside parts.
pub fn join_run_id<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|part| part.as_ref().replace([':', '#'], "_"))
        .collect::<Vec<_>>()
        .join("/")
}
