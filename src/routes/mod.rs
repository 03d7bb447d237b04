/// Router Module Index
///
/// Splits the HTTP surface into the JSON API and the guarded page fallback.

/// Health, page map and navigation decisions. Open to anonymous viewers.
pub mod public;

/// Console pages, each passed through the access guard.
pub mod pages;
