//! Constants for the download module (on-disk naming).

/// Suffix of the temporary file a transfer streams into before finalize.
pub const PART_SUFFIX: &str = ".part";

/// Prefix of the time-derived name used when a URL has no usable path segment.
pub const FALLBACK_NAME_PREFIX: &str = "file_";
