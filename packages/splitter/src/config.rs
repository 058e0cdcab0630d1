//! Configuration constants for the splitter.

/// Split level used when the caller does not ask for one.
pub const DEFAULT_SPLIT_LEVEL: i64 = 1;

/// Width of the zero-padded ordinal prefix in chapter names.
pub const ORDINAL_WIDTH: usize = 3;

/// Joins the titles of a title path into a file name.
pub const TITLE_SEPARATOR: &str = "_";

/// Joins the titles of a title path into the chapter header line.
pub const HEADER_SEPARATOR: &str = " > ";

/// Separates aggregated content pieces inside a chapter body.
pub const BODY_SEPARATOR: &str = "\n\n";

/// Name used when a title path sanitizes to nothing.
pub const NAME_PLACEHOLDER: &str = "chapter";

/// Extension of chapter files, without the dot.
pub const CHAPTER_EXTENSION: &str = "txt";

/// Maximum length in bytes of the sanitized title part of a chapter name.
///
/// Leaves room for the ordinal prefix, a dedup suffix and the extension
/// within the 255-byte limit of common filesystems.
pub const MAX_TITLE_BYTES: usize = 200;

/// Maximum nesting depth accepted when loading an outline.
pub const MAX_OUTLINE_DEPTH: usize = 64;

/// Clamp a requested split level to a usable target depth.
///
/// Levels below 1 are treated as 1.
///
/// # Examples
/// ```
/// use outline_splitter::config::normalize_level;
///
/// assert_eq!(normalize_level(3), 3);
/// assert_eq!(normalize_level(0), 1);
/// assert_eq!(normalize_level(-2), 1);
/// ```
#[must_use]
pub fn normalize_level(level: i64) -> usize {
    usize::try_from(level).unwrap_or(0).max(1)
}
