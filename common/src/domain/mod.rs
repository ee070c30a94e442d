use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;

mod kinds;

pub use kinds::{ResourceStatus, ResourceType};

pub const RESOURCE_TITLE_MAX_CHARS: usize = 255;
pub const RESOURCE_URL_MAX_CHARS: usize = 2048;
pub const TAG_NAME_MAX_CHARS: usize = 64;
pub const CATEGORY_NAME_MAX_CHARS: usize = 100;

/// Title of a submitted resource, surrounding whitespace removed.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = RESOURCE_TITLE_MAX_CHARS),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct ResourceTitle(String);

// Absolute http(s) link without embedded whitespace.
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)https?://[^\s/$.?#][^\s]*$").expect("URL_REGEX must be a valid regex"));

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = RESOURCE_URL_MAX_CHARS, regex = URL_REGEX),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct ResourceUrl(String);

/// Canonical tag key.
///
/// Sanitizing trims and lowercases, so `" Baby "`, `"BABY"` and `"baby"`
/// all produce the same value. This is the uniqueness key of the `tags` table.
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = TAG_NAME_MAX_CHARS),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct TagName(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = CATEGORY_NAME_MAX_CHARS),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct CategoryName(String);
