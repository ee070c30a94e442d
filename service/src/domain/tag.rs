use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use hub_common::{TagName, TagNameError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub i64);

impl From<i64> for TagId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for TagId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tag with the number of resources currently carrying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub resource_count: i64,
}

/// Canonical key of a single tag: trimmed and lowercased, never blank.
pub fn normalize_tag(raw: &str) -> Result<TagName, TagNameError> {
    TagName::try_new(raw)
}

/// Turns raw tag input into the set of canonical names to attach.
///
/// Blank entries are dropped, the rest are trimmed and lowercased, and
/// duplicates after normalization collapse into one. Order of first
/// appearance is kept.
pub fn normalize_tags<I, S>(raw: I) -> Result<Vec<TagName>, TagNameError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter(|name| !name.as_ref().trim().is_empty())
        .map(|name| normalize_tag(name.as_ref()))
        .process_results(|names| names.unique().collect())
}
