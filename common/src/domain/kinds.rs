use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Kind of a submitted resource. Stored as text guarded by a CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Link,
    Pdf,
    Article,
    Podcast,
    Tip,
    Book,
    Video,
    Movie,
    TvSeries,
}

impl ResourceType {
    pub const ALL: [ResourceType; 9] = [
        ResourceType::Link,
        ResourceType::Pdf,
        ResourceType::Article,
        ResourceType::Podcast,
        ResourceType::Tip,
        ResourceType::Book,
        ResourceType::Video,
        ResourceType::Movie,
        ResourceType::TvSeries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Link => "link",
            ResourceType::Pdf => "pdf",
            ResourceType::Article => "article",
            ResourceType::Podcast => "podcast",
            ResourceType::Tip => "tip",
            ResourceType::Book => "book",
            ResourceType::Video => "video",
            ResourceType::Movie => "movie",
            ResourceType::TvSeries => "tv_series",
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| anyhow!("Invalid resource type: {}", s))
    }
}

/// Moderation status of a resource.
///
/// Every submission starts as `Pending`. Moderators move it to `Approved` or
/// `Rejected` and may reverse that decision, but nothing returns to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Pending,
    Approved,
    Rejected,
}

impl ResourceStatus {
    pub const ALL: [ResourceStatus; 3] = [
        ResourceStatus::Pending,
        ResourceStatus::Approved,
        ResourceStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Pending => "pending",
            ResourceStatus::Approved => "approved",
            ResourceStatus::Rejected => "rejected",
        }
    }
}

impl Display for ResourceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| anyhow!("Invalid resource status: {}", s))
    }
}
