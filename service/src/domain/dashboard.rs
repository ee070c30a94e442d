use hub_common::ResourceStatus;
use serde::Serialize;

use crate::domain::resource::Resource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: ResourceStatus, count: i64) {
        match status {
            ResourceStatus::Pending => self.pending += count,
            ResourceStatus::Approved => self.approved += count,
            ResourceStatus::Rejected => self.rejected += count,
        }
    }

    pub fn total(&self) -> i64 {
        self.pending + self.approved + self.rejected
    }
}

/// Moderator overview of the directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub resources_by_status: StatusCounts,
    pub total_resources: i64,
    pub total_categories: i64,
    pub total_tags: i64,
    /// Most recently submitted resources, newest first
    pub recent_resources: Vec<Resource>,
}
