use std::fmt::{Display, Formatter};
use std::str::FromStr;

use hub_common::ResourceStatus;
use serde::{Deserialize, Serialize};

use crate::domain::resource::error::LifecycleError;

/// Outcome of a moderator's review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationDecision {
    Approved,
    Rejected,
}

impl From<ModerationDecision> for ResourceStatus {
    fn from(value: ModerationDecision) -> Self {
        match value {
            ModerationDecision::Approved => ResourceStatus::Approved,
            ModerationDecision::Rejected => ResourceStatus::Rejected,
        }
    }
}

impl TryFrom<ResourceStatus> for ModerationDecision {
    type Error = LifecycleError;

    fn try_from(value: ResourceStatus) -> Result<Self, Self::Error> {
        match value {
            ResourceStatus::Approved => Ok(ModerationDecision::Approved),
            ResourceStatus::Rejected => Ok(ModerationDecision::Rejected),
            ResourceStatus::Pending => Err(LifecycleError::InvalidTransition(value)),
        }
    }
}

impl FromStr for ModerationDecision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = s.parse::<ResourceStatus>()?;
        ModerationDecision::try_from(status).map_err(anyhow::Error::from)
    }
}

impl Display for ModerationDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(ResourceStatus::from(*self).as_str())
    }
}

/// Whether a resource in `from` may be moved to `to`.
///
/// Moderators may approve, reject and reverse either decision, but no
/// resource ever goes back to pending.
pub fn can_transition(from: ResourceStatus, to: ResourceStatus) -> bool {
    match (from, to) {
        (_, ResourceStatus::Pending) => false,
        (ResourceStatus::Pending, _) => true,
        (ResourceStatus::Approved, _) | (ResourceStatus::Rejected, _) => true,
    }
}

/// Rejects a requested status that no current status can reach.
///
/// Every state other than pending is reachable from every state, so the
/// check does not need the stored status and runs before any store access.
pub fn ensure_reachable(to: ResourceStatus) -> Result<(), LifecycleError> {
    let reachable = ResourceStatus::ALL
        .into_iter()
        .any(|from| can_transition(from, to));
    if reachable {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition(to))
    }
}

/// Direction of a vote, mapped to the score delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn delta(&self) -> i32 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}
