use hub_common::TagName;
use tracing::info;

use crate::domain::{
    repository::{RepositoryError, Store, StoreTransaction},
    resource::{
        NewResource, Resource, ResourceChanges, ResourceId,
        error::LifecycleError,
        lifecycle::{ModerationDecision, VoteDirection, ensure_reachable},
    },
};

/// Orchestrates every write to a resource.
///
/// Each operation runs in exactly one store transaction. Any early return,
/// error or not-found alike, drops the transaction uncommitted, so a resource
/// is never left with a partial field update or a partial tag set.
#[derive(Debug, Clone)]
pub struct ResourceLifecycle<S: Store> {
    store: S,
}

impl<S: Store> ResourceLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn get(&self, id: ResourceId) -> Result<Option<Resource>, LifecycleError> {
        Ok(self.store.find_resource(id).await?)
    }

    /// Stores a new pending resource together with its tags.
    pub async fn submit(
        &self,
        resource: NewResource,
        tags: &[TagName],
    ) -> Result<Resource, LifecycleError> {
        let mut tx = self.store.begin().await?;

        let id = tx.create_resource(&resource).await?;
        if !tags.is_empty() {
            tx.replace_tags(id, tags).await?;
        }
        let created = tx
            .find_resource(id)
            .await?
            .ok_or_else(|| missing_after_write(id))?;

        tx.commit().await?;

        info!(resource_id = %id, tags = tags.len(), "resource submitted");
        Ok(created)
    }

    /// Applies a partial update and, when `tags` is given, replaces the tag set.
    ///
    /// Leaving `tags` as `None` keeps the current tags. Nothing to change at
    /// all answers with the stored resource without opening a transaction.
    pub async fn edit(
        &self,
        id: ResourceId,
        changes: ResourceChanges,
        tags: Option<Vec<TagName>>,
    ) -> Result<Option<Resource>, LifecycleError> {
        if let Some(status) = changes.status {
            ensure_reachable(status)?;
        }
        if changes.is_empty() && tags.is_none() {
            return self.get(id).await;
        }

        let mut tx = self.store.begin().await?;

        let found = if changes.is_empty() {
            tx.find_resource(id).await?.is_some()
        } else {
            tx.update_resource(id, &changes).await?.is_some()
        };
        if !found {
            return Ok(None);
        }

        if let Some(tags) = tags.as_deref() {
            tx.replace_tags(id, tags).await?;
        }
        let updated = tx.find_resource(id).await?;

        tx.commit().await?;

        info!(
            resource_id = %id,
            status = ?changes.status,
            retagged = tags.is_some(),
            "resource edited"
        );
        Ok(updated)
    }

    /// Moves a resource to approved or rejected.
    pub async fn moderate(
        &self,
        id: ResourceId,
        decision: ModerationDecision,
    ) -> Result<Option<Resource>, LifecycleError> {
        let moderated = self
            .edit(id, ResourceChanges::status(decision.into()), None)
            .await?;
        if moderated.is_some() {
            info!(resource_id = %id, %decision, "resource moderated");
        }
        Ok(moderated)
    }

    /// Hard delete. Tag associations go with the resource.
    pub async fn remove(&self, id: ResourceId) -> Result<bool, LifecycleError> {
        let mut tx = self.store.begin().await?;
        let removed = tx.delete_resource(id).await?;
        tx.commit().await?;

        if removed {
            info!(resource_id = %id, "resource removed");
        }
        Ok(removed)
    }

    /// Counts a vote. Resources that are missing or not approved answer `None`.
    pub async fn vote(
        &self,
        id: ResourceId,
        direction: VoteDirection,
    ) -> Result<Option<Resource>, LifecycleError> {
        let mut tx = self.store.begin().await?;

        let Some(score) = tx.increment_vote(id, direction.delta()).await? else {
            return Ok(None);
        };
        let voted = tx.find_resource(id).await?;

        tx.commit().await?;

        info!(resource_id = %id, ?direction, vote_score = score, "vote counted");
        Ok(voted)
    }
}

fn missing_after_write(id: ResourceId) -> RepositoryError {
    RepositoryError::Database(format!("resource {} not readable after insert", id))
}
