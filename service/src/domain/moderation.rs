use hub_common::TagName;
use tracing::warn;

use crate::domain::{
    catalog::Catalog,
    category::{Category, CategoryChanges, CategoryId, NewCategory},
    dashboard::Dashboard,
    engine::ResourceLifecycle,
    repository::Store,
    resource::{
        NewResource, Resource, ResourceChanges, ResourceId, ResourceQuery,
        error::LifecycleError,
        lifecycle::{ModerationDecision, VoteDirection},
    },
    tag::{Tag, TagId},
};

/// Who is asking. Authentication happens before the gateway is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caller {
    moderator: bool,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { moderator: false }
    }

    pub fn moderator() -> Self {
        Self { moderator: true }
    }

    pub fn is_moderator(&self) -> bool {
        self.moderator
    }
}

/// Authorization in front of the lifecycle engine and the catalog.
///
/// Anyone may submit, vote and read. Everything that changes status,
/// edits, deletes or touches categories and tags needs a moderator. The
/// role check runs before any store access.
#[derive(Debug, Clone)]
pub struct ModerationGateway<S: Store> {
    lifecycle: ResourceLifecycle<S>,
    catalog: Catalog<S>,
    recent_limit: i64,
}

impl<S: Store> ModerationGateway<S> {
    pub fn new(store: S, recent_limit: i64) -> Self {
        Self {
            lifecycle: ResourceLifecycle::new(store.clone()),
            catalog: Catalog::new(store),
            recent_limit,
        }
    }

    pub async fn submit(
        &self,
        resource: NewResource,
        tags: &[TagName],
    ) -> Result<Resource, LifecycleError> {
        self.lifecycle.submit(resource, tags).await
    }

    pub async fn vote(
        &self,
        id: ResourceId,
        direction: VoteDirection,
    ) -> Result<Option<Resource>, LifecycleError> {
        self.lifecycle.vote(id, direction).await
    }

    pub async fn get(&self, id: ResourceId) -> Result<Option<Resource>, LifecycleError> {
        self.lifecycle.get(id).await
    }

    pub async fn list(&self, query: &ResourceQuery) -> Result<Vec<Resource>, LifecycleError> {
        Ok(self.lifecycle.store().list_resources(query).await?)
    }

    pub async fn edit(
        &self,
        caller: Caller,
        id: ResourceId,
        changes: ResourceChanges,
        tags: Option<Vec<TagName>>,
    ) -> Result<Option<Resource>, LifecycleError> {
        require_moderator(caller, "edit")?;
        self.lifecycle.edit(id, changes, tags).await
    }

    pub async fn moderate(
        &self,
        caller: Caller,
        id: ResourceId,
        decision: ModerationDecision,
    ) -> Result<Option<Resource>, LifecycleError> {
        require_moderator(caller, "moderate")?;
        self.lifecycle.moderate(id, decision).await
    }

    pub async fn remove(&self, caller: Caller, id: ResourceId) -> Result<bool, LifecycleError> {
        require_moderator(caller, "remove")?;
        self.lifecycle.remove(id).await
    }

    pub async fn dashboard(&self, caller: Caller) -> Result<Dashboard, LifecycleError> {
        require_moderator(caller, "dashboard")?;
        Ok(self.lifecycle.store().dashboard(self.recent_limit).await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, LifecycleError> {
        Ok(self.catalog.list_categories().await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, LifecycleError> {
        Ok(self.catalog.get_category(id).await?)
    }

    pub async fn create_category(
        &self,
        caller: Caller,
        category: NewCategory,
    ) -> Result<Category, LifecycleError> {
        require_moderator(caller, "create category")?;
        Ok(self.catalog.create_category(category).await?)
    }

    pub async fn update_category(
        &self,
        caller: Caller,
        id: CategoryId,
        changes: CategoryChanges,
    ) -> Result<Option<Category>, LifecycleError> {
        require_moderator(caller, "update category")?;
        Ok(self.catalog.update_category(id, changes).await?)
    }

    pub async fn delete_category(&self, caller: Caller, id: CategoryId) -> Result<bool, LifecycleError> {
        require_moderator(caller, "delete category")?;
        Ok(self.catalog.delete_category(id).await?)
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, LifecycleError> {
        Ok(self.catalog.list_tags().await?)
    }

    pub async fn get_tag(&self, id: TagId) -> Result<Option<Tag>, LifecycleError> {
        Ok(self.catalog.get_tag(id).await?)
    }

    pub async fn create_tag(&self, caller: Caller, name: TagName) -> Result<Tag, LifecycleError> {
        require_moderator(caller, "create tag")?;
        Ok(self.catalog.create_tag(name).await?)
    }

    pub async fn delete_tag(&self, caller: Caller, id: TagId) -> Result<bool, LifecycleError> {
        require_moderator(caller, "delete tag")?;
        Ok(self.catalog.delete_tag(id).await?)
    }
}

fn require_moderator(caller: Caller, operation: &'static str) -> Result<(), LifecycleError> {
    if caller.is_moderator() {
        Ok(())
    } else {
        warn!(operation, "moderator role required");
        Err(LifecycleError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use hub_common::{CategoryName, ResourceStatus, ResourceTitle, ResourceType};

    use super::*;
    use crate::test_utils::InMemoryStore;

    fn gateway() -> (InMemoryStore, ModerationGateway<InMemoryStore>) {
        let store = InMemoryStore::default();
        (store.clone(), ModerationGateway::new(store, 5))
    }

    fn resource(title: &str) -> NewResource {
        NewResource {
            title: ResourceTitle::try_new(title).unwrap(),
            description: None,
            url: None,
            resource_type: ResourceType::Book,
            category_id: None,
            submitted_by: None,
        }
    }

    #[tokio::test]
    async fn anonymous_callers_submit_and_vote() {
        let (_, gateway) = gateway();
        let id = gateway.submit(resource("Book"), &[]).await.unwrap().id;
        gateway
            .moderate(Caller::moderator(), id, ModerationDecision::Approved)
            .await
            .unwrap();

        let voted = gateway.vote(id, VoteDirection::Up).await.unwrap().unwrap();
        assert_eq!(voted.vote_score, 1);
    }

    #[tokio::test]
    async fn denial_happens_before_any_store_access() {
        let (store, gateway) = gateway();
        let id = gateway.submit(resource("Book"), &[]).await.unwrap().id;
        let begun = store.transactions_begun();
        let anonymous = Caller::anonymous();

        let results = [
            gateway
                .moderate(anonymous, id, ModerationDecision::Approved)
                .await
                .map(|_| ()),
            gateway
                .edit(anonymous, id, ResourceChanges::status(ResourceStatus::Approved), None)
                .await
                .map(|_| ()),
            gateway.remove(anonymous, id).await.map(|_| ()),
            gateway.dashboard(anonymous).await.map(|_| ()),
            gateway.delete_tag(anonymous, TagId(1)).await.map(|_| ()),
            gateway
                .create_category(
                    anonymous,
                    NewCategory {
                        name: CategoryName::try_new("Sleep").unwrap(),
                        description: None,
                    },
                )
                .await
                .map(|_| ()),
        ];

        for result in results {
            assert!(matches!(result, Err(LifecycleError::Forbidden)));
        }
        assert_eq!(store.transactions_begun(), begun);
        assert_eq!(
            gateway.get(id).await.unwrap().unwrap().status,
            ResourceStatus::Pending
        );
    }

    #[tokio::test]
    async fn forbidden_is_reported_even_for_missing_resources() {
        let (_, gateway) = gateway();

        let result = gateway.remove(Caller::anonymous(), ResourceId(12)).await;

        assert!(matches!(result, Err(LifecycleError::Forbidden)));
    }

    #[tokio::test]
    async fn dashboard_rolls_up_counts() {
        let (_, gateway) = gateway();
        let moderator = Caller::moderator();
        for n in 0..7 {
            gateway.submit(resource(&format!("Item {n}")), &[]).await.unwrap();
        }
        gateway
            .moderate(moderator, ResourceId(1), ModerationDecision::Approved)
            .await
            .unwrap();
        gateway
            .moderate(moderator, ResourceId(2), ModerationDecision::Rejected)
            .await
            .unwrap();
        gateway
            .create_tag(moderator, TagName::try_new("sleep").unwrap())
            .await
            .unwrap();

        let dashboard = gateway.dashboard(moderator).await.unwrap();

        assert_eq!(dashboard.resources_by_status.pending, 5);
        assert_eq!(dashboard.resources_by_status.approved, 1);
        assert_eq!(dashboard.resources_by_status.rejected, 1);
        assert_eq!(dashboard.total_resources, 7);
        assert_eq!(dashboard.total_categories, 0);
        assert_eq!(dashboard.total_tags, 1);
        assert_eq!(dashboard.recent_resources.len(), 5);
        assert_eq!(dashboard.recent_resources[0].title, "Item 6");
    }
}
