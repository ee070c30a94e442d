//! In-memory store for engine, gateway and HTTP tests.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use hub_common::{ResourceStatus, ResourceUrl, TagName};

use crate::domain::{
    AppState,
    moderation::ModerationGateway,
    category::{Category, CategoryChanges, CategoryId, NewCategory},
    dashboard::{Dashboard, StatusCounts},
    repository::{RepositoryError, Store, StoreTransaction},
    resource::{NewResource, Resource, ResourceChanges, ResourceId, ResourceQuery},
    tag::{Tag, TagId},
};

/// Store that keeps everything in memory.
///
/// A transaction works on a private copy taken at `begin` and swaps it in on
/// `commit`, so dropping it uncommitted discards every write, like a real
/// database transaction would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    data: Snapshot,
    failing_tags: HashSet<String>,
    transactions_begun: usize,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    resources: BTreeMap<ResourceId, Resource>,
    categories: BTreeMap<CategoryId, Category>,
    tags: BTreeMap<TagId, Tag>,
    resource_tags: BTreeSet<(ResourceId, TagId)>,
    last_id: i64,
}

pub struct InMemoryTransaction {
    store: InMemoryStore,
    working: Snapshot,
    failing_tags: HashSet<String>,
}

impl InMemoryStore {
    /// Makes `ensure_tag` fail for this canonical tag name.
    pub fn fail_on_tag(&self, name: &str) {
        self.inner.lock().unwrap().failing_tags.insert(name.to_string());
    }

    pub fn transactions_begun(&self) -> usize {
        self.inner.lock().unwrap().transactions_begun
    }

    pub fn resource_count(&self) -> usize {
        self.inner.lock().unwrap().data.resources.len()
    }

    pub fn tag_count(&self) -> usize {
        self.inner.lock().unwrap().data.tags.len()
    }

    pub fn association_count(&self) -> usize {
        self.inner.lock().unwrap().data.resource_tags.len()
    }

    fn read(&self) -> Snapshot {
        self.inner.lock().unwrap().data.clone()
    }
}

impl Snapshot {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn resource(&self, id: ResourceId) -> Option<Resource> {
        let mut resource = self.resources.get(&id)?.clone();
        resource.category_name = resource
            .category_id
            .and_then(|category| self.categories.get(&category))
            .map(|category| category.name.clone());
        let mut tags: Vec<String> = self
            .resource_tags
            .iter()
            .filter(|(resource_id, _)| *resource_id == id)
            .filter_map(|(_, tag_id)| self.tags.get(tag_id))
            .map(|tag| tag.name.clone())
            .collect();
        tags.sort();
        resource.tags = tags;
        Some(resource)
    }

    fn newest_first(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> = self
            .resources
            .keys()
            .filter_map(|id| self.resource(*id))
            .collect();
        resources.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        resources
    }

    fn tag(&self, id: TagId) -> Option<Tag> {
        let mut tag = self.tags.get(&id)?.clone();
        tag.resource_count = self
            .resource_tags
            .iter()
            .filter(|(_, tag_id)| *tag_id == id)
            .count() as i64;
        Some(tag)
    }

    fn category_name_taken(&self, name: &str, except: Option<CategoryId>) -> bool {
        self.categories
            .values()
            .any(|category| category.name == name && Some(category.id) != except)
    }

    fn check_category(&self, category_id: Option<CategoryId>) -> Result<(), RepositoryError> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(RepositoryError::Database(
                format!("category {} does not exist", id),
            )),
            _ => Ok(()),
        }
    }
}

impl Store for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        inner.transactions_begun += 1;
        Ok(InMemoryTransaction {
            store: self.clone(),
            working: inner.data.clone(),
            failing_tags: inner.failing_tags.clone(),
        })
    }

    async fn find_resource(&self, id: ResourceId) -> Result<Option<Resource>, RepositoryError> {
        Ok(self.read().resource(id))
    }

    async fn list_resources(&self, query: &ResourceQuery) -> Result<Vec<Resource>, RepositoryError> {
        let resources = self
            .read()
            .newest_first()
            .into_iter()
            .filter(|r| query.status.is_none_or(|status| r.status == status))
            .filter(|r| query.category_id.is_none_or(|id| r.category_id == Some(id)))
            .filter(|r| {
                query.tag.as_ref().is_none_or(|tag| {
                    let tag: &str = tag.as_ref();
                    r.tags.iter().any(|name| name == tag)
                })
            })
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(resources)
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.read().categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<Category> = self.read().categories.into_values().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        Ok(self.read().tag(id))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        let data = self.read();
        let mut tags: Vec<Tag> = data.tags.keys().filter_map(|id| data.tag(*id)).collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn dashboard(&self, recent_limit: i64) -> Result<Dashboard, RepositoryError> {
        let data = self.read();
        let mut counts = StatusCounts::default();
        for resource in data.resources.values() {
            counts.add(resource.status, 1);
        }
        Ok(Dashboard {
            resources_by_status: counts,
            total_resources: counts.total(),
            total_categories: data.categories.len() as i64,
            total_tags: data.tags.len() as i64,
            recent_resources: data
                .newest_first()
                .into_iter()
                .take(recent_limit as usize)
                .collect(),
        })
    }
}

impl StoreTransaction for InMemoryTransaction {
    async fn create_resource(&mut self, resource: &NewResource) -> Result<ResourceId, RepositoryError> {
        self.working.check_category(resource.category_id)?;
        let id = ResourceId(self.working.next_id());
        let stored = Resource {
            id,
            title: resource.title.clone().into_inner(),
            description: resource.description.clone(),
            url: resource.url.clone().map(ResourceUrl::into_inner),
            resource_type: resource.resource_type,
            category_id: resource.category_id,
            category_name: None,
            status: ResourceStatus::Pending,
            vote_score: 0,
            submitted_by: resource.submitted_by.clone(),
            created_at: Utc::now(),
            approved_at: None,
            tags: Vec::new(),
        };
        self.working.resources.insert(id, stored);
        Ok(id)
    }

    async fn find_resource(&mut self, id: ResourceId) -> Result<Option<Resource>, RepositoryError> {
        Ok(self.working.resource(id))
    }

    async fn update_resource(
        &mut self,
        id: ResourceId,
        changes: &ResourceChanges,
    ) -> Result<Option<ResourceId>, RepositoryError> {
        if changes.is_empty() {
            return Ok(None);
        }
        if let Some(category_id) = changes.category_id.as_assignment().flatten() {
            self.working.check_category(Some(*category_id))?;
        }
        let Some(resource) = self.working.resources.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = &changes.title {
            resource.title = title.clone().into_inner();
        }
        changes.description.apply_to(&mut resource.description);
        changes
            .url
            .clone()
            .map(ResourceUrl::into_inner)
            .apply_to(&mut resource.url);
        if let Some(resource_type) = changes.resource_type {
            resource.resource_type = resource_type;
        }
        changes.category_id.apply_to(&mut resource.category_id);
        changes.submitted_by.apply_to(&mut resource.submitted_by);
        if let Some(status) = changes.status {
            resource.status = status;
            if status == ResourceStatus::Approved {
                resource.approved_at = Some(Utc::now());
            }
        }
        Ok(Some(id))
    }

    async fn delete_resource(&mut self, id: ResourceId) -> Result<bool, RepositoryError> {
        let removed = self.working.resources.remove(&id).is_some();
        self.working.resource_tags.retain(|(resource_id, _)| *resource_id != id);
        Ok(removed)
    }

    async fn increment_vote(&mut self, id: ResourceId, delta: i32) -> Result<Option<i32>, RepositoryError> {
        let score = self
            .working
            .resources
            .get_mut(&id)
            .filter(|resource| resource.status == ResourceStatus::Approved)
            .map(|resource| {
                resource.vote_score += delta;
                resource.vote_score
            });
        Ok(score)
    }

    async fn ensure_tag(&mut self, name: &TagName) -> Result<TagId, RepositoryError> {
        let name: &str = name.as_ref();
        if self.failing_tags.contains(name) {
            return Err(RepositoryError::Database(format!("injected failure for tag {}", name)));
        }
        if let Some(tag) = self.working.tags.values().find(|tag| tag.name == name) {
            return Ok(tag.id);
        }
        let id = TagId(self.working.next_id());
        self.working.tags.insert(
            id,
            Tag {
                id,
                name: name.to_string(),
                created_at: Utc::now(),
                resource_count: 0,
            },
        );
        Ok(id)
    }

    async fn replace_tags(&mut self, id: ResourceId, tags: &[TagName]) -> Result<(), RepositoryError> {
        self.working.resource_tags.retain(|(resource_id, _)| *resource_id != id);
        for name in tags {
            let tag_id = self.ensure_tag(name).await?;
            self.working.resource_tags.insert((id, tag_id));
        }
        Ok(())
    }

    async fn find_tag(&mut self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        Ok(self.working.tag(id))
    }

    async fn delete_tag(&mut self, id: TagId) -> Result<bool, RepositoryError> {
        let removed = self.working.tags.remove(&id).is_some();
        self.working.resource_tags.retain(|(_, tag_id)| *tag_id != id);
        Ok(removed)
    }

    async fn create_category(&mut self, category: &NewCategory) -> Result<Category, RepositoryError> {
        let name: &str = category.name.as_ref();
        if self.working.category_name_taken(name, None) {
            return Err(RepositoryError::UniqueViolation(format!("category {}", name)));
        }
        let id = CategoryId(self.working.next_id());
        let created = Category {
            id,
            name: name.to_string(),
            description: category.description.clone(),
            created_at: Utc::now(),
        };
        self.working.categories.insert(id, created.clone());
        Ok(created)
    }

    async fn update_category(
        &mut self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, RepositoryError> {
        if let Some(name) = &changes.name {
            if self.working.category_name_taken(name.as_ref(), Some(id)) {
                return Err(RepositoryError::UniqueViolation(format!("category {}", name)));
            }
        }
        let Some(category) = self.working.categories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            category.name = name.clone().into_inner();
        }
        changes.description.apply_to(&mut category.description);
        Ok(Some(category.clone()))
    }

    async fn delete_category(&mut self, id: CategoryId) -> Result<bool, RepositoryError> {
        let removed = self.working.categories.remove(&id).is_some();
        for resource in self.working.resources.values_mut() {
            if resource.category_id == Some(id) {
                resource.category_id = None;
            }
        }
        Ok(removed)
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.store.inner.lock().unwrap().data = self.working;
        Ok(())
    }
}

pub const MODERATOR_TOKEN: &str = "test-moderator-token";

/// Application state over an [`InMemoryStore`], for driving the router.
#[derive(Clone)]
pub struct TestAppState {
    gateway: ModerationGateway<InMemoryStore>,
}

impl TestAppState {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            gateway: ModerationGateway::new(store, 5),
        }
    }
}

impl AppState for TestAppState {
    type S = InMemoryStore;

    fn gateway(&self) -> &ModerationGateway<Self::S> {
        &self.gateway
    }

    fn moderator_token(&self) -> &str {
        MODERATOR_TOKEN
    }
}
