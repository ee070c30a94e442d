use hub_common::TagName;
use tracing::info;

use crate::domain::{
    category::{Category, CategoryChanges, CategoryId, NewCategory},
    repository::{RepositoryError, Store, StoreTransaction},
    tag::{Tag, TagId},
};

/// Categories and tags. Neither has a moderation state.
#[derive(Debug, Clone)]
pub struct Catalog<S: Store> {
    store: S,
}

impl<S: Store> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.store.list_categories().await
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        self.store.find_category(id).await
    }

    pub async fn create_category(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        let mut tx = self.store.begin().await?;
        let created = tx.create_category(&category).await?;
        tx.commit().await?;

        info!(category_id = %created.id, name = %created.name, "category created");
        Ok(created)
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        changes: CategoryChanges,
    ) -> Result<Option<Category>, RepositoryError> {
        if changes.is_empty() {
            return self.get_category(id).await;
        }

        let mut tx = self.store.begin().await?;
        let Some(updated) = tx.update_category(id, &changes).await? else {
            return Ok(None);
        };
        tx.commit().await?;

        info!(category_id = %id, "category updated");
        Ok(Some(updated))
    }

    /// Resources of a deleted category stay in place without a category.
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let mut tx = self.store.begin().await?;
        let deleted = tx.delete_category(id).await?;
        tx.commit().await?;

        if deleted {
            info!(category_id = %id, "category deleted");
        }
        Ok(deleted)
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        self.store.list_tags().await
    }

    pub async fn get_tag(&self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        self.store.find_tag(id).await
    }

    /// Creating a tag that already exists answers with the existing one.
    pub async fn create_tag(&self, name: TagName) -> Result<Tag, RepositoryError> {
        let mut tx = self.store.begin().await?;
        let id = tx.ensure_tag(&name).await?;
        let tag = tx.find_tag(id).await?.ok_or_else(|| {
            RepositoryError::Database(format!("tag {} not readable after insert", id))
        })?;
        tx.commit().await?;

        info!(tag_id = %id, name = %name, "tag ensured");
        Ok(tag)
    }

    pub async fn delete_tag(&self, id: TagId) -> Result<bool, RepositoryError> {
        let mut tx = self.store.begin().await?;
        let deleted = tx.delete_tag(id).await?;
        tx.commit().await?;

        if deleted {
            info!(tag_id = %id, "tag deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use hub_common::{CategoryName, ResourceTitle, ResourceType};

    use super::*;
    use crate::domain::engine::ResourceLifecycle;
    use crate::domain::resource::{FieldUpdate, NewResource};
    use crate::test_utils::InMemoryStore;

    fn category(name: &str) -> NewCategory {
        NewCategory {
            name: CategoryName::try_new(name).unwrap(),
            description: Some("things".to_string()),
        }
    }

    #[tokio::test]
    async fn category_names_are_unique() {
        let catalog = Catalog::new(InMemoryStore::default());
        catalog.create_category(category("Sleep")).await.unwrap();

        let duplicate = catalog.create_category(category("Sleep")).await;

        assert!(matches!(duplicate, Err(RepositoryError::UniqueViolation(_))));
        assert_eq!(catalog.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn category_update_is_partial() {
        let catalog = Catalog::new(InMemoryStore::default());
        let created = catalog.create_category(category("Sleep")).await.unwrap();

        let changes = CategoryChanges {
            description: FieldUpdate::Clear,
            ..Default::default()
        };
        let updated = catalog
            .update_category(created.id, changes)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Sleep");
        assert_eq!(updated.description, None);
        assert_eq!(
            catalog
                .update_category(CategoryId(99), CategoryChanges::default())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn deleting_category_uncategorises_resources() {
        let store = InMemoryStore::default();
        let catalog = Catalog::new(store.clone());
        let engine = ResourceLifecycle::new(store);
        let category = catalog.create_category(category("Sleep")).await.unwrap();
        let resource = NewResource {
            title: ResourceTitle::try_new("Naps").unwrap(),
            description: None,
            url: None,
            resource_type: ResourceType::Tip,
            category_id: Some(category.id),
            submitted_by: None,
        };
        let id = engine.submit(resource, &[]).await.unwrap().id;

        assert!(catalog.delete_category(category.id).await.unwrap());

        let stored = engine.get(id).await.unwrap().unwrap();
        assert_eq!(stored.category_id, None);
        assert_eq!(stored.category_name, None);
    }

    #[tokio::test]
    async fn creating_a_tag_twice_yields_one_row() {
        let catalog = Catalog::new(InMemoryStore::default());

        let first = catalog.create_tag(TagName::try_new("Sleep").unwrap()).await.unwrap();
        let second = catalog.create_tag(TagName::try_new(" sleep").unwrap()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(catalog.list_tags().await.unwrap().len(), 1);
        assert!(catalog.delete_tag(first.id).await.unwrap());
        assert!(!catalog.delete_tag(first.id).await.unwrap());
    }
}
