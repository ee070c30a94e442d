use hub_common::{Database, TagName};
use sqlx::{Postgres, Transaction};

use crate::domain::{
    category::{Category, CategoryChanges, CategoryId, NewCategory},
    dashboard::Dashboard,
    repository::{RepositoryError, Store, StoreTransaction},
    resource::{NewResource, Resource, ResourceChanges, ResourceId, ResourceQuery},
    tag::{Tag, TagId},
};

pub mod categories;
pub mod dashboard;
pub mod query;
pub mod resources;
pub mod schema;
pub mod tags;

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
                RepositoryError::UniqueViolation(database_error.message().to_string())
            }
            _ => RepositoryError::Database(error.to_string()),
        }
    }
}

/// Postgres backed store. Reads take a pooled connection, writes go through
/// a [`PostgresTransaction`].
#[derive(Clone, Debug)]
pub struct PostgresStore {
    database: Database,
}

impl PostgresStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

pub struct PostgresTransaction {
    transaction: Transaction<'static, Postgres>,
}

impl Store for PostgresStore {
    type Tx = PostgresTransaction;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        let transaction = self.database.begin().await?;
        Ok(PostgresTransaction { transaction })
    }

    async fn find_resource(&self, id: ResourceId) -> Result<Option<Resource>, RepositoryError> {
        let mut connection = self.database.database_pool().acquire().await?;
        resources::find(&mut connection, id).await
    }

    async fn list_resources(&self, query: &ResourceQuery) -> Result<Vec<Resource>, RepositoryError> {
        let mut connection = self.database.database_pool().acquire().await?;
        resources::list(&mut connection, query).await
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let mut connection = self.database.database_pool().acquire().await?;
        categories::find(&mut connection, id).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut connection = self.database.database_pool().acquire().await?;
        categories::list(&mut connection).await
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        let mut connection = self.database.database_pool().acquire().await?;
        tags::find(&mut connection, id).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        let mut connection = self.database.database_pool().acquire().await?;
        tags::list(&mut connection).await
    }

    async fn dashboard(&self, recent_limit: i64) -> Result<Dashboard, RepositoryError> {
        let mut connection = self.database.database_pool().acquire().await?;
        dashboard::load(&mut connection, recent_limit).await
    }
}

impl StoreTransaction for PostgresTransaction {
    async fn create_resource(&mut self, resource: &NewResource) -> Result<ResourceId, RepositoryError> {
        resources::create(&mut self.transaction, resource).await
    }

    async fn find_resource(&mut self, id: ResourceId) -> Result<Option<Resource>, RepositoryError> {
        resources::find(&mut self.transaction, id).await
    }

    async fn update_resource(
        &mut self,
        id: ResourceId,
        changes: &ResourceChanges,
    ) -> Result<Option<ResourceId>, RepositoryError> {
        resources::update(&mut self.transaction, id, changes).await
    }

    async fn delete_resource(&mut self, id: ResourceId) -> Result<bool, RepositoryError> {
        resources::delete(&mut self.transaction, id).await
    }

    async fn increment_vote(&mut self, id: ResourceId, delta: i32) -> Result<Option<i32>, RepositoryError> {
        resources::increment_vote(&mut self.transaction, id, delta).await
    }

    async fn ensure_tag(&mut self, name: &TagName) -> Result<TagId, RepositoryError> {
        tags::ensure_tag(&mut self.transaction, name).await
    }

    async fn replace_tags(&mut self, id: ResourceId, tags: &[TagName]) -> Result<(), RepositoryError> {
        tags::replace_tags_for_resource(&mut self.transaction, id, tags).await
    }

    async fn find_tag(&mut self, id: TagId) -> Result<Option<Tag>, RepositoryError> {
        tags::find(&mut self.transaction, id).await
    }

    async fn delete_tag(&mut self, id: TagId) -> Result<bool, RepositoryError> {
        tags::delete(&mut self.transaction, id).await
    }

    async fn create_category(&mut self, category: &NewCategory) -> Result<Category, RepositoryError> {
        categories::create(&mut self.transaction, category).await
    }

    async fn update_category(
        &mut self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, RepositoryError> {
        categories::update(&mut self.transaction, id, changes).await
    }

    async fn delete_category(&mut self, id: CategoryId) -> Result<bool, RepositoryError> {
        categories::delete(&mut self.transaction, id).await
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.transaction.commit().await?;
        Ok(())
    }
}
