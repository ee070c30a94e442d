use std::future::Future;

use hub_common::TagName;
use thiserror::Error;

use crate::domain::{
    category::{Category, CategoryChanges, CategoryId, NewCategory},
    dashboard::Dashboard,
    resource::{NewResource, Resource, ResourceChanges, ResourceId, ResourceQuery},
    tag::{Tag, TagId},
};

/// Failure reported by a store. Missing rows are not errors: lookups answer
/// with `None` and deletes with `false`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Entry point to the relational store.
///
/// Reads run outside of any explicit transaction. Every mutating operation
/// goes through a [`StoreTransaction`] obtained from [`Store::begin`].
pub trait Store: Clone + Send + Sync + 'static {
    type Tx: StoreTransaction;

    fn begin(&self) -> impl Future<Output = Result<Self::Tx, RepositoryError>> + Send;

    fn find_resource(
        &self,
        id: ResourceId,
    ) -> impl Future<Output = Result<Option<Resource>, RepositoryError>> + Send;

    /// Resources matching the query, newest first
    fn list_resources(
        &self,
        query: &ResourceQuery,
    ) -> impl Future<Output = Result<Vec<Resource>, RepositoryError>> + Send;

    fn find_category(
        &self,
        id: CategoryId,
    ) -> impl Future<Output = Result<Option<Category>, RepositoryError>> + Send;

    /// All categories ordered by name
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, RepositoryError>> + Send;

    fn find_tag(&self, id: TagId) -> impl Future<Output = Result<Option<Tag>, RepositoryError>> + Send;

    /// All tags ordered by name, with usage counts
    fn list_tags(&self) -> impl Future<Output = Result<Vec<Tag>, RepositoryError>> + Send;

    fn dashboard(
        &self,
        recent_limit: i64,
    ) -> impl Future<Output = Result<Dashboard, RepositoryError>> + Send;
}

/// A unit of work against the store.
///
/// Nothing written through the transaction is visible to others until
/// [`StoreTransaction::commit`] succeeds. Dropping it uncommitted discards
/// every write.
pub trait StoreTransaction: Send {
    /// Inserts a resource as pending with a zero score
    fn create_resource(
        &mut self,
        resource: &NewResource,
    ) -> impl Future<Output = Result<ResourceId, RepositoryError>> + Send;

    fn find_resource(
        &mut self,
        id: ResourceId,
    ) -> impl Future<Output = Result<Option<Resource>, RepositoryError>> + Send;

    /// Writes the changed fields only. Approving stamps `approved_at`.
    ///
    /// Answers `None` when the resource does not exist or `changes` is empty.
    fn update_resource(
        &mut self,
        id: ResourceId,
        changes: &ResourceChanges,
    ) -> impl Future<Output = Result<Option<ResourceId>, RepositoryError>> + Send;

    /// Removes the resource and its tag associations
    fn delete_resource(
        &mut self,
        id: ResourceId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Adds `delta` to the score of an approved resource. Answers `None`
    /// when no approved resource has this id.
    fn increment_vote(
        &mut self,
        id: ResourceId,
        delta: i32,
    ) -> impl Future<Output = Result<Option<i32>, RepositoryError>> + Send;

    /// Id of the tag with this name, creating it when missing
    fn ensure_tag(
        &mut self,
        name: &TagName,
    ) -> impl Future<Output = Result<TagId, RepositoryError>> + Send;

    /// Makes `tags` the exact tag set of the resource
    fn replace_tags(
        &mut self,
        id: ResourceId,
        tags: &[TagName],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn find_tag(
        &mut self,
        id: TagId,
    ) -> impl Future<Output = Result<Option<Tag>, RepositoryError>> + Send;

    /// Removes the tag and every association to it
    fn delete_tag(&mut self, id: TagId) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn create_category(
        &mut self,
        category: &NewCategory,
    ) -> impl Future<Output = Result<Category, RepositoryError>> + Send;

    fn update_category(
        &mut self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> impl Future<Output = Result<Option<Category>, RepositoryError>> + Send;

    /// Removes the category. Its resources stay, uncategorised.
    fn delete_category(
        &mut self,
        id: CategoryId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
