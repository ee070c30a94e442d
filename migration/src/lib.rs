pub mod domain;
pub mod infrastructure;

use hub_common::Database;

use crate::domain::migration::Migration;
use crate::infrastructure::persistence::PersistenceAdapter;

/// Creates every directory table missing from the database's schema.
/// Returns the number of tables created.
pub async fn migrate(database: &Database) -> Result<usize, anyhow::Error> {
    let persistence = PersistenceAdapter::new(database.clone());
    Migration::new(persistence).migrate().await
}
