use std::collections::HashSet;

use crate::domain::migration::MigrationStep;

pub trait Persistence: Send + Sync + Clone + 'static {
    /// load table names present in the database schema
    fn load(&self) -> impl Future<Output = Result<HashSet<String>, anyhow::Error>>;
    /// apply migration steps to database, one transaction per step
    fn apply_migration_steps(
        &self,
        steps: Vec<impl MigrationStep + Send>,
    ) -> impl Future<Output = Result<(), anyhow::Error>>;
    /// database schema the tables live in
    fn database_schema(&self) -> &str;
}
