use std::collections::HashSet;

use crate::domain::persistence::Persistence;
use crate::domain::tables::{CheckConstraint, Column, ForeignKeyConstraint, Index, Table, directory_tables};

pub trait MigrationStep {
    fn ctx(&self) -> &'static str;
    fn ddls(self) -> Vec<String>;
}

#[derive(Debug)]
pub struct CreateTableStep {
    table_name: String,
    ddls: Vec<String>,
}

impl CreateTableStep {
    fn new(database_schema: &str, table: &Table) -> Self {
        let ddls = create_table_ddl(database_schema, table);
        Self {
            table_name: table.name.clone(),
            ddls,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl MigrationStep for CreateTableStep {
    fn ctx(&self) -> &'static str {
        "CREATE TABLE"
    }

    fn ddls(self) -> Vec<String> {
        self.ddls
    }
}

/// Brings the configured schema up to the directory's table layout.
pub struct Migration<P: Persistence> {
    persistence: P,
}

impl<P: Persistence> Migration<P> {
    pub fn new(persistence: P) -> Self {
        Self { persistence }
    }

    pub async fn migrate(&self) -> Result<usize, anyhow::Error> {
        let existing = self.persistence.load().await?;
        let steps = migration_steps(self.persistence.database_schema(), &existing);
        let created = steps.len();

        for step in steps.iter() {
            tracing::info!(table = step.table_name(), "creating table");
        }
        self.persistence.apply_migration_steps(steps).await?;

        Ok(created)
    }
}

/// One step per table missing from `existing`, in dependency order.
pub fn migration_steps(database_schema: &str, existing: &HashSet<String>) -> Vec<CreateTableStep> {
    directory_tables()
        .iter()
        .filter(|table| !existing.contains(&table.name))
        .map(|table| CreateTableStep::new(database_schema, table))
        .collect()
}

fn create_table_ddl(schema: &str, table: &Table) -> Vec<String> {
    let mut columns = Vec::new();
    let mut pk_columns = Vec::new();

    for column in table.columns.iter() {
        columns.push(column_ddl(column));
        if column.primary_key {
            pk_columns.push(format!("\"{}\"", column.name));
        }
    }

    for check in table.checks.iter() {
        columns.push(check_ddl(&table.name, check));
    }

    let columns_sql = columns.join(",\n    ");
    let pk_columns_sql = pk_columns.join(", ");

    let table_ddl = format!(
        "CREATE TABLE \"{}\".\"{}\" (\n    {},\n    PRIMARY KEY({})\n)",
        schema, table.name, columns_sql, pk_columns_sql
    );

    let mut ddls = vec![table_ddl];

    for fk in table.foreign_keys.iter() {
        ddls.push(create_fk_ddl(schema, fk));
    }

    for index in table.indexes.iter() {
        ddls.push(create_index_ddl(schema, index));
    }

    ddls
}

fn column_ddl(column: &Column) -> String {
    let mut sql = format!("\"{}\" {}", column.name, column.column_type);
    if column.not_null {
        sql.push_str(" NOT NULL");
    }
    if let Some(default_value) = &column.default_value {
        sql.push_str(format!(" DEFAULT {}", default_value).as_str());
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }
    sql
}

fn check_ddl(table_name: &str, check: &CheckConstraint) -> String {
    let values = check
        .allowed_values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CONSTRAINT \"{}_{}_check\" CHECK (\"{}\" IN ({}))",
        table_name, check.column_name, check.column_name, values
    )
}

fn create_fk_ddl(schema: &str, fk: &ForeignKeyConstraint) -> String {
    format!(
        "ALTER TABLE \"{}\".\"{}\" ADD CONSTRAINT \"{}_{}_fkey\" FOREIGN KEY (\"{}\") REFERENCES \"{}\".\"{}\" (\"{}\") ON DELETE {}",
        schema,
        fk.table_name,
        fk.table_name,
        fk.column_name,
        fk.column_name,
        schema,
        fk.referenced_table_name,
        fk.referenced_column_name,
        fk.on_delete.as_sql()
    )
}

fn create_index_ddl(schema: &str, index: &Index) -> String {
    let columns_sql = index
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE {}INDEX \"{}_{}_idx\" ON \"{}\".\"{}\" ({})",
        if index.unique { "UNIQUE " } else { "" },
        index.table_name,
        index.columns.join("_"),
        schema,
        index.table_name,
        columns_sql
    )
}
