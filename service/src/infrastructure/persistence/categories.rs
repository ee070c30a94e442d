use std::borrow::Cow;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use hub_common::{
    CATEGORIES_TABLE, CREATED_FIELD_NAME, DESCRIPTION_FIELD_NAME, ID_FIELD_NAME, NAME_FIELD_NAME,
};
use sqlx::{PgConnection, Row, postgres::PgRow};
use tracing::debug;

use crate::{
    domain::{
        category::{Category, CategoryChanges, CategoryId, NewCategory},
        repository::RepositoryError,
    },
    infrastructure::persistence::{
        query::{
            Condition, QueryBuilder, SelectItem, SortDirection, SqlParameter, UpdateBuilder, bind_all,
        },
        schema::Table,
    },
};

const CATEGORY: Table<'static> = Table {
    name: CATEGORIES_TABLE,
    alias: "c",
};

const CATEGORY_COLUMNS: [&str; 4] = [
    ID_FIELD_NAME,
    NAME_FIELD_NAME,
    DESCRIPTION_FIELD_NAME,
    CREATED_FIELD_NAME,
];

fn select_categories() -> QueryBuilder<'static> {
    let items = CATEGORY_COLUMNS
        .into_iter()
        .map(|name| SelectItem::Column(Cow::Owned(CATEGORY.column(name))))
        .collect();
    QueryBuilder::from(CATEGORY).select(items)
}

impl TryFrom<&PgRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: &PgRow) -> Result<Self, Self::Error> {
        let created_at: DateTime<Utc> = row.try_get(CREATED_FIELD_NAME)?;
        Ok(Category {
            id: CategoryId(row.try_get(ID_FIELD_NAME)?),
            name: row.try_get(NAME_FIELD_NAME)?,
            description: row.try_get(DESCRIPTION_FIELD_NAME)?,
            created_at,
        })
    }
}

pub async fn find(connection: &mut PgConnection, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
    let (sql, params) = select_categories()
        .where_condition(Condition::Equals {
            column: Cow::Owned(CATEGORY.column(ID_FIELD_NAME)),
            value: SqlParameter::Integer(id.0),
        })
        .build();
    debug!(%sql, "find category");

    let row = bind_all(sqlx::query(&sql), params)
        .fetch_optional(&mut *connection)
        .await?;

    row.as_ref().map(Category::try_from).transpose()
}

pub async fn list(connection: &mut PgConnection) -> Result<Vec<Category>, RepositoryError> {
    let (sql, params) = select_categories()
        .order_by(Cow::Owned(CATEGORY.column(NAME_FIELD_NAME)), SortDirection::Ascending)
        .build();
    debug!(%sql, "list categories");

    let mut rows = bind_all(sqlx::query(&sql), params).fetch(&mut *connection);

    let mut categories = Vec::new();
    while let Some(row) = rows.try_next().await? {
        categories.push(Category::try_from(&row)?);
    }
    Ok(categories)
}

fn returning_columns() -> String {
    CATEGORY_COLUMNS
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn create(connection: &mut PgConnection, category: &NewCategory) -> Result<Category, RepositoryError> {
    let sql = format!(
        "INSERT INTO \"{}\" (\"{}\", \"{}\") VALUES ($1, $2) RETURNING {}",
        CATEGORIES_TABLE,
        NAME_FIELD_NAME,
        DESCRIPTION_FIELD_NAME,
        returning_columns()
    );

    let row = sqlx::query(&sql)
        .bind(category.name.to_string())
        .bind(category.description.as_deref())
        .fetch_one(&mut *connection)
        .await?;

    Category::try_from(&row)
}

pub async fn update(
    connection: &mut PgConnection,
    id: CategoryId,
    changes: &CategoryChanges,
) -> Result<Option<Category>, RepositoryError> {
    let mut builder = UpdateBuilder::table(CATEGORIES_TABLE);
    if let Some(name) = &changes.name {
        builder = builder.set(NAME_FIELD_NAME, SqlParameter::Text(name.to_string()));
    }
    if let Some(description) = changes.description.as_assignment() {
        builder = builder.set(
            DESCRIPTION_FIELD_NAME,
            SqlParameter::OptionalText(description.cloned()),
        );
    }

    let Some((sql, params)) = builder
        .where_equals(ID_FIELD_NAME, SqlParameter::Integer(id.0))
        .returning(CATEGORY_COLUMNS.to_vec())
        .build()
    else {
        return find(connection, id).await;
    };
    debug!(%sql, "update category");

    let row = bind_all(sqlx::query(&sql), params)
        .fetch_optional(&mut *connection)
        .await?;

    row.as_ref().map(Category::try_from).transpose()
}

/// Deletes the category. The foreign key sets `category_id` of its
/// resources to NULL.
pub async fn delete(connection: &mut PgConnection, id: CategoryId) -> Result<bool, RepositoryError> {
    let sql = format!(
        "DELETE FROM \"{}\" WHERE \"{}\" = $1",
        CATEGORIES_TABLE, ID_FIELD_NAME
    );
    let result = sqlx::query(&sql).bind(id.0).execute(&mut *connection).await?;
    Ok(result.rows_affected() > 0)
}
