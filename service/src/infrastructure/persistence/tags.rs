use std::borrow::Cow;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use itertools::Itertools;
use hub_common::{
    CREATED_FIELD_NAME, ID_FIELD_NAME, NAME_FIELD_NAME, RESOURCE_ID_FIELD_NAME,
    RESOURCE_TAGS_TABLE, TAG_ID_FIELD_NAME, TAGS_TABLE, TagName,
};
use sqlx::{PgConnection, Row, postgres::PgRow};
use tracing::debug;

use crate::{
    domain::{
        repository::RepositoryError,
        resource::ResourceId,
        tag::{Tag, TagId},
    },
    infrastructure::persistence::{
        query::{Condition, Join, JoinType, QueryBuilder, SelectItem, SortDirection, SqlParameter, bind_all},
        schema::Table,
    },
};

const TAG: Table<'static> = Table {
    name: TAGS_TABLE,
    alias: "t",
};
const RESOURCE_TAG: Table<'static> = Table {
    name: RESOURCE_TAGS_TABLE,
    alias: "rt",
};

const RESOURCE_COUNT_ALIAS: &str = "resource_count";

/// Tags with the number of resources linked to each
fn select_tags() -> QueryBuilder<'static> {
    QueryBuilder::from(TAG)
        .select(vec![
            SelectItem::Column(Cow::Owned(TAG.column(ID_FIELD_NAME))),
            SelectItem::Column(Cow::Owned(TAG.column(NAME_FIELD_NAME))),
            SelectItem::Column(Cow::Owned(TAG.column(CREATED_FIELD_NAME))),
            SelectItem::Expression {
                expression: format!("COUNT({})", RESOURCE_TAG.column(RESOURCE_ID_FIELD_NAME).qualified()),
                alias: RESOURCE_COUNT_ALIAS,
            },
        ])
        .join(Join {
            join_type: JoinType::Left,
            target_table: RESOURCE_TAG,
            main_column: Cow::Owned(TAG.column(ID_FIELD_NAME)),
            target_column: Cow::Owned(RESOURCE_TAG.column(TAG_ID_FIELD_NAME)),
        })
        .group_by(vec![Cow::Owned(TAG.column(ID_FIELD_NAME))])
}

impl TryFrom<&PgRow> for Tag {
    type Error = RepositoryError;

    fn try_from(row: &PgRow) -> Result<Self, Self::Error> {
        let created_at: DateTime<Utc> = row.try_get(CREATED_FIELD_NAME)?;
        Ok(Tag {
            id: TagId(row.try_get(ID_FIELD_NAME)?),
            name: row.try_get(NAME_FIELD_NAME)?,
            created_at,
            resource_count: row.try_get(RESOURCE_COUNT_ALIAS)?,
        })
    }
}

/// Id of the tag with this canonical name, inserting it when missing.
///
/// Concurrent callers with the same new name converge on one row: the losing
/// insert waits for the winner, does nothing, and the select then sees the
/// committed row.
pub async fn ensure_tag(connection: &mut PgConnection, name: &TagName) -> Result<TagId, RepositoryError> {
    let insert = format!(
        "INSERT INTO \"{table}\" (\"{name}\") VALUES ($1) ON CONFLICT (\"{name}\") DO NOTHING",
        table = TAGS_TABLE,
        name = NAME_FIELD_NAME,
    );
    sqlx::query(&insert)
        .bind(name.to_string())
        .execute(&mut *connection)
        .await?;

    let select = format!(
        "SELECT \"{}\" FROM \"{}\" WHERE \"{}\" = $1",
        ID_FIELD_NAME, TAGS_TABLE, NAME_FIELD_NAME
    );
    let id: i64 = sqlx::query_scalar(&select)
        .bind(name.to_string())
        .fetch_one(&mut *connection)
        .await?;

    Ok(TagId(id))
}

/// Canonical name order. Every transaction inserts tags in this order, so two
/// writers with overlapping new tags wait on each other instead of deadlocking.
fn lock_order(tags: &[TagName]) -> Vec<&TagName> {
    tags.iter().sorted().dedup().collect()
}

/// Makes `tags` the exact tag set of the resource: drops every association,
/// then links each tag, ignoring a link that already exists.
///
/// Runs on the caller's transaction so a failure also restores the dropped
/// associations.
pub async fn replace_tags_for_resource(
    connection: &mut PgConnection,
    resource_id: ResourceId,
    tags: &[TagName],
) -> Result<(), RepositoryError> {
    let delete = format!(
        "DELETE FROM \"{}\" WHERE \"{}\" = $1",
        RESOURCE_TAGS_TABLE, RESOURCE_ID_FIELD_NAME
    );
    sqlx::query(&delete)
        .bind(resource_id.0)
        .execute(&mut *connection)
        .await?;

    let link = format!(
        "INSERT INTO \"{}\" (\"{}\", \"{}\") VALUES ($1, $2) ON CONFLICT DO NOTHING",
        RESOURCE_TAGS_TABLE, RESOURCE_ID_FIELD_NAME, TAG_ID_FIELD_NAME
    );
    for name in lock_order(tags) {
        let tag_id = ensure_tag(connection, name).await?;
        sqlx::query(&link)
            .bind(resource_id.0)
            .bind(tag_id.0)
            .execute(&mut *connection)
            .await?;
    }

    debug!(resource_id = %resource_id, tags = tags.len(), "tags replaced");
    Ok(())
}

pub async fn find(connection: &mut PgConnection, id: TagId) -> Result<Option<Tag>, RepositoryError> {
    let (sql, params) = select_tags()
        .where_condition(Condition::Equals {
            column: Cow::Owned(TAG.column(ID_FIELD_NAME)),
            value: SqlParameter::Integer(id.0),
        })
        .build();
    debug!(%sql, "find tag");

    let row = bind_all(sqlx::query(&sql), params)
        .fetch_optional(&mut *connection)
        .await?;

    row.as_ref().map(Tag::try_from).transpose()
}

pub async fn list(connection: &mut PgConnection) -> Result<Vec<Tag>, RepositoryError> {
    let (sql, params) = select_tags()
        .order_by(Cow::Owned(TAG.column(NAME_FIELD_NAME)), SortDirection::Ascending)
        .build();
    debug!(%sql, "list tags");

    let mut rows = bind_all(sqlx::query(&sql), params).fetch(&mut *connection);

    let mut tags = Vec::new();
    while let Some(row) = rows.try_next().await? {
        tags.push(Tag::try_from(&row)?);
    }
    Ok(tags)
}

/// Deletes the tag; its associations cascade.
pub async fn delete(connection: &mut PgConnection, id: TagId) -> Result<bool, RepositoryError> {
    let sql = format!("DELETE FROM \"{}\" WHERE \"{}\" = $1", TAGS_TABLE, ID_FIELD_NAME);
    let result = sqlx::query(&sql).bind(id.0).execute(&mut *connection).await?;
    Ok(result.rows_affected() > 0)
}
