use std::borrow::Cow;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use hub_common::{
    APPROVED_FIELD_NAME, CATEGORIES_TABLE, CATEGORY_ID_FIELD_NAME, CREATED_FIELD_NAME,
    DESCRIPTION_FIELD_NAME, ID_FIELD_NAME, NAME_FIELD_NAME, RESOURCE_ID_FIELD_NAME,
    RESOURCE_TAGS_TABLE, RESOURCE_TYPE_FIELD_NAME, RESOURCES_TABLE, ResourceStatus, ResourceUrl,
    STATUS_FIELD_NAME, SUBMITTED_BY_FIELD_NAME, TAG_ID_FIELD_NAME, TAGS_TABLE, TITLE_FIELD_NAME,
    URL_FIELD_NAME, VOTE_SCORE_FIELD_NAME,
};
use sqlx::{PgConnection, Row, postgres::PgRow};
use tracing::debug;

use crate::{
    domain::{
        category::CategoryId,
        repository::RepositoryError,
        resource::{FieldUpdate, NewResource, Resource, ResourceChanges, ResourceId, ResourceQuery},
    },
    infrastructure::persistence::{
        query::{
            Condition, Join, JoinType, QueryBuilder, SelectItem, SortDirection, SqlParameter,
            UpdateBuilder, bind_all,
        },
        schema::Table,
    },
};

const RESOURCE: Table<'static> = Table {
    name: RESOURCES_TABLE,
    alias: "r",
};
const CATEGORY: Table<'static> = Table {
    name: CATEGORIES_TABLE,
    alias: "c",
};
const RESOURCE_TAG: Table<'static> = Table {
    name: RESOURCE_TAGS_TABLE,
    alias: "rt",
};
const TAG: Table<'static> = Table {
    name: TAGS_TABLE,
    alias: "t",
};

const CATEGORY_NAME_ALIAS: &str = "category_name";
const TAGS_ALIAS: &str = "tags";

const RESOURCE_COLUMNS: [&str; 11] = [
    ID_FIELD_NAME,
    TITLE_FIELD_NAME,
    DESCRIPTION_FIELD_NAME,
    URL_FIELD_NAME,
    RESOURCE_TYPE_FIELD_NAME,
    CATEGORY_ID_FIELD_NAME,
    STATUS_FIELD_NAME,
    VOTE_SCORE_FIELD_NAME,
    SUBMITTED_BY_FIELD_NAME,
    CREATED_FIELD_NAME,
    APPROVED_FIELD_NAME,
];

/// Tag names of the group, sorted, as a TEXT[] that is empty rather than NULL
fn tag_names_expression() -> String {
    let name = TAG.column(NAME_FIELD_NAME).qualified();
    format!(
        "COALESCE(array_agg({name}::TEXT ORDER BY {name}) FILTER (WHERE {} IS NOT NULL), '{{}}'::TEXT[])",
        TAG.column(ID_FIELD_NAME).qualified()
    )
}

/// Resources joined with their category name and aggregated tag names
fn select_resources() -> QueryBuilder<'static> {
    let mut items: Vec<SelectItem> = RESOURCE_COLUMNS
        .into_iter()
        .map(|name| SelectItem::Column(Cow::Owned(RESOURCE.column(name))))
        .collect();
    items.push(SelectItem::Expression {
        expression: CATEGORY.column(NAME_FIELD_NAME).qualified(),
        alias: CATEGORY_NAME_ALIAS,
    });
    items.push(SelectItem::Expression {
        expression: tag_names_expression(),
        alias: TAGS_ALIAS,
    });

    QueryBuilder::from(RESOURCE)
        .select(items)
        .join(Join {
            join_type: JoinType::Left,
            target_table: CATEGORY,
            main_column: Cow::Owned(RESOURCE.column(CATEGORY_ID_FIELD_NAME)),
            target_column: Cow::Owned(CATEGORY.column(ID_FIELD_NAME)),
        })
        .join(Join {
            join_type: JoinType::Left,
            target_table: RESOURCE_TAG,
            main_column: Cow::Owned(RESOURCE.column(ID_FIELD_NAME)),
            target_column: Cow::Owned(RESOURCE_TAG.column(RESOURCE_ID_FIELD_NAME)),
        })
        .join(Join {
            join_type: JoinType::Left,
            target_table: TAG,
            main_column: Cow::Owned(RESOURCE_TAG.column(TAG_ID_FIELD_NAME)),
            target_column: Cow::Owned(TAG.column(ID_FIELD_NAME)),
        })
        .group_by(vec![
            Cow::Owned(RESOURCE.column(ID_FIELD_NAME)),
            Cow::Owned(CATEGORY.column(NAME_FIELD_NAME)),
        ])
}

fn list_query(query: &ResourceQuery) -> (String, Vec<SqlParameter>) {
    let mut builder = select_resources();

    if let Some(status) = query.status {
        builder = builder.where_condition(Condition::Equals {
            column: Cow::Owned(RESOURCE.column(STATUS_FIELD_NAME)),
            value: SqlParameter::Text(status.to_string()),
        });
    }
    if let Some(category_id) = query.category_id {
        builder = builder.where_condition(Condition::Equals {
            column: Cow::Owned(RESOURCE.column(CATEGORY_ID_FIELD_NAME)),
            value: SqlParameter::Integer(category_id.0),
        });
    }
    // Filtering after grouping keeps every tag of a matching resource.
    if let Some(tag) = &query.tag {
        builder = builder.having(Condition::AnyEquals {
            expression: format!("array_agg({}::TEXT)", TAG.column(NAME_FIELD_NAME).qualified()),
            value: SqlParameter::Text(tag.to_string()),
        });
    }

    builder
        .order_by(Cow::Owned(RESOURCE.column(CREATED_FIELD_NAME)), SortDirection::Descending)
        .order_by(Cow::Owned(RESOURCE.column(ID_FIELD_NAME)), SortDirection::Descending)
        .limit(query.limit)
        .offset(query.offset)
        .build()
}

impl TryFrom<&PgRow> for Resource {
    type Error = RepositoryError;

    fn try_from(row: &PgRow) -> Result<Self, Self::Error> {
        let resource_type: String = row.try_get(RESOURCE_TYPE_FIELD_NAME)?;
        let status: String = row.try_get(STATUS_FIELD_NAME)?;
        let category_id: Option<i64> = row.try_get(CATEGORY_ID_FIELD_NAME)?;
        let created_at: DateTime<Utc> = row.try_get(CREATED_FIELD_NAME)?;
        let approved_at: Option<DateTime<Utc>> = row.try_get(APPROVED_FIELD_NAME)?;

        Ok(Resource {
            id: ResourceId(row.try_get(ID_FIELD_NAME)?),
            title: row.try_get(TITLE_FIELD_NAME)?,
            description: row.try_get(DESCRIPTION_FIELD_NAME)?,
            url: row.try_get(URL_FIELD_NAME)?,
            resource_type: resource_type
                .parse()
                .map_err(|e| RepositoryError::Database(format!("{}", e)))?,
            category_id: category_id.map(CategoryId),
            category_name: row.try_get(CATEGORY_NAME_ALIAS)?,
            status: status
                .parse()
                .map_err(|e| RepositoryError::Database(format!("{}", e)))?,
            vote_score: row.try_get(VOTE_SCORE_FIELD_NAME)?,
            submitted_by: row.try_get(SUBMITTED_BY_FIELD_NAME)?,
            created_at,
            approved_at,
            tags: row.try_get(TAGS_ALIAS)?,
        })
    }
}

pub async fn find(
    connection: &mut PgConnection,
    id: ResourceId,
) -> Result<Option<Resource>, RepositoryError> {
    let (sql, params) = select_resources()
        .where_condition(Condition::Equals {
            column: Cow::Owned(RESOURCE.column(ID_FIELD_NAME)),
            value: SqlParameter::Integer(id.0),
        })
        .build();
    debug!(%sql, "find resource");

    let row = bind_all(sqlx::query(&sql), params)
        .fetch_optional(&mut *connection)
        .await?;

    row.as_ref().map(Resource::try_from).transpose()
}

pub async fn list(
    connection: &mut PgConnection,
    query: &ResourceQuery,
) -> Result<Vec<Resource>, RepositoryError> {
    let (sql, params) = list_query(query);
    debug!(%sql, "list resources");

    let mut rows = bind_all(sqlx::query(&sql), params).fetch(&mut *connection);

    let mut resources = Vec::new();
    while let Some(row) = rows.try_next().await? {
        resources.push(Resource::try_from(&row)?);
    }
    Ok(resources)
}

/// Inserts a new resource. The status column is always written as pending.
pub async fn create(
    connection: &mut PgConnection,
    resource: &NewResource,
) -> Result<ResourceId, RepositoryError> {
    let sql = format!(
        "INSERT INTO \"{}\" (\"{}\", \"{}\", \"{}\", \"{}\", \"{}\", \"{}\", \"{}\") \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING \"{}\"",
        RESOURCES_TABLE,
        TITLE_FIELD_NAME,
        DESCRIPTION_FIELD_NAME,
        URL_FIELD_NAME,
        RESOURCE_TYPE_FIELD_NAME,
        CATEGORY_ID_FIELD_NAME,
        STATUS_FIELD_NAME,
        SUBMITTED_BY_FIELD_NAME,
        ID_FIELD_NAME
    );

    let id: i64 = sqlx::query_scalar(&sql)
        .bind(resource.title.to_string())
        .bind(resource.description.as_deref())
        .bind(resource.url.as_ref().map(ResourceUrl::to_string))
        .bind(resource.resource_type.as_str())
        .bind(resource.category_id.map(|id| id.0))
        .bind(ResourceStatus::Pending.as_str())
        .bind(resource.submitted_by.as_deref())
        .fetch_one(&mut *connection)
        .await?;

    Ok(ResourceId(id))
}

fn text(update: &FieldUpdate<String>) -> Option<SqlParameter> {
    update
        .as_assignment()
        .map(|value| SqlParameter::OptionalText(value.cloned()))
}

/// UPDATE for the changed columns only, `None` when there is nothing to write
fn update_statement(id: ResourceId, changes: &ResourceChanges) -> Option<(String, Vec<SqlParameter>)> {
    let mut builder = UpdateBuilder::table(RESOURCES_TABLE);

    if let Some(title) = &changes.title {
        builder = builder.set(TITLE_FIELD_NAME, SqlParameter::Text(title.to_string()));
    }
    if let Some(description) = text(&changes.description) {
        builder = builder.set(DESCRIPTION_FIELD_NAME, description);
    }
    if let Some(url) = text(&changes.url.clone().map(ResourceUrl::into_inner)) {
        builder = builder.set(URL_FIELD_NAME, url);
    }
    if let Some(resource_type) = changes.resource_type {
        builder = builder.set(
            RESOURCE_TYPE_FIELD_NAME,
            SqlParameter::Text(resource_type.to_string()),
        );
    }
    if let Some(category_id) = changes.category_id.as_assignment() {
        builder = builder.set(
            CATEGORY_ID_FIELD_NAME,
            SqlParameter::OptionalInteger(category_id.map(|id| id.0)),
        );
    }
    if let Some(submitted_by) = text(&changes.submitted_by) {
        builder = builder.set(SUBMITTED_BY_FIELD_NAME, submitted_by);
    }
    if let Some(status) = changes.status {
        builder = builder.set(STATUS_FIELD_NAME, SqlParameter::Text(status.to_string()));
        if status == ResourceStatus::Approved {
            builder = builder.set_expression(APPROVED_FIELD_NAME, "now()");
        }
    }

    builder
        .where_equals(ID_FIELD_NAME, SqlParameter::Integer(id.0))
        .returning(vec![ID_FIELD_NAME])
        .build()
}

pub async fn update(
    connection: &mut PgConnection,
    id: ResourceId,
    changes: &ResourceChanges,
) -> Result<Option<ResourceId>, RepositoryError> {
    let Some((sql, params)) = update_statement(id, changes) else {
        return Ok(None);
    };
    debug!(%sql, "update resource");

    let row = bind_all(sqlx::query(&sql), params)
        .fetch_optional(&mut *connection)
        .await?;

    Ok(row.map(|_| id))
}

pub async fn delete(connection: &mut PgConnection, id: ResourceId) -> Result<bool, RepositoryError> {
    let sql = format!(
        "DELETE FROM \"{}\" WHERE \"{}\" = $1",
        RESOURCES_TABLE, ID_FIELD_NAME
    );
    let result = sqlx::query(&sql).bind(id.0).execute(&mut *connection).await?;
    Ok(result.rows_affected() > 0)
}

/// Adds `delta` to the score in one statement, matching approved rows only.
pub async fn increment_vote(
    connection: &mut PgConnection,
    id: ResourceId,
    delta: i32,
) -> Result<Option<i32>, RepositoryError> {
    let sql = format!(
        "UPDATE \"{table}\" SET \"{score}\" = \"{score}\" + $1 WHERE \"{id}\" = $2 AND \"{status}\" = $3 RETURNING \"{score}\"",
        table = RESOURCES_TABLE,
        score = VOTE_SCORE_FIELD_NAME,
        id = ID_FIELD_NAME,
        status = STATUS_FIELD_NAME,
    );

    let score = sqlx::query_scalar(&sql)
        .bind(delta)
        .bind(id.0)
        .bind(ResourceStatus::Approved.as_str())
        .fetch_optional(&mut *connection)
        .await?;

    Ok(score)
}
