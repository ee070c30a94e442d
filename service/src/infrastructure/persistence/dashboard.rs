use futures::TryStreamExt;
use hub_common::{CATEGORIES_TABLE, RESOURCES_TABLE, ResourceStatus, STATUS_FIELD_NAME, TAGS_TABLE};
use sqlx::{PgConnection, Row};
use tracing::debug;

use crate::{
    domain::{
        dashboard::{Dashboard, StatusCounts},
        repository::RepositoryError,
        resource::ResourceQuery,
    },
    infrastructure::persistence::resources,
};

/// Read-only rollup; each statement sees the latest committed data.
pub async fn load(connection: &mut PgConnection, recent_limit: i64) -> Result<Dashboard, RepositoryError> {
    let by_status = format!(
        "SELECT \"{status}\", COUNT(*) AS \"count\" FROM \"{table}\" GROUP BY \"{status}\"",
        status = STATUS_FIELD_NAME,
        table = RESOURCES_TABLE,
    );
    debug!(sql = %by_status, "count resources by status");

    let mut counts = StatusCounts::default();
    {
        let mut rows = sqlx::query(&by_status).fetch(&mut *connection);
        while let Some(row) = rows.try_next().await? {
            let status: String = row.try_get(STATUS_FIELD_NAME)?;
            let status: ResourceStatus = status
                .parse()
                .map_err(|e| RepositoryError::Database(format!("{}", e)))?;
            counts.add(status, row.try_get("count")?);
        }
    }

    let totals = format!(
        "SELECT (SELECT COUNT(*) FROM \"{}\") AS \"categories\", (SELECT COUNT(*) FROM \"{}\") AS \"tags\"",
        CATEGORIES_TABLE, TAGS_TABLE
    );
    let row = sqlx::query(&totals).fetch_one(&mut *connection).await?;
    let total_categories: i64 = row.try_get("categories")?;
    let total_tags: i64 = row.try_get("tags")?;

    let recent = ResourceQuery {
        limit: recent_limit,
        ..Default::default()
    };
    let recent_resources = resources::list(connection, &recent).await?;

    Ok(Dashboard {
        resources_by_status: counts,
        total_resources: counts.total(),
        total_categories,
        total_tags,
        recent_resources,
    })
}
