use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use serde::Serialize;

use crate::database::{queries, ConnectionUnavailable};
use crate::domain::{chair_sequence, TableType};
use crate::models::{DiningTable, DiningTableChanges, NewChair, NewDiningTable};
use crate::utils::{error_response, foreign_key_violation, retryable_response};

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("A database error occurred while updating the catalog.")]
    DatabaseError(#[from] diesel::result::Error),
    #[error(transparent)]
    ConnectionUnavailable(#[from] ConnectionUnavailable),
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        tracing::error!("{} Reason: {:?}", self, self);
        let status = match &self {
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::ConnectionUnavailable(e) => {
                return retryable_response(e.to_string())
            }
            CatalogError::DatabaseError(_) => {
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                )
            }
        };
        error_response(status, self.to_string())
    }
}

#[derive(Serialize, Debug)]
pub struct TableWithChairs {
    #[serde(flatten)]
    pub table: DiningTable,
    pub chairs: Vec<String>,
}

/// Creates a table and its chairs. Chair numbers continue from the highest
/// number used by any table, so `C17` follows `C16` wherever it sits.
#[tracing::instrument(name = "Creating table", skip(connection))]
pub async fn create_table(
    connection: &mut AsyncPgConnection,
    branch_id: i32,
    table_name: &str,
    table_type: TableType,
    price_cents: i64,
) -> Result<TableWithChairs, CatalogError> {
    if table_name.trim().is_empty() {
        return Err(CatalogError::Validation("Table name is empty.".into()));
    }
    if price_cents < 0 {
        return Err(CatalogError::Validation("Price cannot be negative.".into()));
    }
    connection
        .transaction::<_, CatalogError, _>(|conn| {
            async move {
                let new_table = NewDiningTable {
                    branch_id,
                    table_name: table_name.trim(),
                    table_type: table_type.as_str(),
                    chair_count: table_type.chair_count(),
                    price_cents,
                    booked: false,
                };
                let table = queries::insert_table(conn, &new_table)
                    .await
                    .map_err(|e| match foreign_key_violation(&e) {
                        Some(_) => CatalogError::NotFound("Branch"),
                        None => CatalogError::DatabaseError(e),
                    })?;
                queries::lock_chairs(conn).await?;
                let last = queries::last_chair_number(conn).await?;
                let new_chairs: Vec<NewChair> =
                    chair_sequence(last, table.chair_count)
                        .map(|(chair_number, chair_name)| NewChair {
                            table_id: table.id,
                            chair_number,
                            chair_name,
                        })
                        .collect();
                queries::insert_chairs(conn, &new_chairs).await?;
                tracing::info!(
                    table_id = table.id,
                    first_chair = last + 1,
                    "Table and chairs added."
                );
                Ok(TableWithChairs {
                    table,
                    chairs: new_chairs.into_iter().map(|c| c.chair_name).collect(),
                })
            }
            .scope_boxed()
        })
        .await
}

/// Chairs go first so the table never leaves orphans behind, even where the
/// foreign key cascade is missing.
#[tracing::instrument(name = "Deleting table", skip(connection))]
pub async fn delete_table(
    connection: &mut AsyncPgConnection,
    table_id: i32,
) -> Result<(), CatalogError> {
    connection
        .transaction::<_, CatalogError, _>(|conn| {
            async move {
                queries::delete_table_chairs(conn, table_id).await?;
                match queries::delete_table(conn, table_id).await? {
                    0 => Err(CatalogError::NotFound("Table")),
                    _ => Ok(()),
                }
            }
            .scope_boxed()
        })
        .await
}

#[tracing::instrument(name = "Updating table", skip(connection, changes))]
pub async fn update_table(
    connection: &mut AsyncPgConnection,
    table_id: i32,
    changes: &DiningTableChanges,
) -> Result<DiningTable, CatalogError> {
    if changes.table_name.is_none() && changes.price_cents.is_none() {
        return Err(CatalogError::Validation("Nothing to update.".into()));
    }
    if changes
        .table_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(CatalogError::Validation("Table name is empty.".into()));
    }
    if changes.price_cents.is_some_and(|price| price < 0) {
        return Err(CatalogError::Validation("Price cannot be negative.".into()));
    }
    queries::update_table(connection, table_id, changes)
        .await?
        .ok_or(CatalogError::NotFound("Table"))
}

pub async fn branch_tables(
    connection: &mut AsyncPgConnection,
    branch_id: i32,
) -> Result<Vec<TableWithChairs>, CatalogError> {
    let tables = queries::get_branch_tables(connection, branch_id).await?;
    let ids: Vec<i32> = tables.iter().map(|t| t.id).collect();
    let chairs = queries::get_chairs_for_tables(connection, &ids).await?;
    Ok(tables
        .into_iter()
        .map(|table| {
            let chairs = chairs
                .iter()
                .filter(|c| c.table_id == table.id)
                .map(|c| c.chair_name.clone())
                .collect();
            TableWithChairs { table, chairs }
        })
        .collect())
}
