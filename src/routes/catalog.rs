use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::catalog::{self, CatalogError, TableWithChairs};
use crate::database::{get_connection, queries};
use crate::domain::TableType;
use crate::models::{
    Branch, BranchChanges, DiningTable, DiningTableChanges, Food, FoodEntry, NewBranch,
};
use crate::routes::Acknowledgement;
use crate::startup::ApplicationState;

pub async fn list_branches(
    State(app_state): State<ApplicationState>,
) -> Result<Json<Vec<Branch>>, CatalogError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    Ok(Json(queries::get_branches(&mut connection).await?))
}

#[tracing::instrument(name = "Adding a branch", skip(app_state, branch), fields(name = %branch.name))]
pub async fn create_branch(
    State(app_state): State<ApplicationState>,
    Json(branch): Json<NewBranch>,
) -> Result<(StatusCode, Json<Branch>), CatalogError> {
    if branch.name.trim().is_empty() || branch.location.trim().is_empty() {
        return Err(CatalogError::Validation(
            "Branch name and location are required.".into(),
        ));
    }
    let mut connection = get_connection(&app_state.database_pool).await?;
    let branch = queries::insert_branch(&mut connection, &branch).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

/// Partial update of the branch details. Images are not handled here.
#[tracing::instrument(name = "Updating a branch", skip(app_state, changes))]
pub async fn update_branch(
    State(app_state): State<ApplicationState>,
    Path(id): Path<i32>,
    Json(changes): Json<BranchChanges>,
) -> Result<Json<Branch>, CatalogError> {
    if changes.name.is_none()
        && changes.location.is_none()
        && changes.contact.is_none()
        && changes.description.is_none()
    {
        return Err(CatalogError::Validation("Nothing to update.".into()));
    }
    let blank = |field: &Option<String>| {
        field.as_deref().is_some_and(|value| value.trim().is_empty())
    };
    if blank(&changes.name) || blank(&changes.location) {
        return Err(CatalogError::Validation(
            "Branch name and location cannot be empty.".into(),
        ));
    }
    let mut connection = get_connection(&app_state.database_pool).await?;
    queries::update_branch(&mut connection, id, &changes)
        .await?
        .map(Json)
        .ok_or(CatalogError::NotFound("Branch"))
}

/// Tables, chairs and bookings of the branch go with it.
#[tracing::instrument(name = "Deleting a branch", skip(app_state))]
pub async fn delete_branch(
    State(app_state): State<ApplicationState>,
    Path(id): Path<i32>,
) -> Result<Json<Acknowledgement>, CatalogError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    match queries::delete_branch(&mut connection, id).await? {
        0 => Err(CatalogError::NotFound("Branch")),
        _ => Ok(Acknowledgement::ok()),
    }
}

pub async fn branch_tables(
    State(app_state): State<ApplicationState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<TableWithChairs>>, CatalogError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    Ok(Json(catalog::branch_tables(&mut connection, id).await?))
}

#[derive(serde::Deserialize, Debug)]
pub struct NewTableRequest {
    branch_id: i32,
    table_name: String,
    table_type: String,
    price_cents: i64,
}

pub async fn create_table(
    State(app_state): State<ApplicationState>,
    Json(request): Json<NewTableRequest>,
) -> Result<(StatusCode, Json<TableWithChairs>), CatalogError> {
    let table_type =
        TableType::try_from(request.table_type).map_err(CatalogError::Validation)?;
    let mut connection = get_connection(&app_state.database_pool).await?;
    let table = catalog::create_table(
        &mut connection,
        request.branch_id,
        &request.table_name,
        table_type,
        request.price_cents,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(table)))
}

pub async fn update_table(
    State(app_state): State<ApplicationState>,
    Path(id): Path<i32>,
    Json(changes): Json<DiningTableChanges>,
) -> Result<Json<DiningTable>, CatalogError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    Ok(Json(catalog::update_table(&mut connection, id, &changes).await?))
}

pub async fn delete_table(
    State(app_state): State<ApplicationState>,
    Path(id): Path<i32>,
) -> Result<Json<Acknowledgement>, CatalogError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    catalog::delete_table(&mut connection, id).await?;
    Ok(Acknowledgement::ok())
}

pub async fn list_foods(
    State(app_state): State<ApplicationState>,
) -> Result<Json<Vec<Food>>, CatalogError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    Ok(Json(queries::get_foods(&mut connection).await?))
}

fn check_food(food: &FoodEntry) -> Result<(), CatalogError> {
    if food.name.trim().is_empty() {
        return Err(CatalogError::Validation("Food name is empty.".into()));
    }
    if food.price_cents < 0 {
        return Err(CatalogError::Validation("Price cannot be negative.".into()));
    }
    Ok(())
}

#[tracing::instrument(name = "Adding a food item", skip(app_state, food), fields(name = %food.name))]
pub async fn create_food(
    State(app_state): State<ApplicationState>,
    Json(food): Json<FoodEntry>,
) -> Result<(StatusCode, Json<Food>), CatalogError> {
    check_food(&food)?;
    let mut connection = get_connection(&app_state.database_pool).await?;
    let food = queries::insert_food(&mut connection, &food).await?;
    Ok((StatusCode::CREATED, Json(food)))
}

pub async fn update_food(
    State(app_state): State<ApplicationState>,
    Path(id): Path<i32>,
    Json(food): Json<FoodEntry>,
) -> Result<Json<Food>, CatalogError> {
    check_food(&food)?;
    let mut connection = get_connection(&app_state.database_pool).await?;
    queries::update_food(&mut connection, id, &food)
        .await?
        .map(Json)
        .ok_or(CatalogError::NotFound("Food"))
}

pub async fn delete_food(
    State(app_state): State<ApplicationState>,
    Path(id): Path<i32>,
) -> Result<Json<Acknowledgement>, CatalogError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    match queries::delete_food(&mut connection, id).await? {
        0 => Err(CatalogError::NotFound("Food")),
        _ => Ok(Acknowledgement::ok()),
    }
}
