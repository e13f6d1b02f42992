use crate::models::{
    Branch, BranchChanges, Chair, DiningTable, DiningTableChanges, Food,
    FoodEntry, NewBranch, NewChair, NewDiningTable,
};
use crate::schema::{branches, chairs, foods, tables};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

#[tracing::instrument(name = "Inserting branch.", skip(connection, branch))]
pub async fn insert_branch(
    connection: &mut AsyncPgConnection,
    branch: &NewBranch,
) -> Result<Branch, diesel::result::Error> {
    diesel::insert_into(branches::table)
        .values(branch)
        .returning(Branch::as_returning())
        .get_result(connection)
        .await
}

#[tracing::instrument(name = "Updating branch.", skip(connection, changes))]
pub async fn update_branch(
    connection: &mut AsyncPgConnection,
    id: i32,
    changes: &BranchChanges,
) -> Result<Option<Branch>, diesel::result::Error> {
    diesel::update(branches::table.find(id))
        .set(changes)
        .returning(Branch::as_returning())
        .get_result(connection)
        .await
        .optional()
}

#[tracing::instrument(name = "Listing branches.", skip(connection))]
pub async fn get_branches(
    connection: &mut AsyncPgConnection,
) -> Result<Vec<Branch>, diesel::result::Error> {
    branches::table
        .order(branches::id)
        .select(Branch::as_select())
        .load(connection)
        .await
}

#[tracing::instrument(name = "Deleting branch.", skip(connection))]
pub async fn delete_branch(
    connection: &mut AsyncPgConnection,
    id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(branches::table.find(id))
        .execute(connection)
        .await
}

#[tracing::instrument(name = "Inserting table.", skip(connection, table))]
pub async fn insert_table(
    connection: &mut AsyncPgConnection,
    table: &NewDiningTable<'_>,
) -> Result<DiningTable, diesel::result::Error> {
    diesel::insert_into(tables::table)
        .values(table)
        .returning(DiningTable::as_returning())
        .get_result(connection)
        .await
}

#[tracing::instrument(name = "Looking up table.", skip(connection))]
pub async fn find_table(
    connection: &mut AsyncPgConnection,
    id: i32,
) -> Result<Option<DiningTable>, diesel::result::Error> {
    tables::table
        .find(id)
        .select(DiningTable::as_select())
        .first(connection)
        .await
        .optional()
}

#[tracing::instrument(name = "Listing tables of a branch.", skip(connection))]
pub async fn get_branch_tables(
    connection: &mut AsyncPgConnection,
    branch_id: i32,
) -> Result<Vec<DiningTable>, diesel::result::Error> {
    tables::table
        .filter(tables::branch_id.eq(branch_id))
        .order(tables::id)
        .select(DiningTable::as_select())
        .load(connection)
        .await
}

#[tracing::instrument(name = "Updating table.", skip(connection, changes))]
pub async fn update_table(
    connection: &mut AsyncPgConnection,
    id: i32,
    changes: &DiningTableChanges,
) -> Result<Option<DiningTable>, diesel::result::Error> {
    diesel::update(tables::table.find(id))
        .set(changes)
        .returning(DiningTable::as_returning())
        .get_result(connection)
        .await
        .optional()
}

#[tracing::instrument(name = "Deleting table.", skip(connection))]
pub async fn delete_table(
    connection: &mut AsyncPgConnection,
    id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(tables::table.find(id))
        .execute(connection)
        .await
}

/// Serializes chair numbering across concurrent table creations. Only valid
/// inside a transaction; the lock is released on commit or rollback.
#[tracing::instrument(name = "Locking chair numbering.", skip(connection))]
pub async fn lock_chairs(
    connection: &mut AsyncPgConnection,
) -> Result<(), diesel::result::Error> {
    diesel::sql_query("LOCK TABLE chairs IN EXCLUSIVE MODE")
        .execute(connection)
        .await?;
    Ok(())
}

#[tracing::instrument(name = "Reading highest chair number.", skip(connection))]
pub async fn last_chair_number(
    connection: &mut AsyncPgConnection,
) -> Result<i32, diesel::result::Error> {
    let last: Option<i32> = chairs::table
        .select(max(chairs::chair_number))
        .first(connection)
        .await?;
    Ok(last.unwrap_or(0))
}

#[tracing::instrument(name = "Inserting chairs.", skip(connection, new_chairs))]
pub async fn insert_chairs(
    connection: &mut AsyncPgConnection,
    new_chairs: &[NewChair],
) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(chairs::table)
        .values(new_chairs)
        .execute(connection)
        .await
}

#[tracing::instrument(name = "Listing chairs of tables.", skip(connection, table_ids))]
pub async fn get_chairs_for_tables(
    connection: &mut AsyncPgConnection,
    table_ids: &[i32],
) -> Result<Vec<Chair>, diesel::result::Error> {
    chairs::table
        .filter(chairs::table_id.eq_any(table_ids))
        .order(chairs::chair_number)
        .select(Chair::as_select())
        .load(connection)
        .await
}

#[tracing::instrument(name = "Deleting chairs of table.", skip(connection))]
pub async fn delete_table_chairs(
    connection: &mut AsyncPgConnection,
    table_id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(chairs::table.filter(chairs::table_id.eq(table_id)))
        .execute(connection)
        .await
}

#[tracing::instrument(name = "Inserting food.", skip(connection, food))]
pub async fn insert_food(
    connection: &mut AsyncPgConnection,
    food: &FoodEntry,
) -> Result<Food, diesel::result::Error> {
    diesel::insert_into(foods::table)
        .values(food)
        .returning(Food::as_returning())
        .get_result(connection)
        .await
}

#[tracing::instrument(name = "Listing foods.", skip(connection))]
pub async fn get_foods(
    connection: &mut AsyncPgConnection,
) -> Result<Vec<Food>, diesel::result::Error> {
    foods::table
        .order(foods::id)
        .select(Food::as_select())
        .load(connection)
        .await
}

#[tracing::instrument(name = "Looking up food prices.", skip(connection, ids))]
pub async fn get_food_prices(
    connection: &mut AsyncPgConnection,
    ids: &[i32],
) -> Result<Vec<(i32, i64)>, diesel::result::Error> {
    foods::table
        .filter(foods::id.eq_any(ids))
        .select((foods::id, foods::price_cents))
        .load(connection)
        .await
}

#[tracing::instrument(name = "Updating food.", skip(connection, food))]
pub async fn update_food(
    connection: &mut AsyncPgConnection,
    id: i32,
    food: &FoodEntry,
) -> Result<Option<Food>, diesel::result::Error> {
    diesel::update(foods::table.find(id))
        .set(food)
        .returning(Food::as_returning())
        .get_result(connection)
        .await
        .optional()
}

#[tracing::instrument(name = "Deleting food.", skip(connection))]
pub async fn delete_food(
    connection: &mut AsyncPgConnection,
    id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(foods::table.find(id))
        .execute(connection)
        .await
}
