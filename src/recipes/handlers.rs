use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    state::AppState,
};

use super::dto::{ListQuery, RecipeBody, RecipeOut, RecipePage};
use super::policy::{self, Operation};
use super::repo::{search_pattern, Recipe};

/// Fixed page size of the list endpoint.
pub const PAGE_SIZE: i64 = 10;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

fn total_pages(count: i64) -> i64 {
    ((count + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
}

/// The first page is always valid, even for an empty result set.
fn check_page(page: i64, total_pages: i64) -> Result<(), ApiError> {
    if page < 1 || page > total_pages {
        return Err(ApiError::InvalidPage);
    }
    Ok(())
}

fn page_link(search: Option<&str>, page: i64) -> String {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => format!("/recipes?page={page}&search={}", urlencoding::encode(s)),
        None => format!("/recipes?page={page}"),
    }
}

/// Links to the neighbouring pages, None at either edge.
fn page_links(
    search: Option<&str>,
    page: i64,
    total_pages: i64,
) -> (Option<String>, Option<String>) {
    let next = (page < total_pages).then(|| page_link(search, page + 1));
    let previous = (page > 1).then(|| page_link(search, page - 1));
    (next, previous)
}

/// GET /recipes — every authenticated identity sees all recipes, ordered
/// by title, ten per page. `search` filters by case-insensitive substring
/// on title OR ingredients.
#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<RecipePage>, ApiError> {
    let page = q.page()?;
    let pattern = search_pattern(q.search.as_deref());

    let count = Recipe::count(&state.db, pattern.as_deref()).await?;
    let pages = total_pages(count);
    check_page(page, pages)?;

    let offset = (page - 1) * PAGE_SIZE;
    let rows = Recipe::page(&state.db, pattern.as_deref(), PAGE_SIZE, offset).await?;
    let (next, previous) = page_links(q.search.as_deref(), page, pages);

    Ok(Json(RecipePage {
        count,
        next,
        previous,
        results: rows.into_iter().map(RecipeOut::from).collect(),
    }))
}

/// POST /recipes — the owner is always the authenticated caller; the body
/// cannot set or override it.
#[instrument(skip(state, body))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<RecipeBody>,
) -> Result<(StatusCode, Json<RecipeOut>), ApiError> {
    let new = body.validate()?;
    let recipe = Recipe::create(&state.db, user_id, &new).await?;
    info!(recipe_id = %recipe.id, user_id = %user_id, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// GET /recipes/:id — readable by any authenticated identity.
#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeOut>, ApiError> {
    let recipe = Recipe::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    policy::check(Operation::Read, user_id, recipe.created_by)?;
    Ok(Json(recipe.into()))
}

/// PUT /recipes/:id — full replacement of the mutable fields, owner only.
#[instrument(skip(state, body))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RecipeBody>,
) -> Result<Json<RecipeOut>, ApiError> {
    let recipe = Recipe::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    policy::check(Operation::Write, user_id, recipe.created_by)?;

    let new = body.validate()?;
    let updated = Recipe::update(&state.db, id, &new).await?;
    info!(recipe_id = %id, user_id = %user_id, "recipe updated");
    Ok(Json(updated.into()))
}

/// DELETE /recipes/:id — owner only; removes just this row.
#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let recipe = Recipe::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    policy::check(Operation::Write, user_id, recipe.created_by)?;

    Recipe::delete(&state.db, id).await?;
    info!(recipe_id = %id, user_id = %user_id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_recipes_paginate_into_two_pages() {
        let pages = total_pages(20);
        assert_eq!(pages, 2);

        let (next, previous) = page_links(None, 1, pages);
        assert_eq!(next.as_deref(), Some("/recipes?page=2"));
        assert_eq!(previous, None);

        let (next, previous) = page_links(None, 2, pages);
        assert_eq!(next, None);
        assert_eq!(previous.as_deref(), Some("/recipes?page=1"));
    }

    #[test]
    fn pages_outside_the_range_are_rejected() {
        assert!(matches!(check_page(0, 2), Err(ApiError::InvalidPage)));
        assert!(matches!(check_page(-1, 2), Err(ApiError::InvalidPage)));
        assert!(matches!(check_page(3, 2), Err(ApiError::InvalidPage)));
        assert!(check_page(1, 2).is_ok());
        assert!(check_page(2, 2).is_ok());
    }

    #[test]
    fn first_page_of_an_empty_set_is_valid() {
        let pages = total_pages(0);
        assert_eq!(pages, 1);
        assert!(check_page(1, pages).is_ok());
        assert!(matches!(check_page(2, pages), Err(ApiError::InvalidPage)));
    }

    #[test]
    fn single_page_has_no_links() {
        let (next, previous) = page_links(None, 1, 1);
        assert_eq!(next, None);
        assert_eq!(previous, None);
    }

    #[test]
    fn links_carry_the_encoded_search_term() {
        let (next, previous) = page_links(Some("bell peppers"), 2, 3);
        assert_eq!(next.as_deref(), Some("/recipes?page=3&search=bell%20peppers"));
        assert_eq!(
            previous.as_deref(),
            Some("/recipes?page=1&search=bell%20peppers")
        );
    }

    #[test]
    fn empty_store_still_has_one_valid_page() {
        let (next, previous) = page_links(None, 1, total_pages(0));
        assert_eq!(next, None);
        assert_eq!(previous, None);
    }
}
