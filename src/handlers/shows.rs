use axum::extract::State;
use axum::response::Response;
use uuid::Uuid;

use crate::models::{NewShow, ShowChanges, ShowFilter};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{AppJson, AppPath, AppQuery};
use crate::utils::response::{created, empty_success, success};

pub async fn list_shows(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ShowFilter>,
) -> Result<Response, AppError> {
    let shows = state.shows.list(&filter).await?;
    Ok(success(shows, "Shows retrieved"))
}

pub async fn get_show(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let show = state.shows.get(id).await?;
    Ok(success(show, "Show retrieved"))
}

pub async fn create_show(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewShow>,
) -> Result<Response, AppError> {
    let show = state.shows.create(body).await?;
    Ok(created(show, "Show created"))
}

pub async fn update_show(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<ShowChanges>,
) -> Result<Response, AppError> {
    let show = state.shows.update(id, body).await?;
    Ok(success(show, "Show updated"))
}

pub async fn delete_show(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    state.shows.deactivate(id).await?;
    Ok(empty_success("Show deleted"))
}
