use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::providers::food::FoodItem;
use crate::providers::movies::MAX_PAGE;
use crate::providers::music::{MusicQuery, MusicRequest, TrackRecommendation};
use crate::server::server::AppState;

const FOOD_NOT_FOUND: &str = "Food item not found";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    pub page: Option<u32>,
}

pub async fn popular_movies(
    State(state): State<AppState>,
    query: Result<Query<MoviesQuery>, QueryRejection>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let Query(query) = query?;
    let page = query.page.unwrap_or(1);
    if page == 0 || page > MAX_PAGE {
        return Err(ApiError::BadRequest(format!("page must be in 1..={}", MAX_PAGE)));
    }
    Ok(Json(state.movies.popular(page).await?))
}

pub async fn recommend_music(
    State(state): State<AppState>,
    request: Result<Json<MusicRequest>, JsonRejection>,
) -> Result<Json<Vec<TrackRecommendation>>, ApiError> {
    let Json(request) = request?;
    let query = MusicQuery::from_request(request);
    let tracks = state.music.recommend(&query).await?;
    info!(mood = %query.mood, genre = %query.genre, tracks = tracks.len(), "music recommended");
    Ok(Json(tracks))
}

pub async fn all_foods(State(state): State<AppState>) -> Json<Vec<FoodItem>> {
    Json(state.food.find_all().await)
}

pub async fn compare_food(
    State(state): State<AppState>,
    Path(item): Path<String>,
) -> Result<Json<BTreeMap<String, u32>>, ApiError> {
    state
        .food
        .find_by_name(&item)
        .await
        .map(|food| Json(food.prices))
        .ok_or_else(|| ApiError::NotFound(FOOD_NOT_FOUND.to_owned()))
}
