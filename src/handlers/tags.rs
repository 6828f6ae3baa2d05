use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CreateTag, TagResponse, UpdateTag};
use crate::selection::TagState;
use crate::state::AppState;
use crate::widgets::IncludeExcludeControl;
use super::records::TAG_FILTER_FIELD;

pub async fn create_tag(
    State(state): State<AppState>,
    Json(input): Json<CreateTag>,
) -> Result<Json<TagResponse>> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Tag name is required".to_string()));
    }

    let tag = state.tags.create(input.into_tag()).await?;
    Ok(Json(tag.into()))
}

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagResponse>>> {
    let tags = state.tags.list().await?;
    Ok(Json(tags.into_iter().map(|t| t.into()).collect()))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<Uuid>,
) -> Result<Json<TagResponse>> {
    let tag = state.tags.get_by_id(tag_id).await?;
    Ok(Json(tag.into()))
}

pub async fn update_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<Uuid>,
    Json(input): Json<UpdateTag>,
) -> Result<Json<TagResponse>> {
    let mut tag = state.tags.get_by_id(tag_id).await?;

    let fields = input.apply(&mut tag);
    if tag.name.trim().is_empty() {
        return Err(AppError::Validation("Tag name is required".to_string()));
    }

    let tag = state.tags.save(&mut tag, Some(&fields)).await?;
    Ok(Json(tag.into()))
}

pub async fn delete_tag(State(state): State<AppState>, Path(tag_id): Path<Uuid>) -> Result<()> {
    state.tags.delete(tag_id).await?;
    Ok(())
}

/// The tri-state filter control for one tag, in its ignored state.
pub async fn tag_control(
    State(state): State<AppState>,
    Path(tag_id): Path<Uuid>,
) -> Result<Json<IncludeExcludeControl>> {
    let tag = state.tags.get_by_id(tag_id).await?;
    Ok(Json(IncludeExcludeControl::new(
        TAG_FILTER_FIELD,
        &tag,
        TagState::Absent,
    )))
}
