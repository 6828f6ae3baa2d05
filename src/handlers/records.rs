use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::filter::{apply_and_or, apply_selection};
use crate::models::{CreateRecord, Record, RecordResponse};
use crate::repo::RecordQuery;
use crate::selection::{AndOrSelection, Combinator, Selection};
use crate::state::AppState;
use crate::widgets::{decode_and_or, decode_choices};

/// Query parameter prefix of the tri-state AND/OR tag filter.
pub const TAG_FILTER_FIELD: &str = "tags";
/// Query parameter of the plain multi-choice tag filter.
pub const CHOICE_FIELD: &str = "choice";

/// Both tag filters as read from the query string.
pub struct RecordFilter {
    pub tags: AndOrSelection<Uuid>,
    pub choices: Selection<Uuid>,
}

impl RecordFilter {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            tags: decode_and_or(TAG_FILTER_FIELD, pairs),
            choices: decode_choices(CHOICE_FIELD, pairs),
        }
    }

    pub fn query(&self) -> RecordQuery {
        let query = apply_and_or(RecordQuery::all(), &self.tags);
        apply_selection(query, &self.choices, Combinator::Or)
    }
}

pub(crate) async fn with_tags(state: &AppState, records: Vec<Record>) -> Result<Vec<RecordResponse>> {
    let mut responses = Vec::with_capacity(records.len());
    for record in records {
        let tags = state.tags.list_for_record(record.id).await?;
        responses.push(record.into_response(tags.into_iter().map(|t| t.into()).collect()));
    }
    Ok(responses)
}

pub async fn create_record(
    State(state): State<AppState>,
    Json(input): Json<CreateRecord>,
) -> Result<Json<RecordResponse>> {
    if input.title.is_empty() {
        return Err(AppError::Validation("Record title is required".to_string()));
    }

    let record = state
        .records
        .create(&input.title, input.body.as_deref())
        .await?;

    Ok(Json(record.into_response(vec![])))
}

pub async fn list_records(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<RecordResponse>>> {
    let filter = RecordFilter::from_pairs(&pairs);
    let records = state.records.fetch(&filter.query()).await?;

    Ok(Json(with_tags(&state, records).await?))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<RecordResponse>> {
    let record = state.records.get_by_id(record_id).await?;
    let mut responses = with_tags(&state, vec![record]).await?;
    responses.pop().map(Json).ok_or(AppError::NotFound)
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
) -> Result<()> {
    state.records.delete(record_id).await?;
    Ok(())
}

pub async fn add_tag_to_record(
    State(state): State<AppState>,
    Path((record_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<()> {
    state.records.get_by_id(record_id).await?;
    state.tags.get_by_id(tag_id).await?;

    state.tags.add_to_record(record_id, tag_id).await?;
    Ok(())
}

pub async fn remove_tag_from_record(
    State(state): State<AppState>,
    Path((record_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<()> {
    state.tags.remove_from_record(record_id, tag_id).await?;
    Ok(())
}
