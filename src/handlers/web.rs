use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};

use super::records::{RecordFilter, CHOICE_FIELD, TAG_FILTER_FIELD};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::widgets::{choice_options, ChoiceOption, TagBadge, TagFilterWidget};

#[derive(Template)]
#[template(path = "records.html")]
struct RecordsTemplate {
    tag_filter: TagFilterWidget,
    choices: Vec<ChoiceOption>,
    records: Vec<RecordView>,
}

struct RecordView {
    title: String,
    body: Option<String>,
    tags: Vec<TagBadge>,
}

/// Records page with the tag filter controls set to the current selection.
pub async fn index(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let filter = RecordFilter::from_pairs(&pairs);
    let tags = state.tags.list().await?;
    let records = state.records.fetch(&filter.query()).await?;

    let mut views = Vec::with_capacity(records.len());
    for record in records {
        let record_tags = state.tags.list_for_record(record.id).await?;
        views.push(RecordView {
            title: record.title,
            body: record.body,
            tags: record_tags.iter().map(TagBadge::label).collect(),
        });
    }

    let template = RecordsTemplate {
        tag_filter: TagFilterWidget::new(TAG_FILTER_FIELD, &tags, &filter.tags),
        choices: choice_options(CHOICE_FIELD, &tags, &filter.choices),
        records: views,
    };
    let html = template
        .render()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Html(html))
}
