mod record;
mod tag;

pub use record::{CreateRecord, Record, RecordResponse};
pub use tag::{
    effective_update_fields, CreateTag, RecordTag, Tag, TagError, TagField, TagResponse,
    UpdateTag, DEFAULT_COLOR, DESCRIPTION_MAX_LENGTH, MAX_LENGTH,
};
