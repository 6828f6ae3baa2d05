pub mod record;
pub mod tag;

pub use record::{RecordQuery, RecordRepository};
pub use tag::TagRepository;
