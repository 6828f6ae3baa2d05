use std::collections::BTreeSet;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::filter::TagQuery;
use crate::models::Record;

#[derive(Debug, Clone, PartialEq)]
enum TagClause {
    Tagged(Uuid),
    TaggedAny(Vec<Uuid>),
    NotTagged(Uuid),
}

/// A pending query over `records`, narrowed by tag membership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    clauses: Vec<TagClause>,
    distinct: bool,
}

impl RecordQuery {
    pub fn all() -> Self {
        Self::default()
    }

    fn builder(&self) -> QueryBuilder<'_, Sqlite> {
        let mut query = QueryBuilder::<Sqlite>::new(if self.distinct {
            "SELECT DISTINCT r.* FROM records r WHERE 1 = 1"
        } else {
            "SELECT r.* FROM records r WHERE 1 = 1"
        });

        for clause in &self.clauses {
            match clause {
                TagClause::Tagged(id) => {
                    query.push(
                        " AND EXISTS (SELECT 1 FROM record_tags rt \
                         WHERE rt.record_id = r.id AND rt.tag_id = ",
                    );
                    query.push_bind(*id);
                    query.push(")");
                }
                TagClause::TaggedAny(ids) => {
                    query.push(
                        " AND EXISTS (SELECT 1 FROM record_tags rt \
                         WHERE rt.record_id = r.id AND rt.tag_id IN (",
                    );
                    let mut list = query.separated(", ");
                    for id in ids {
                        list.push_bind(*id);
                    }
                    query.push("))");
                }
                TagClause::NotTagged(id) => {
                    query.push(
                        " AND NOT EXISTS (SELECT 1 FROM record_tags rt \
                         WHERE rt.record_id = r.id AND rt.tag_id = ",
                    );
                    query.push_bind(*id);
                    query.push(")");
                }
            }
        }

        query.push(" ORDER BY r.title ASC, r.id ASC");
        query
    }

    /// The SQL this query runs, with placeholders.
    pub fn sql(&self) -> String {
        self.builder().sql().to_string()
    }
}

impl TagQuery<Uuid> for RecordQuery {
    fn filter_tagged(mut self, id: &Uuid) -> Self {
        self.clauses.push(TagClause::Tagged(*id));
        self
    }

    fn filter_tagged_any(mut self, ids: &BTreeSet<Uuid>) -> Self {
        self.clauses
            .push(TagClause::TaggedAny(ids.iter().copied().collect()));
        self
    }

    fn exclude_tagged(mut self, id: &Uuid) -> Self {
        self.clauses.push(TagClause::NotTagged(*id));
        self
    }

    fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

#[derive(Clone)]
pub struct RecordRepository {
    pool: Arc<SqlitePool>,
}

impl RecordRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, title: &str, body: Option<&str>) -> Result<Record> {
        let id = Uuid::new_v4();

        let record = sqlx::query_as::<_, Record>(
            r#"
            INSERT INTO records (id, title, body, created_at)
            VALUES ($1, $2, $3, datetime('now'))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(body)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Record>> {
        let record = sqlx::query_as::<_, Record>("SELECT * FROM records WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(record)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Record> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Run a record query built by the tag filter.
    pub async fn fetch(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        let mut builder = query.builder();
        let records = builder
            .build_query_as::<Record>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(records)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM records WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
