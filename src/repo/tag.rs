use std::collections::HashSet;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{effective_update_fields, RecordTag, Tag, TagField};

const ALL_FIELDS: [TagField; 4] = [
    TagField::Name,
    TagField::Slug,
    TagField::Description,
    TagField::Color,
];

#[derive(Clone)]
pub struct TagRepository {
    pool: Arc<SqlitePool>,
}

impl TagRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Slugs held by every tag other than `except`.
    async fn taken_slugs(conn: &mut SqliteConnection, except: Uuid) -> Result<HashSet<String>> {
        let slugs = sqlx::query_scalar::<_, String>("SELECT slug FROM tags WHERE id != $1")
            .bind(except)
            .fetch_all(conn)
            .await?;

        Ok(slugs.into_iter().collect())
    }

    /// Insert a new tag, resolving its slug against the existing ones.
    pub async fn create(&self, mut tag: Tag) -> Result<Tag> {
        let mut tx = self.pool.begin().await?;

        let taken = Self::taken_slugs(&mut tx, tag.id).await?;
        tag.prepare_save(|slug| !taken.contains(slug), &mut rand::rng())?;

        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (id, name, slug, description, color, created_at)
            VALUES ($1, $2, $3, $4, $5, datetime('now'))
            RETURNING *
            "#,
        )
        .bind(tag.id)
        .bind(&tag.name)
        .bind(&tag.slug)
        .bind(&tag.description)
        .bind(tag.color())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "created tag");

        Ok(tag)
    }

    /// Write `tag` back. The slug is re-resolved on every save, and a partial
    /// save always writes it along with `update_fields`.
    pub async fn save(&self, tag: &mut Tag, update_fields: Option<&[TagField]>) -> Result<Tag> {
        let fields = effective_update_fields(update_fields)
            .unwrap_or_else(|| ALL_FIELDS.into_iter().collect());

        let mut tx = self.pool.begin().await?;

        let taken = Self::taken_slugs(&mut tx, tag.id).await?;
        tag.prepare_save(|slug| !taken.contains(slug), &mut rand::rng())?;

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE tags SET ");
        let mut assignments = query.separated(", ");
        for field in &fields {
            let value = match field {
                TagField::Name => tag.name.clone(),
                TagField::Slug => tag.slug.clone(),
                TagField::Description => tag.description.clone(),
                TagField::Color => tag.color().to_string(),
            };
            assignments.push(format!("{} = ", field.column()));
            assignments.push_bind_unseparated(value);
        }
        query.push(" WHERE id = ");
        query.push_bind(tag.id);
        query.push(" RETURNING *");

        let saved = query
            .build_query_as::<Tag>()
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound)?;

        tx.commit().await?;
        tracing::debug!(tag_id = %saved.id, ?fields, "saved tag");

        Ok(saved)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(tag)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Tag> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(tag)
    }

    /// All tags, ordered by slug.
    pub async fn list(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY slug ASC")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(tags)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    pub async fn add_to_record(&self, record_id: Uuid, tag_id: Uuid) -> Result<RecordTag> {
        let record_tag = sqlx::query_as::<_, RecordTag>(
            r#"
            INSERT INTO record_tags (record_id, tag_id, created_at)
            VALUES ($1, $2, datetime('now'))
            ON CONFLICT(record_id, tag_id) DO UPDATE SET created_at = created_at
            RETURNING *
            "#,
        )
        .bind(record_id)
        .bind(tag_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(record_tag)
    }

    pub async fn remove_from_record(&self, record_id: Uuid, tag_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM record_tags WHERE record_id = $1 AND tag_id = $2")
            .bind(record_id)
            .bind(tag_id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    pub async fn list_for_record(&self, record_id: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.* FROM tags t
            INNER JOIN record_tags rt ON t.id = rt.tag_id
            WHERE rt.record_id = $1
            ORDER BY t.slug ASC
            "#,
        )
        .bind(record_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(tags)
    }
}
