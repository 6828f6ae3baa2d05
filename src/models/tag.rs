use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color;
use crate::slug::{is_url_safe, resolve_slug, slugify, SlugExhausted};

/// Upper bound for tag names and slugs, in characters.
pub const MAX_LENGTH: usize = 20;
pub const DESCRIPTION_MAX_LENGTH: usize = 155;
pub const DEFAULT_COLOR: &str = "#CD0000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("name is a required parameter")]
    NameRequired,

    #[error("Tag name must be at most 20 characters")]
    NameTooLong,

    #[error("Tag slug must be at most 20 characters")]
    SlugTooLong,

    #[error("Tag slug may only contain letters, numbers, underscores or hyphens")]
    SlugInvalid,

    #[error("Tag description must be at most 155 characters")]
    DescriptionTooLong,

    #[error("Unable to find an unique slug")]
    SlugExhausted,
}

impl From<SlugExhausted> for TagError {
    fn from(_: SlugExhausted) -> Self {
        TagError::SlugExhausted
    }
}

/// Persisted tag columns, as named by partial updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagField {
    Name,
    Slug,
    Description,
    Color,
}

impl TagField {
    pub fn column(self) -> &'static str {
        match self {
            TagField::Name => "name",
            TagField::Slug => "slug",
            TagField::Description => "description",
            TagField::Color => "color",
        }
    }
}

/// Fields a save actually writes. A partial save always writes the slug,
/// since the slug may have been re-resolved; `None` means every field.
pub fn effective_update_fields(update_fields: Option<&[TagField]>) -> Option<BTreeSet<TagField>> {
    update_fields.map(|fields| {
        let mut fields: BTreeSet<TagField> = fields.iter().copied().collect();
        fields.insert(TagField::Slug);
        fields
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    color: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(skip)]
    font_white: OnceLock<bool>,
}

impl Tag {
    /// An unsaved tag with the default color and no slug yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: String::new(),
            description: String::new(),
            color: DEFAULT_COLOR.to_string(),
            created_at: Utc::now(),
            font_white: OnceLock::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.set_color(color);
        self
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
        self.font_white = OnceLock::new();
    }

    pub fn font_white(&self) -> bool {
        *self
            .font_white
            .get_or_init(|| color::use_white_font(&self.color))
    }

    pub fn font_color(&self) -> &'static str {
        color::font_color(self.font_white())
    }

    /// Field limits. A missing or blank name is reported as
    /// [`TagError::NameRequired`], which callers must treat as a broken
    /// precondition. An empty slug is allowed and derived on save.
    pub fn validate(&self) -> Result<(), TagError> {
        if self.name.trim().is_empty() {
            return Err(TagError::NameRequired);
        }
        if self.name.chars().count() > MAX_LENGTH {
            return Err(TagError::NameTooLong);
        }
        if self.slug.chars().count() > MAX_LENGTH {
            return Err(TagError::SlugTooLong);
        }
        if !self.slug.is_empty() && !is_url_safe(&self.slug) {
            return Err(TagError::SlugInvalid);
        }
        if self.description.chars().count() > DESCRIPTION_MAX_LENGTH {
            return Err(TagError::DescriptionTooLong);
        }
        Ok(())
    }

    /// Validate and settle the slug before writing: a blank slug is derived
    /// from the name, then grown until `is_valid_slug` accepts it.
    pub fn prepare_save<R, F>(&mut self, is_valid_slug: F, rng: &mut R) -> Result<(), TagError>
    where
        R: Rng + ?Sized,
        F: FnMut(&str) -> bool,
    {
        self.validate()?;

        let candidate = if self.slug.is_empty() {
            slugify(&self.name)
        } else {
            self.slug.clone()
        };
        self.slug = resolve_slug(candidate, is_valid_slug, rng)?;
        Ok(())
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tag {}

/// Tags sort by slug. The id breaks ties so ordering agrees with `Eq`.
impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.slug
            .cmp(&other.slug)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A tag equals a string naming its slug.
impl PartialEq<str> for Tag {
    fn eq(&self, other: &str) -> bool {
        self.slug == other
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        self.slug == *other
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ColorTag({:?}, {:?}, {:?})",
            self.name, self.slug, self.description
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecordTag {
    pub record_id: Uuid,
    pub tag_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl CreateTag {
    pub fn into_tag(self) -> Tag {
        let mut tag = Tag::new(self.name);
        if let Some(slug) = self.slug {
            tag.slug = slug;
        }
        if let Some(description) = self.description {
            tag.description = description;
        }
        if let Some(color) = self.color {
            tag.set_color(color);
        }
        tag
    }
}

/// Partial update. An empty `slug` clears it so it is derived from the name
/// again.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl UpdateTag {
    /// Apply the present fields to `tag`, returning which ones were set.
    pub fn apply(self, tag: &mut Tag) -> Vec<TagField> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            tag.name = name;
            fields.push(TagField::Name);
        }
        if let Some(slug) = self.slug {
            tag.slug = slug;
            fields.push(TagField::Slug);
        }
        if let Some(description) = self.description {
            tag.description = description;
            fields.push(TagField::Description);
        }
        if let Some(color) = self.color {
            tag.set_color(color);
            fields.push(TagField::Color);
        }
        fields
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
    pub font_white: bool,
    pub font_color: String,
    pub created_at: DateTime<Utc>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        let font_white = tag.font_white();
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
            description: tag.description,
            font_color: color::font_color(font_white).to_string(),
            font_white,
            color: tag.color,
            created_at: tag.created_at,
        }
    }
}
