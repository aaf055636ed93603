use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::bson::{self, Document, doc};
use serde::{Deserialize, Serialize};

use super::reading_time::estimate_reading_time;
use crate::user::model::AuthorSummary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogState {
    #[default]
    Draft,
    Published,
}

impl BlogState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogState::Draft => "draft",
            BlogState::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(BlogState::Draft),
            "published" => Some(BlogState::Published),
            _ => None,
        }
    }
}

/// A blog post as stored in the `blogs` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author_id: ObjectId,
    #[serde(default)]
    pub state: BlogState,
    #[serde(default)]
    pub read_count: i64,
    pub reading_time: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    /// Builds a fresh draft owned by `author_id`, with its reading time already derived.
    pub fn draft(author_id: ObjectId, request: CreateBlogRequest) -> Self {
        let now = Utc::now();
        let body = request.body;
        BlogPost {
            id: ObjectId::new(),
            title: request.title.trim().to_string(),
            description: normalize_description(request.description),
            reading_time: estimate_reading_time(&body),
            body,
            tags: normalize_tags(request.tags),
            author_id,
            state: BlogState::Draft,
            read_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStateRequest {
    #[serde(default)]
    pub state: Option<String>,
}

/// A partial write against a stored post.
///
/// Only the constructors can produce one, so `reading_time` always tracks the
/// `body` carried by the same change set and callers cannot set it directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogChanges {
    title: Option<String>,
    /// `Some(None)` clears a stored description.
    description: Option<Option<String>>,
    body: Option<String>,
    tags: Option<Vec<String>>,
    state: Option<BlogState>,
    reading_time: Option<i64>,
}

impl BlogChanges {
    pub fn from_update(request: UpdateBlogRequest) -> Self {
        let reading_time = request.body.as_deref().map(estimate_reading_time);
        BlogChanges {
            title: request.title.map(|title| title.trim().to_string()),
            description: request.description.map(|d| normalize_description(Some(d))),
            body: request.body,
            tags: request.tags.map(normalize_tags),
            state: None,
            reading_time,
        }
    }

    pub fn publish() -> Self {
        BlogChanges {
            state: Some(BlogState::Published),
            ..Default::default()
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn apply_to(&self, post: &mut BlogPost, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(description) = &self.description {
            post.description = description.clone();
        }
        if let Some(body) = &self.body {
            post.body = body.clone();
        }
        if let Some(tags) = &self.tags {
            post.tags = tags.clone();
        }
        if let Some(state) = self.state {
            post.state = state;
        }
        if let Some(reading_time) = self.reading_time {
            post.reading_time = reading_time;
        }
        post.updated_at = now;
    }

    /// The update document for a document store: a `$set` of every present field,
    /// plus an `$unset` when the description is cleared.
    pub fn to_update_document(&self, now: DateTime<Utc>) -> Document {
        let mut set = doc! { "updated_at": bson::DateTime::from_chrono(now) };
        let mut unset = Document::new();
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        match &self.description {
            Some(Some(description)) => {
                set.insert("description", description.as_str());
            }
            Some(None) => {
                unset.insert("description", "");
            }
            None => {}
        }
        if let Some(body) = &self.body {
            set.insert("body", body.as_str());
        }
        if let Some(tags) = &self.tags {
            set.insert("tags", tags.clone());
        }
        if let Some(state) = self.state {
            set.insert("state", state.as_str());
        }
        if let Some(reading_time) = self.reading_time {
            set.insert("reading_time", reading_time);
        }

        let mut update = doc! { "$set": set };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        update
    }
}

/// A blog post as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub body: String,
    pub tags: Vec<String>,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
    pub state: BlogState,
    pub read_count: i64,
    pub reading_time: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogView {
    pub fn with_author(post: BlogPost, author: Option<AuthorSummary>) -> Self {
        BlogView {
            id: post.id.to_hex(),
            title: post.title,
            description: post.description,
            body: post.body,
            tags: post.tags,
            author_id: post.author_id.to_hex(),
            author,
            state: post.state,
            read_count: post.read_count,
            reading_time: post.reading_time,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<BlogPost> for BlogView {
    fn from(post: BlogPost) -> Self {
        BlogView::with_author(post, None)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_blogs: u64,
}

/// One page of a listing plus the numbers needed to render pagination.
#[derive(Debug, Clone, Serialize)]
pub struct BlogPage {
    pub blogs: Vec<BlogView>,
    pub pagination: Pagination,
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
