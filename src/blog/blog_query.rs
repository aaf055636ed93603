//! Turns raw listing parameters into a bounded filter/sort/page specification.
//!
//! Building a query never fails: malformed numbers fall back to their defaults and
//! unknown sort fields or states are ignored. Only the store can reject a query.

use std::cmp::Ordering;

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};
use serde::Deserialize;

use super::blog_model::{BlogPost, BlogState};

pub const DEFAULT_PAGE: u64 = 1;
pub const PUBLIC_DEFAULT_LIMIT: u64 = 20;
pub const OWNER_DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Query string accepted by the public listing. Numbers stay strings here so a
/// malformed value degrades to the default instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub tags: Option<String>,
    #[serde(rename = "orderBy", alias = "order_by")]
    pub order_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthorMatch {
    Is(ObjectId),
    /// Matches nothing when empty.
    AnyOf(Vec<ObjectId>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogFilter {
    pub id: Option<ObjectId>,
    pub author: Option<AuthorMatch>,
    pub state: Option<BlogState>,
    pub title_contains: Option<String>,
    pub tags_any: Option<Vec<String>>,
}

impl BlogFilter {
    pub fn published_by_id(id: ObjectId) -> Self {
        BlogFilter {
            id: Some(id),
            state: Some(BlogState::Published),
            ..Default::default()
        }
    }

    /// The compound `(id, author)` lookup used by every owner-scoped operation.
    pub fn owned(id: ObjectId, author_id: ObjectId) -> Self {
        BlogFilter {
            id: Some(id),
            author: Some(AuthorMatch::Is(author_id)),
            ..Default::default()
        }
    }

    pub fn matches(&self, post: &BlogPost) -> bool {
        if self.id.is_some_and(|id| id != post.id) {
            return false;
        }
        if self.state.is_some_and(|state| state != post.state) {
            return false;
        }
        match &self.author {
            Some(AuthorMatch::Is(author_id)) if *author_id != post.author_id => return false,
            Some(AuthorMatch::AnyOf(ids)) if !ids.contains(&post.author_id) => return false,
            _ => {}
        }
        if let Some(needle) = &self.title_contains {
            if !post.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(tags) = &self.tags_any {
            if !post.tags.iter().any(|tag| tags.contains(tag)) {
                return false;
            }
        }
        true
    }

    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(id) = self.id {
            filter.insert("_id", id);
        }
        if let Some(state) = self.state {
            filter.insert("state", state.as_str());
        }
        match &self.author {
            Some(AuthorMatch::Is(author_id)) => {
                filter.insert("author_id", *author_id);
            }
            Some(AuthorMatch::AnyOf(ids)) => {
                let ids: Vec<Bson> = ids.iter().copied().map(Bson::ObjectId).collect();
                filter.insert("author_id", doc! { "$in": ids });
            }
            None => {}
        }
        if let Some(needle) = &self.title_contains {
            filter.insert("title", contains_ignore_case(needle));
        }
        if let Some(tags) = &self.tags_any {
            filter.insert("tags", doc! { "$in": tags.clone() });
        }
        filter
    }
}

/// A case-insensitive literal substring match for a string field.
pub fn contains_ignore_case(needle: &str) -> Document {
    doc! { "$regex": regex::escape(needle), "$options": "i" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    ReadCount,
    ReadingTime,
    CreatedAt,
}

impl SortField {
    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "readCount" | "read_count" => Some(SortField::ReadCount),
            "readingTime" | "reading_time" => Some(SortField::ReadingTime),
            "createdAt" | "created_at" | "timestamp" => Some(SortField::CreatedAt),
            _ => None,
        }
    }

    fn stored_name(&self) -> &'static str {
        match self {
            SortField::ReadCount => "read_count",
            SortField::ReadingTime => "reading_time",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlogSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for BlogSort {
    fn default() -> Self {
        BlogSort {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl BlogSort {
    /// Parses `field:direction`. An unknown field yields the default sort; an
    /// unknown or missing direction means ascending.
    pub fn parse(order_by: &str) -> Self {
        let mut parts = order_by.splitn(2, ':');
        let field = parts.next().and_then(SortField::parse);
        let direction = match parts.next().map(str::trim) {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        match field {
            Some(field) => BlogSort { field, direction },
            None => BlogSort::default(),
        }
    }

    /// Sort document with `_id` as the tie breaker so pages never overlap.
    pub fn to_document(&self) -> Document {
        let order = match self.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        let mut sort = Document::new();
        sort.insert(self.field.stored_name(), order);
        sort.insert("_id", 1);
        sort
    }

    pub fn compare(&self, a: &BlogPost, b: &BlogPost) -> Ordering {
        let ordering = match self.field {
            SortField::ReadCount => a.read_count.cmp(&b.read_count),
            SortField::ReadingTime => a.reading_time.cmp(&b.reading_time),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let ordering = match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page: u64,
    pub limit: u64,
}

impl PageSpec {
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: u64) -> Self {
        PageSpec {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit)
                .unwrap_or(default_limit)
                .min(MAX_LIMIT),
        }
    }

    /// Clamped to the largest offset the store accepts.
    pub fn skip(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|n| *n >= 1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlogQuery {
    pub filter: BlogFilter,
    pub sort: BlogSort,
    pub page: PageSpec,
}

/// A public listing query whose author filter still needs resolving to user ids.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicQuery {
    pub query: BlogQuery,
    pub author_search: Option<String>,
}

pub fn build_public_query(params: &PublicListParams) -> PublicQuery {
    let filter = BlogFilter {
        state: Some(BlogState::Published),
        title_contains: non_blank(params.title.as_deref()),
        tags_any: params.tags.as_deref().and_then(split_tags),
        ..Default::default()
    };

    PublicQuery {
        query: BlogQuery {
            filter,
            sort: params
                .order_by
                .as_deref()
                .map(BlogSort::parse)
                .unwrap_or_default(),
            page: PageSpec::parse(
                params.page.as_deref(),
                params.limit.as_deref(),
                PUBLIC_DEFAULT_LIMIT,
            ),
        },
        author_search: non_blank(params.author.as_deref()),
    }
}

pub fn build_owner_query(author_id: ObjectId, params: &OwnerListParams) -> BlogQuery {
    BlogQuery {
        filter: BlogFilter {
            author: Some(AuthorMatch::Is(author_id)),
            state: params.state.as_deref().map(str::trim).and_then(BlogState::parse),
            ..Default::default()
        },
        sort: BlogSort::default(),
        page: PageSpec::parse(
            params.page.as_deref(),
            params.limit.as_deref(),
            OWNER_DEFAULT_LIMIT,
        ),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn split_tags(tags: &str) -> Option<Vec<String>> {
    let tags: Vec<String> = tags
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    (!tags.is_empty()).then_some(tags)
}
