//! In-memory stores used when `STORE_BACKEND=memory` and by the test suite.
//!
//! Each store keeps its records behind one async `RwLock`; every mutation runs
//! under a single write guard, which makes it one atomic step just like the
//! document store's find-and-modify commands. Data is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::StoreError;
use crate::blog::blog_model::{BlogChanges, BlogPost};
use crate::blog::blog_query::{BlogFilter, BlogQuery};
use crate::blog::blog_store::BlogStore;
use crate::user::model::{AuthorSummary, User};
use crate::user::store::UserStore;

#[derive(Default)]
pub struct MemoryBlogStore {
    blogs: RwLock<HashMap<ObjectId, BlogPost>>,
}

impl MemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn title_taken(blogs: &HashMap<ObjectId, BlogPost>, title: &str, except: Option<ObjectId>) -> bool {
        blogs
            .values()
            .any(|post| post.title == title && Some(post.id) != except)
    }
}

#[async_trait]
impl BlogStore for MemoryBlogStore {
    async fn create_unique(&self, post: BlogPost) -> Result<BlogPost, StoreError> {
        let mut blogs = self.blogs.write().await;
        if Self::title_taken(&blogs, &post.title, None) {
            return Err(StoreError::DuplicateKey("title".to_string()));
        }
        blogs.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_many(&self, query: &BlogQuery) -> Result<(Vec<BlogPost>, u64), StoreError> {
        let blogs = self.blogs.read().await;
        let mut matches: Vec<&BlogPost> = blogs
            .values()
            .filter(|post| query.filter.matches(post))
            .collect();
        matches.sort_by(|a, b| query.sort.compare(a, b));

        let total = matches.len() as u64;
        let page = matches
            .into_iter()
            .skip(usize::try_from(query.page.skip()).unwrap_or(usize::MAX))
            .take(usize::try_from(query.page.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn find_one_and_increment_reads(
        &self,
        filter: &BlogFilter,
    ) -> Result<Option<BlogPost>, StoreError> {
        let mut blogs = self.blogs.write().await;
        let post = blogs.values_mut().find(|post| filter.matches(post)).map(|post| {
            post.read_count += 1;
            post.clone()
        });
        Ok(post)
    }

    async fn find_one_scoped(&self, filter: &BlogFilter) -> Result<Option<BlogPost>, StoreError> {
        let blogs = self.blogs.read().await;
        Ok(blogs.values().find(|post| filter.matches(post)).cloned())
    }

    async fn update_scoped(
        &self,
        filter: &BlogFilter,
        changes: &BlogChanges,
    ) -> Result<Option<BlogPost>, StoreError> {
        let mut blogs = self.blogs.write().await;
        let Some(id) = blogs.values().find(|post| filter.matches(post)).map(|post| post.id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title() {
            if Self::title_taken(&blogs, title, Some(id)) {
                return Err(StoreError::DuplicateKey("title".to_string()));
            }
        }

        let post = blogs.get_mut(&id).map(|post| {
            changes.apply_to(post, Utc::now());
            post.clone()
        });
        Ok(post)
    }

    async fn delete_scoped(&self, filter: &BlogFilter) -> Result<Option<BlogPost>, StoreError> {
        let mut blogs = self.blogs.write().await;
        let id = blogs.values().find(|post| filter.matches(post)).map(|post| post.id);
        Ok(id.and_then(|id| blogs.remove(&id)))
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<ObjectId, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_unique(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::DuplicateKey("email".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_ids_by_name_substring(&self, text: &str) -> Result<Vec<ObjectId>, StoreError> {
        let needle = text.to_lowercase();
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|user| {
                user.first_name.to_lowercase().contains(&needle)
                    || user.last_name.to_lowercase().contains(&needle)
            })
            .map(|user| user.id)
            .collect())
    }

    async fn resolve_display_names(
        &self,
        ids: &[ObjectId],
    ) -> Result<HashMap<ObjectId, AuthorSummary>, StoreError> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id))
            .map(|user| {
                let name = AuthorSummary {
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                };
                (user.id, name)
            })
            .collect())
    }
}
