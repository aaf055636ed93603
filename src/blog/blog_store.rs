use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::doc;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};

use super::blog_model::{BlogChanges, BlogPost};
use super::blog_query::{BlogFilter, BlogQuery};
use crate::database::StoreError;

/// Persistence contract for blog posts. Every method is a single atomic store operation.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Inserts `post`, failing with `StoreError::DuplicateKey` if the title is taken.
    async fn create_unique(&self, post: BlogPost) -> Result<BlogPost, StoreError>;

    /// One page of matches plus the total number of matches.
    async fn find_many(&self, query: &BlogQuery) -> Result<(Vec<BlogPost>, u64), StoreError>;

    /// Increments `read_count` on the first match and returns it after the increment.
    async fn find_one_and_increment_reads(
        &self,
        filter: &BlogFilter,
    ) -> Result<Option<BlogPost>, StoreError>;

    async fn find_one_scoped(&self, filter: &BlogFilter) -> Result<Option<BlogPost>, StoreError>;

    /// Applies `changes` to the first match and returns it after the update.
    async fn update_scoped(
        &self,
        filter: &BlogFilter,
        changes: &BlogChanges,
    ) -> Result<Option<BlogPost>, StoreError>;

    async fn delete_scoped(&self, filter: &BlogFilter) -> Result<Option<BlogPost>, StoreError>;
}

pub struct MongoBlogStore {
    collection: Collection<BlogPost>,
}

impl MongoBlogStore {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<BlogPost>("blogs");
        MongoBlogStore { collection }
    }

    /// Creates the unique title index plus the indexes the listings filter on.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "title": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "state": 1, "created_at": -1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "author_id": 1, "created_at": -1 })
                .build(),
        ];
        self.collection.create_indexes(indexes).await?;
        info!("Blog indexes are in place");
        Ok(())
    }
}

#[async_trait]
impl BlogStore for MongoBlogStore {
    async fn create_unique(&self, post: BlogPost) -> Result<BlogPost, StoreError> {
        self.collection.insert_one(&post).await?;
        Ok(post)
    }

    async fn find_many(&self, query: &BlogQuery) -> Result<(Vec<BlogPost>, u64), StoreError> {
        let filter = query.filter.to_document();

        let cursor = self
            .collection
            .find(filter.clone())
            .sort(query.sort.to_document())
            .skip(query.page.skip())
            .limit(query.page.limit as i64)
            .await?;
        let posts: Vec<BlogPost> = cursor.try_collect().await?;

        let total = self.collection.count_documents(filter).await?;

        Ok((posts, total))
    }

    async fn find_one_and_increment_reads(
        &self,
        filter: &BlogFilter,
    ) -> Result<Option<BlogPost>, StoreError> {
        let post = self
            .collection
            .find_one_and_update(filter.to_document(), doc! { "$inc": { "read_count": 1 } })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(post)
    }

    async fn find_one_scoped(&self, filter: &BlogFilter) -> Result<Option<BlogPost>, StoreError> {
        let post = self.collection.find_one(filter.to_document()).await?;
        Ok(post)
    }

    async fn update_scoped(
        &self,
        filter: &BlogFilter,
        changes: &BlogChanges,
    ) -> Result<Option<BlogPost>, StoreError> {
        let post = self
            .collection
            .find_one_and_update(filter.to_document(), changes.to_update_document(Utc::now()))
            .return_document(ReturnDocument::After)
            .await?;
        Ok(post)
    }

    async fn delete_scoped(&self, filter: &BlogFilter) -> Result<Option<BlogPost>, StoreError> {
        let post = self
            .collection
            .find_one_and_delete(filter.to_document())
            .await?;
        Ok(post)
    }
}
