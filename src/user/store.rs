use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Document, doc};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use serde::Deserialize;

use super::model::{AuthorSummary, User};
use crate::blog::blog_query::contains_ignore_case;
use crate::database::StoreError;

/// Lookup and persistence contract for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts `user`, failing with `StoreError::DuplicateKey` if the email is taken.
    async fn insert_unique(&self, user: User) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, StoreError>;

    /// Ids of users whose first or last name contains `text`, ignoring case.
    async fn find_ids_by_name_substring(&self, text: &str) -> Result<Vec<ObjectId>, StoreError>;

    /// Display names for `ids` in one round trip. Unknown ids are simply absent.
    async fn resolve_display_names(
        &self,
        ids: &[ObjectId],
    ) -> Result<HashMap<ObjectId, AuthorSummary>, StoreError>;
}

#[derive(Debug, Deserialize)]
struct AuthorRecord {
    #[serde(rename = "_id")]
    id: ObjectId,
    first_name: String,
    last_name: String,
}

pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<User>("users");
        MongoUserStore { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert_unique(&self, user: User) -> Result<User, StoreError> {
        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, StoreError> {
        let user = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    async fn find_ids_by_name_substring(&self, text: &str) -> Result<Vec<ObjectId>, StoreError> {
        let pattern = contains_ignore_case(text);
        let cursor = self
            .collection
            .clone_with_type::<Document>()
            .find(doc! {
                "$or": [
                    { "first_name": pattern.clone() },
                    { "last_name": pattern },
                ]
            })
            .projection(doc! { "_id": 1 })
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        Ok(docs
            .iter()
            .filter_map(|d| d.get_object_id("_id").ok())
            .collect())
    }

    async fn resolve_display_names(
        &self,
        ids: &[ObjectId],
    ) -> Result<HashMap<ObjectId, AuthorSummary>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let cursor = self
            .collection
            .clone_with_type::<AuthorRecord>()
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .projection(doc! { "first_name": 1, "last_name": 1 })
            .await?;
        let records: Vec<AuthorRecord> = cursor.try_collect().await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let name = AuthorSummary {
                    first_name: record.first_name,
                    last_name: record.last_name,
                };
                (record.id, name)
            })
            .collect())
    }
}
