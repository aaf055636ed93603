use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use mongodb::bson::oid::ObjectId;

use super::blog_error::{BlogError, PUBLISH_ONLY};
use super::blog_model::{
    BlogChanges, BlogPage, BlogPost, BlogState, BlogView, CreateBlogRequest, Pagination,
    UpdateBlogRequest,
};
use super::blog_query::{
    AuthorMatch, BlogFilter, BlogQuery, OwnerListParams, PublicListParams, build_owner_query,
    build_public_query,
};
use super::blog_store::BlogStore;
use crate::user::model::AuthorSummary;
use crate::user::store::UserStore;

/// Create/read/update/publish/delete for blog posts.
///
/// Ownership is never checked in application code: every owner operation goes to
/// the store as one `(id, author)` scoped command, so a post owned by somebody
/// else is indistinguishable from one that does not exist.
pub struct BlogService {
    blogs: Arc<dyn BlogStore>,
    users: Arc<dyn UserStore>,
}

impl BlogService {
    pub fn new(blogs: Arc<dyn BlogStore>, users: Arc<dyn UserStore>) -> Self {
        BlogService { blogs, users }
    }

    pub async fn create(
        &self,
        author_id: ObjectId,
        request: CreateBlogRequest,
    ) -> Result<BlogPost, BlogError> {
        let post = BlogPost::draft(author_id, request);
        let post = self
            .blogs
            .create_unique(post)
            .await
            .map_err(BlogError::from_write)?;

        info!("Blog created by {}: {}", author_id, post.title);
        Ok(post)
    }

    /// Published posts matching the visitor's search, with author names attached.
    pub async fn list_published(&self, params: &PublicListParams) -> Result<BlogPage, BlogError> {
        let public = build_public_query(params);
        let mut query = public.query;

        if let Some(author) = public.author_search {
            let ids = self.users.find_ids_by_name_substring(&author).await?;
            query.filter.author = Some(AuthorMatch::AnyOf(ids));
        }

        let (posts, total) = self.blogs.find_many(&query).await?;
        let authors = self.author_names(&posts).await?;
        let blogs = posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned();
                BlogView::with_author(post, author)
            })
            .collect();

        Ok(page_of(blogs, &query, total))
    }

    /// Reads one published post, counting the read in the same store operation.
    pub async fn get_published(&self, id: ObjectId) -> Result<BlogView, BlogError> {
        let post = self
            .blogs
            .find_one_and_increment_reads(&BlogFilter::published_by_id(id))
            .await?
            .ok_or_else(BlogError::published_not_found)?;

        let mut authors = self.users.resolve_display_names(&[post.author_id]).await?;
        let author = authors.remove(&post.author_id);
        Ok(BlogView::with_author(post, author))
    }

    pub async fn list_own(
        &self,
        author_id: ObjectId,
        params: &OwnerListParams,
    ) -> Result<BlogPage, BlogError> {
        let query = build_owner_query(author_id, params);
        let (posts, total) = self.blogs.find_many(&query).await?;
        let blogs = posts.into_iter().map(BlogView::from).collect();

        Ok(page_of(blogs, &query, total))
    }

    /// One of the caller's own posts, in any state. Does not count as a read.
    pub async fn get_own(&self, id: ObjectId, author_id: ObjectId) -> Result<BlogPost, BlogError> {
        self.blogs
            .find_one_scoped(&BlogFilter::owned(id, author_id))
            .await?
            .ok_or_else(BlogError::owned_not_found)
    }

    pub async fn update(
        &self,
        id: ObjectId,
        author_id: ObjectId,
        patch: UpdateBlogRequest,
    ) -> Result<BlogPost, BlogError> {
        let changes = BlogChanges::from_update(patch);
        let post = self
            .blogs
            .update_scoped(&BlogFilter::owned(id, author_id), &changes)
            .await
            .map_err(BlogError::from_write)?
            .ok_or_else(BlogError::owned_not_found)?;

        info!("Blog updated by {}: {}", author_id, post.title);
        Ok(post)
    }

    /// Moves a post to `published`. Publishing an already published post is a no-op success.
    pub async fn publish(
        &self,
        id: ObjectId,
        author_id: ObjectId,
        requested_state: Option<&str>,
    ) -> Result<BlogPost, BlogError> {
        if requested_state.map(str::trim).and_then(BlogState::parse) != Some(BlogState::Published) {
            return Err(BlogError::InvalidState(PUBLISH_ONLY.to_string()));
        }

        let post = self
            .blogs
            .update_scoped(&BlogFilter::owned(id, author_id), &BlogChanges::publish())
            .await?
            .ok_or_else(BlogError::owned_not_found)?;

        info!("Blog published by {}: {}", author_id, post.title);
        Ok(post)
    }

    pub async fn delete(&self, id: ObjectId, author_id: ObjectId) -> Result<(), BlogError> {
        let post = self
            .blogs
            .delete_scoped(&BlogFilter::owned(id, author_id))
            .await?
            .ok_or_else(BlogError::owned_not_found)?;

        info!("Blog deleted by {}: {}", author_id, post.title);
        Ok(())
    }

    async fn author_names(
        &self,
        posts: &[BlogPost],
    ) -> Result<HashMap<ObjectId, AuthorSummary>, BlogError> {
        let mut ids: Vec<ObjectId> = posts.iter().map(|post| post.author_id).collect();
        ids.sort();
        ids.dedup();
        Ok(self.users.resolve_display_names(&ids).await?)
    }
}

fn page_of(blogs: Vec<BlogView>, query: &BlogQuery, total: u64) -> BlogPage {
    BlogPage {
        blogs,
        pagination: Pagination {
            current_page: query.page.page,
            total_pages: query.page.total_pages(total),
            total_blogs: total,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryBlogStore, MemoryUserStore};
    use crate::user::model::User;
    use crate::user::store::UserStore;
    use chrono::{Duration, Utc};
    use futures_util::future::join_all;

    struct Fixture {
        service: BlogService,
        blogs: Arc<MemoryBlogStore>,
        users: Arc<MemoryUserStore>,
    }

    fn fixture() -> Fixture {
        let blogs = Arc::new(MemoryBlogStore::new());
        let users = Arc::new(MemoryUserStore::new());
        let service = BlogService::new(blogs.clone(), users.clone());
        Fixture { service, blogs, users }
    }

    impl Fixture {
        async fn user(&self, first: &str, last: &str) -> ObjectId {
            let now = Utc::now();
            let user = User {
                id: ObjectId::new(),
                first_name: first.into(),
                last_name: last.into(),
                email: format!("{}.{}@example.com", first, last).to_lowercase(),
                password: "hash".into(),
                created_at: now,
                updated_at: now,
            };
            self.users.insert_unique(user).await.unwrap().id
        }

        async fn draft(&self, author: ObjectId, title: &str, body: &str) -> BlogPost {
            self.service
                .create(author, request(title, body, &[]))
                .await
                .unwrap()
        }

        async fn published(&self, author: ObjectId, title: &str) -> BlogPost {
            let post = self.draft(author, title, "some body text").await;
            self.service
                .publish(post.id, author, Some("published"))
                .await
                .unwrap()
        }

        /// Inserts a published post directly, bypassing the service, to control every field.
        async fn seed(&self, author: ObjectId, title: &str, read_count: i64, minutes_ago: i64) {
            let mut post = BlogPost::draft(author, request(title, "body", &["rust"]));
            post.state = BlogState::Published;
            post.read_count = read_count;
            post.created_at = Utc::now() - Duration::minutes(minutes_ago);
            self.blogs.create_unique(post).await.unwrap();
        }
    }

    fn request(title: &str, body: &str, tags: &[&str]) -> CreateBlogRequest {
        CreateBlogRequest {
            title: title.into(),
            description: None,
            body: body.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn list(pairs: &[(&str, &str)]) -> PublicListParams {
        let mut params = PublicListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => params.page = value,
                "limit" => params.limit = value,
                "author" => params.author = value,
                "title" => params.title = value,
                "tags" => params.tags = value,
                "orderBy" => params.order_by = value,
                other => panic!("unknown param {}", other),
            }
        }
        params
    }

    #[actix_web::test]
    async fn create_starts_as_draft_and_rejects_duplicate_titles() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;

        let post = f.draft(author, "Unique", "hello world").await;
        assert_eq!(post.state, BlogState::Draft);
        assert!(post.reading_time >= 1);

        let err = f
            .service
            .create(author, request("Unique", "other", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::Conflict(_)));
    }

    #[actix_web::test]
    async fn reading_time_follows_body_changes_only() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;

        let post = f.draft(author, "Long read", &words(450)).await;
        assert_eq!(post.reading_time, 2);

        let post = f
            .service
            .update(
                post.id,
                author,
                UpdateBlogRequest { body: Some(words(10)), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(post.reading_time, 1);

        let post = f
            .service
            .update(
                post.id,
                author,
                UpdateBlogRequest { title: Some("Short read".into()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(post.title, "Short read");
        assert_eq!(post.reading_time, 1);
        assert_eq!(post.body, words(10));
    }

    #[actix_web::test]
    async fn update_leaves_absent_fields_untouched() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        let post = f
            .service
            .create(
                author,
                CreateBlogRequest {
                    title: "Partial".into(),
                    description: Some("desc".into()),
                    body: "body".into(),
                    tags: vec!["a".into()],
                },
            )
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                post.id,
                author,
                UpdateBlogRequest { tags: Some(vec!["b".into()]), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.tags, vec!["b"]);
        assert_eq!(updated.description.as_deref(), Some("desc"));
        assert_eq!(updated.title, "Partial");
        assert_eq!(updated.state, BlogState::Draft);
    }

    #[actix_web::test]
    async fn update_to_a_taken_title_is_a_conflict() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        f.draft(author, "Taken", "body").await;
        let post = f.draft(author, "Mine", "body").await;

        let err = f
            .service
            .update(
                post.id,
                author,
                UpdateBlogRequest { title: Some("Taken".into()), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::Conflict(_)));
    }

    #[actix_web::test]
    async fn non_owner_update_looks_like_a_missing_post() {
        let f = fixture();
        let owner = f.user("Ada", "Lovelace").await;
        let stranger = f.user("Alan", "Turing").await;
        let post = f.draft(owner, "Private", "body").await;

        let patch = || UpdateBlogRequest { title: Some("Hijacked".into()), ..Default::default() };
        let not_owned = f.service.update(post.id, stranger, patch()).await.unwrap_err();
        let missing = f.service.update(ObjectId::new(), stranger, patch()).await.unwrap_err();

        assert!(matches!(not_owned, BlogError::NotFound(_)));
        assert_eq!(not_owned.to_string(), missing.to_string());

        let unchanged = f.service.get_own(post.id, owner).await.unwrap();
        assert_eq!(unchanged.title, "Private");
    }

    #[actix_web::test]
    async fn non_owner_cannot_publish_or_delete() {
        let f = fixture();
        let owner = f.user("Ada", "Lovelace").await;
        let stranger = f.user("Alan", "Turing").await;
        let post = f.draft(owner, "Private", "body").await;

        let publish = f.service.publish(post.id, stranger, Some("published")).await;
        assert!(matches!(publish, Err(BlogError::NotFound(_))));
        let delete = f.service.delete(post.id, stranger).await;
        assert!(matches!(delete, Err(BlogError::NotFound(_))));
        let read = f.service.get_own(post.id, stranger).await;
        assert!(matches!(read, Err(BlogError::NotFound(_))));

        assert_eq!(f.service.get_own(post.id, owner).await.unwrap().state, BlogState::Draft);
    }

    #[actix_web::test]
    async fn publish_accepts_only_published_and_is_idempotent() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        let post = f.draft(author, "Soon", "body").await;

        for bad in [None, Some("draft"), Some("archived"), Some("")] {
            let err = f.service.publish(post.id, author, bad).await.unwrap_err();
            assert!(matches!(err, BlogError::InvalidState(_)), "{:?}", bad);
        }

        let first = f.service.publish(post.id, author, Some("published")).await.unwrap();
        assert_eq!(first.state, BlogState::Published);
        let second = f.service.publish(post.id, author, Some("published")).await.unwrap();
        assert_eq!(second.state, BlogState::Published);
    }

    #[actix_web::test]
    async fn drafts_are_invisible_to_public_reads() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        let draft = f.draft(author, "Hidden", "body").await;

        let err = f.service.get_published(draft.id).await.unwrap_err();
        assert!(matches!(err, BlogError::NotFound(_)));

        let stored = f.service.get_own(draft.id, author).await.unwrap();
        assert_eq!(stored.read_count, 0);
    }

    #[actix_web::test]
    async fn public_read_counts_and_names_the_author() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        let post = f.published(author, "Visible").await;

        let first = f.service.get_published(post.id).await.unwrap();
        assert_eq!(first.read_count, 1);
        let author_name = first.author.unwrap();
        assert_eq!(author_name.first_name, "Ada");
        assert_eq!(author_name.last_name, "Lovelace");

        let second = f.service.get_published(post.id).await.unwrap();
        assert_eq!(second.read_count, 2);
    }

    #[actix_web::test]
    async fn concurrent_reads_each_count_once() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        let post = f.published(author, "Popular").await;

        let reads = (0..25).map(|_| f.service.get_published(post.id));
        let results = join_all(reads).await;
        assert!(results.iter().all(Result::is_ok));

        let stored = f.service.get_own(post.id, author).await.unwrap();
        assert_eq!(stored.read_count, 25);
    }

    #[actix_web::test]
    async fn listing_never_includes_drafts() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        f.published(author, "Rust one").await;
        f.draft(author, "Rust draft", "body").await;

        let filters = [
            list(&[]),
            list(&[("title", "rust")]),
            list(&[("author", "ada")]),
            list(&[("orderBy", "readCount:desc"), ("limit", "100")]),
        ];
        for params in filters {
            let page = f.service.list_published(&params).await.unwrap();
            assert_eq!(page.blogs.len(), 1);
            assert!(page.blogs.iter().all(|b| b.state == BlogState::Published));
        }
    }

    #[actix_web::test]
    async fn pagination_over_twenty_five_posts() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        for i in 0..25 {
            f.seed(author, &format!("Post {i}"), 0, i).await;
        }

        let first = f.service.list_published(&list(&[("limit", "20")])).await.unwrap();
        assert_eq!(first.blogs.len(), 20);
        assert_eq!(first.pagination.total_pages, 2);
        assert_eq!(first.pagination.total_blogs, 25);
        assert_eq!(first.pagination.current_page, 1);

        let second = f
            .service
            .list_published(&list(&[("limit", "20"), ("page", "2")]))
            .await
            .unwrap();
        assert_eq!(second.blogs.len(), 5);
        assert_eq!(second.pagination.current_page, 2);

        // Default sort is newest first.
        assert_eq!(first.blogs[0].title, "Post 0");
        assert_eq!(second.blogs[4].title, "Post 24");
    }

    #[actix_web::test]
    async fn order_by_read_count_and_bogus_fields() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        f.seed(author, "Oldest, most read", 9, 30).await;
        f.seed(author, "Middle", 1, 20).await;
        f.seed(author, "Newest", 5, 10).await;

        let by_reads = f
            .service
            .list_published(&list(&[("orderBy", "readCount:desc")]))
            .await
            .unwrap();
        let counts: Vec<i64> = by_reads.blogs.iter().map(|b| b.read_count).collect();
        assert_eq!(counts, vec![9, 5, 1]);

        let ascending = f
            .service
            .list_published(&list(&[("orderBy", "readCount")]))
            .await
            .unwrap();
        let counts: Vec<i64> = ascending.blogs.iter().map(|b| b.read_count).collect();
        assert_eq!(counts, vec![1, 5, 9]);

        let bogus = f
            .service
            .list_published(&list(&[("orderBy", "bogusField:asc")]))
            .await
            .unwrap();
        let titles: Vec<&str> = bogus.blogs.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest, most read"]);
    }

    #[actix_web::test]
    async fn search_by_author_title_and_tags() {
        let f = fixture();
        let ada = f.user("Ada", "Lovelace").await;
        let alan = f.user("Alan", "Turing").await;
        f.seed(ada, "Analytical Engines", 0, 3).await;
        f.seed(alan, "Computable Numbers", 0, 2).await;

        let by_author = f.service.list_published(&list(&[("author", "turing")])).await.unwrap();
        assert_eq!(by_author.blogs.len(), 1);
        assert_eq!(by_author.blogs[0].title, "Computable Numbers");
        assert_eq!(by_author.blogs[0].author.as_ref().unwrap().first_name, "Alan");

        let nobody = f.service.list_published(&list(&[("author", "hopper")])).await.unwrap();
        assert!(nobody.blogs.is_empty());
        assert_eq!(nobody.pagination.total_blogs, 0);
        assert_eq!(nobody.pagination.total_pages, 0);

        let by_title = f.service.list_published(&list(&[("title", "ENGINE")])).await.unwrap();
        assert_eq!(by_title.blogs.len(), 1);
        assert_eq!(by_title.blogs[0].title, "Analytical Engines");

        let by_tag = f.service.list_published(&list(&[("tags", "go, rust")])).await.unwrap();
        assert_eq!(by_tag.blogs.len(), 2);
        let no_tag = f.service.list_published(&list(&[("tags", "go")])).await.unwrap();
        assert!(no_tag.blogs.is_empty());
    }

    #[actix_web::test]
    async fn owner_listing_filters_by_state_and_has_no_read_side_effect() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        let other = f.user("Alan", "Turing").await;
        f.draft(author, "Draft", "body").await;
        f.published(author, "Live").await;
        f.published(other, "Someone else").await;

        let all = f.service.list_own(author, &OwnerListParams::default()).await.unwrap();
        assert_eq!(all.blogs.len(), 2);
        assert!(all.blogs.iter().all(|b| b.read_count == 0));

        let drafts = f
            .service
            .list_own(author, &OwnerListParams { state: Some("draft".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(drafts.blogs.len(), 1);
        assert_eq!(drafts.blogs[0].title, "Draft");

        let ignored = f
            .service
            .list_own(author, &OwnerListParams { state: Some("bogus".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(ignored.blogs.len(), 2);
    }

    #[actix_web::test]
    async fn delete_is_owner_scoped_and_final() {
        let f = fixture();
        let author = f.user("Ada", "Lovelace").await;
        let post = f.draft(author, "Short lived", "body").await;

        f.service.delete(post.id, author).await.unwrap();
        let again = f.service.delete(post.id, author).await;
        assert!(matches!(again, Err(BlogError::NotFound(_))));
    }
}
