use std::sync::Arc;

use actix_web::web;
use mongodb::bson::oid::ObjectId;

use crate::blog::blog_service::BlogService;
use crate::config::AuthConfig;
use crate::database::{MemoryBlogStore, MemoryUserStore};
use crate::user::model::{LoginRequest, SignupRequest};
use crate::user::service::UserService;

pub const PASSWORD: &str = "password123";

pub struct TestContext {
    pub blog_service: web::Data<BlogService>,
    pub user_service: web::Data<UserService>,
}

impl TestContext {
    pub fn new() -> Self {
        let blogs = Arc::new(MemoryBlogStore::new());
        let users = Arc::new(MemoryUserStore::new());
        let auth = AuthConfig {
            jwt_secret: "test-secret".into(),
            token_ttl_hours: 1,
            bcrypt_cost: 4,
        };

        TestContext {
            blog_service: web::Data::new(BlogService::new(blogs, users.clone())),
            user_service: web::Data::new(UserService::new(users, auth)),
        }
    }

    /// Signs a user up and logs them in, returning their id and bearer header value.
    pub async fn register(&self, first_name: &str, last_name: &str, email: &str) -> (ObjectId, String) {
        let user = self
            .user_service
            .signup(SignupRequest {
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: email.into(),
                password: PASSWORD.into(),
            })
            .await
            .unwrap();
        let (token, _) = self
            .user_service
            .login(LoginRequest {
                email: email.into(),
                password: PASSWORD.into(),
            })
            .await
            .unwrap();

        (user.id, format!("Bearer {}", token))
    }
}

/// Builds the full application over `TestContext`'s in-memory services.
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.blog_service.clone())
                .app_data($ctx.user_service.clone())
                .configure(crate::router::index::routes)
                .wrap(crate::middleware::error_handler::error_handlers())
                .service(crate::index),
        )
        .await
    };
}

pub(crate) use test_app;
