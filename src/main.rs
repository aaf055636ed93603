use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use env_logger::Env;
use log::{info, warn};
use serde_json::json;

mod blog;
mod config;
mod database;
mod middleware;
mod router;
mod user;
mod utils;

#[cfg(test)]
mod test_support;

use blog::blog_service::BlogService;
use blog::blog_store::{BlogStore, MongoBlogStore};
use config::{AppConfig, StoreBackend};
use database::{MemoryBlogStore, MemoryUserStore, StoreError};
use middleware::error_handler::error_handlers;
use router::index::routes;
use user::service::UserService;
use user::store::{MongoUserStore, UserStore};

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Welcome to the Blogging API!",
        "service": config::service_name(),
    }))
}

async fn build_stores(
    config: &AppConfig,
) -> Result<(Arc<dyn BlogStore>, Arc<dyn UserStore>), StoreError> {
    match config.store_backend {
        StoreBackend::Memory => {
            warn!("Using in-memory stores; data will not survive a restart");
            Ok((
                Arc::new(MemoryBlogStore::new()),
                Arc::new(MemoryUserStore::new()),
            ))
        }
        StoreBackend::Mongo => {
            let client = database::connect_to_mongo(&config.mongodb_uri).await?;
            let db = client.database(&config.database_name);

            let blogs = MongoBlogStore::new(&db);
            blogs.ensure_indexes().await?;
            let users = MongoUserStore::new(&db);
            users.ensure_indexes().await?;

            Ok((Arc::new(blogs), Arc::new(users)))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let (blog_store, user_store) = build_stores(&config)
        .await
        .map_err(std::io::Error::other)?;

    let blog_service = web::Data::new(BlogService::new(blog_store, user_store.clone()));
    let user_service = web::Data::new(UserService::new(user_store, config.auth.clone()));

    info!("Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(blog_service.clone())
            .app_data(user_service.clone())
            .configure(routes)
            .wrap(error_handlers())
            .service(index)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
