use actix_web::{HttpResponse, web};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::blog::blog_error::BlogError;
use crate::blog::blog_model::{
    BlogPage, BlogView, CreateBlogRequest, UpdateBlogRequest, UpdateStateRequest,
};
use crate::blog::blog_query::{OwnerListParams, PublicListParams};
use crate::blog::blog_service::BlogService;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::helpers::success;
use crate::utils::validation::{validate_blog_update, validate_new_blog};

/// A malformed id cannot match any stored post, so it reads as "not found".
fn parse_blog_id(raw: &str, not_found: fn() -> BlogError) -> Result<ObjectId, BlogError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| not_found())
}

fn paginated(page: BlogPage) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "success",
        "results": page.blogs.len(),
        "data": { "blogs": page.blogs },
        "pagination": page.pagination,
    }))
}

fn single(post: impl Into<BlogView>) -> HttpResponse {
    HttpResponse::Ok().json(success(json!({ "blog": post.into() })))
}

/// GET /api/v1/blogs
pub async fn get_published_blogs(
    blog_service: web::Data<BlogService>,
    query: web::Query<PublicListParams>,
) -> Result<HttpResponse, CustomError> {
    let page = blog_service.list_published(&query).await?;
    Ok(paginated(page))
}

/// GET /api/v1/blogs/{id}
pub async fn get_published_blog(
    blog_service: web::Data<BlogService>,
    blog_id: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_blog_id(&blog_id, BlogError::published_not_found)?;
    let blog = blog_service.get_published(id).await?;
    Ok(single(blog))
}

/// POST /api/v1/blogs
pub async fn create_blog(
    user: AuthUser,
    blog_service: web::Data<BlogService>,
    body: web::Json<CreateBlogRequest>,
) -> Result<HttpResponse, CustomError> {
    let request = body.into_inner();
    validate_new_blog(&request)?;

    let blog = blog_service.create(user.id, request).await?;

    Ok(HttpResponse::Created().json(success(json!({ "blog": BlogView::from(blog) }))))
}

/// GET /api/v1/blogs/my-blogs
pub async fn get_my_blogs(
    user: AuthUser,
    blog_service: web::Data<BlogService>,
    query: web::Query<OwnerListParams>,
) -> Result<HttpResponse, CustomError> {
    let page = blog_service.list_own(user.id, &query).await?;
    Ok(paginated(page))
}

/// GET /api/v1/blogs/my-blogs/{id}
pub async fn get_my_blog(
    user: AuthUser,
    blog_service: web::Data<BlogService>,
    blog_id: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_blog_id(&blog_id, BlogError::owned_not_found)?;
    let blog = blog_service.get_own(id, user.id).await?;
    Ok(single(blog))
}

/// PATCH /api/v1/blogs/{id}
pub async fn update_blog(
    user: AuthUser,
    blog_service: web::Data<BlogService>,
    blog_id: web::Path<String>,
    body: web::Json<UpdateBlogRequest>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_blog_id(&blog_id, BlogError::owned_not_found)?;
    let patch = body.into_inner();
    validate_blog_update(&patch)?;

    let blog = blog_service.update(id, user.id, patch).await?;
    Ok(single(blog))
}

/// PATCH /api/v1/blogs/{id}/publish
pub async fn publish_blog(
    user: AuthUser,
    blog_service: web::Data<BlogService>,
    blog_id: web::Path<String>,
    body: Option<web::Json<UpdateStateRequest>>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_blog_id(&blog_id, BlogError::owned_not_found)?;
    let requested = body.map(web::Json::into_inner).unwrap_or_default();

    let blog = blog_service
        .publish(id, user.id, requested.state.as_deref())
        .await?;
    Ok(single(blog))
}

/// DELETE /api/v1/blogs/{id}
pub async fn delete_blog(
    user: AuthUser,
    blog_service: web::Data<BlogService>,
    blog_id: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_blog_id(&blog_id, BlogError::owned_not_found)?;
    blog_service.delete(id, user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
