use super::blog_controller::{
    create_blog, delete_blog, get_my_blog, get_my_blogs, get_published_blog, get_published_blogs,
    publish_blog, update_blog,
};
use actix_web::web;

/// Owner routes authenticate through the `AuthUser` extractor; the rest are public.
/// `/my-blogs` is registered ahead of `/{id}` so it is never read as a blog id.
pub fn blog_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blogs")
            .route("", web::get().to(get_published_blogs))
            .route("", web::post().to(create_blog))
            .route("/my-blogs", web::get().to(get_my_blogs))
            .route("/my-blogs/{id}", web::get().to(get_my_blog))
            .route("/{id}", web::get().to(get_published_blog))
            .route("/{id}", web::patch().to(update_blog))
            .route("/{id}", web::delete().to(delete_blog))
            .route("/{id}/publish", web::patch().to(publish_blog)),
    );
}
