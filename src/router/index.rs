use crate::blog::blog_index::blog_routes;
use crate::user::index::user_routes;
use crate::utils::error::CustomError;
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        CustomError::ValidationError(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        CustomError::ValidationError(err.to_string()).into()
    }))
    .service(
        web::scope("/api/v1")
            .configure(user_routes)
            .configure(blog_routes),
    );
}
