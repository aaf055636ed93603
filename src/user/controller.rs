use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::user::model::{LoginRequest, SignupRequest, UserResponse};
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::helpers::success;
use crate::utils::validation::{validate_login, validate_signup};

/// POST /api/v1/auth/signup
pub async fn signup(
    user_service: web::Data<UserService>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, CustomError> {
    let request = body.into_inner();
    validate_signup(&request)?;

    let user = user_service.signup(request).await?;

    Ok(HttpResponse::Created().json(success(json!({ "user": UserResponse::from(user) }))))
}

/// POST /api/v1/auth/login
pub async fn login(
    user_service: web::Data<UserService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, CustomError> {
    let request = body.into_inner();
    validate_login(&request)?;

    let (token, user) = user_service.login(request).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "token": token,
        "data": { "user": UserResponse::from(user) },
    })))
}
