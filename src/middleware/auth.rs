use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::warn;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::user::service::UserService;
use crate::utils::error::CustomError;

pub const NOT_LOGGED_IN: &str = "You are not logged in! Please log in to get access.";
pub const INVALID_TOKEN: &str = "Invalid token. Please log in again.";
pub const USER_GONE: &str = "The user belonging to this token no longer exists.";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub exp: usize,
}

/// Signs a bearer token for `user_id` that expires after the configured TTL.
pub fn create_token(user_id: &str, config: &AuthConfig) -> Result<String, CustomError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(
            chrono::Duration::try_hours(config.token_ttl_hours).ok_or_else(|| {
                CustomError::InternalServerError("Token lifetime out of range".to_string())
            })?,
        )
        .ok_or_else(|| CustomError::InternalServerError("Token expiry overflow".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        id: user_id.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| CustomError::InternalServerError(format!("Token generation failed: {}", e)))
}

/// Checks the signature and expiry of `token`.
pub fn decode_token(token: &str, config: &AuthConfig) -> Result<Claims, CustomError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        CustomError::UnauthenticatedError(INVALID_TOKEN.to_string())
    })
}

/// The authenticated caller of an owner route.
///
/// Extracting it requires a valid bearer token whose user still exists; any
/// failure short-circuits the handler with a 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
}

impl FromRequest for AuthUser {
    type Error = CustomError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let credentials = BearerAuth::from_request(req, payload);
        let users = req.app_data::<web::Data<UserService>>().cloned();

        Box::pin(async move {
            let credentials = credentials
                .await
                .map_err(|_| CustomError::UnauthenticatedError(NOT_LOGGED_IN.to_string()))?;
            let users = users.ok_or_else(|| {
                CustomError::InternalServerError("UserService is not registered".to_string())
            })?;

            let user = users.authenticate_token(credentials.token()).await?;
            Ok(AuthUser { id: user.id })
        })
    }
}
