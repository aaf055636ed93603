use std::sync::Arc;

use chrono::Utc;
use log::info;
use mongodb::bson::oid::ObjectId;

use super::model::{LoginRequest, SignupRequest, User};
use super::store::UserStore;
use crate::config::AuthConfig;
use crate::database::StoreError;
use crate::middleware::auth::{INVALID_TOKEN, USER_GONE, create_token, decode_token};
use crate::utils::error::CustomError;
use crate::utils::hashing;

const BAD_CREDENTIALS: &str = "Incorrect email or password.";
const EMAIL_TAKEN: &str = "User with this email already exists.";

pub struct UserService {
    store: Arc<dyn UserStore>,
    auth: AuthConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, auth: AuthConfig) -> Self {
        UserService { store, auth }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<User, CustomError> {
        let email = normalize_email(&request.email);

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(CustomError::ConflictError(EMAIL_TAKEN.to_string()));
        }

        let hashed_password = hashing::hash_password(&request.password, self.auth.bcrypt_cost)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let now = Utc::now();
        let new_user = User {
            id: ObjectId::new(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email,
            password: hashed_password,
            created_at: now,
            updated_at: now,
        };

        // The unique index still guards against a concurrent signup with the same email.
        let user = self.store.insert_unique(new_user).await.map_err(|e| match e {
            StoreError::DuplicateKey(_) => CustomError::ConflictError(EMAIL_TAKEN.to_string()),
            other => other.into(),
        })?;

        info!("New user signed up: {}", user.email);
        Ok(user)
    }

    /// Verifies the credentials and returns a fresh bearer token with the user.
    pub async fn login(&self, request: LoginRequest) -> Result<(String, User), CustomError> {
        let user = self.verify(&request.email, &request.password).await?;
        let token = create_token(&user.id.to_hex(), &self.auth)?;

        info!("User logged in: {}", user.email);
        Ok((token, user))
    }

    pub async fn verify(&self, email: &str, password: &str) -> Result<User, CustomError> {
        let user = self
            .store
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| CustomError::UnauthenticatedError(BAD_CREDENTIALS.to_string()))?;

        let matches = hashing::verify_password(password, &user.password)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
        if !matches {
            return Err(CustomError::UnauthenticatedError(BAD_CREDENTIALS.to_string()));
        }

        Ok(user)
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn authenticate_token(&self, token: &str) -> Result<User, CustomError> {
        let claims = decode_token(token, &self.auth)?;
        let user_id = ObjectId::parse_str(&claims.id)
            .map_err(|_| CustomError::UnauthenticatedError(INVALID_TOKEN.to_string()))?;

        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CustomError::UnauthenticatedError(USER_GONE.to_string()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
