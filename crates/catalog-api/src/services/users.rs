//! User account service
//!
//! Author: hephaex@gmail.com

use super::Pagination;
use crate::auth::service::{conflict_message, UserResponse};
use crate::error::{trimmed_opt, AppError};
use catalog_core::{CatalogError, User, UserRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Profile update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub last_name: Option<String>,
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub username: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    async fn load(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserResponse, AppError> {
        Ok(self.load(id).await?.into())
    }

    pub async fn list_users(&self, page: Pagination) -> Result<Vec<UserResponse>, AppError> {
        let users = self.users.list(page.limit(), page.offset()).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        let mut user = self.load(id).await?;

        if let Some(first_name) = request.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name;
        }
        if let Some(username) = request.username {
            if let Some(existing) = self.users.find_by_username(&username).await? {
                if existing.id != id {
                    return Err(AppError::Conflict(conflict_message("username")));
                }
            }
            user.username = username;
        }

        match self.users.update(&user).await {
            Ok(updated) => {
                tracing::debug!(user_id = %id, "Profile updated");
                Ok(updated.into())
            }
            Err(CatalogError::DuplicateKey { field }) => {
                Err(AppError::Conflict(conflict_message(&field)))
            }
            Err(CatalogError::NotFound(_)) => Err(AppError::NotFound("User not found".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Soft delete; any authenticated caller may delete any account
    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        match self.users.delete(id).await {
            Ok(()) => {
                tracing::info!(user_id = %id, "User deleted");
                Ok(())
            }
            Err(CatalogError::NotFound(_)) => Err(AppError::NotFound("User not found".to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
