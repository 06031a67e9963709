//! User handlers - registration (called by the session gateway) and profile
//! management.
use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::services::users::ProfileUpdate;
use crate::services::UserService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

/// Request body for registering a user on first OAuth login
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 255, message = "oauthId is required"))]
    pub oauth_id: String,
    #[validate(length(min = 1, max = 255, message = "fullname is required"))]
    pub fullname: String,
}

/// Request body for updating the acting user's profile
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub linkedin_link: Option<String>,
    pub github_link: Option<String>,
    pub other_link: Option<String>,
    #[validate(length(min = 2, max = 8))]
    pub language: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub theme: Option<String>,
}

/// Register a user
pub async fn register_user(
    pool: web::Data<PgPool>,
    req: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = UserService::new((**pool).clone());
    let user = service.create_user(&req.oauth_id, &req.fullname).await?;

    Ok(HttpResponse::Created().json(ApiResponse::new("user created successfully", user)))
}

/// Get the acting user's profile
pub async fn get_me(pool: web::Data<PgPool>, user: AuthenticatedUser) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    let profile = service
        .get_user(user.0)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} does not exist", user.0)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("user fetched successfully", profile)))
}

/// Update the acting user's profile
pub async fn update_me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = UserService::new((**pool).clone());
    let req = req.into_inner();
    let profile = service
        .update_profile(
            user.0,
            ProfileUpdate {
                description: req.description,
                linkedin_link: req.linkedin_link,
                github_link: req.github_link,
                other_link: req.other_link,
                language: req.language,
                theme: req.theme,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("user updated successfully", profile)))
}
