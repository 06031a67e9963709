//! Comment handlers - HTTP endpoints for comment CRUD and voting.
use super::ApiResponse;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::services::listing;
use crate::services::votes::VoteKind;
use crate::services::{CommentService, VoteService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a comment
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    #[validate(length(min = 1, max = 5000, message = "comment content is required"))]
    pub content: String,
}

/// Request body for updating a comment
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "comment content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Create a new comment
pub async fn create_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = CommentService::new((**pool).clone());
    let comment = service
        .create_comment(req.post_id, user.0, &req.content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::new("comment created successfully", comment)))
}

/// Get a post's comments, newest first, with the viewer's vote state
pub async fn post_comments(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = listing::page_number(query.page.as_deref());
    let comments = listing::fetch_comment_page(&pool, *post_id, user.0, page).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "comments fetched successfully",
        comments.comments,
        comments.total_pages,
    )))
}

/// Update a comment
pub async fn update_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = CommentService::new((**pool).clone());
    let comment = service
        .update_comment(*comment_id, user.0, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("comment updated successfully", comment)))
}

/// Delete a comment
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    service.delete_comment(*comment_id, user.0).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message_only("comment deleted successfully")))
}

/// Toggle an up-vote on a comment
pub async fn upvote_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = VoteService::new((**pool).clone());
    let comment = service.apply_vote(*comment_id, user.0, VoteKind::Up).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("comment liked successfully", comment)))
}

/// Toggle a down-vote on a comment
pub async fn downvote_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = VoteService::new((**pool).clone());
    let comment = service
        .apply_vote(*comment_id, user.0, VoteKind::Down)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("comment disliked successfully", comment)))
}
