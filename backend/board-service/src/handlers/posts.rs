//! Post handlers - HTTP endpoints for post listings, CRUD, archival and
//! favorites.
use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::{ExperienceLevel, FavoriteAction, JobType};
use crate::services::listing::{self, PostFilter};
use crate::services::posts::{NewPost, PostUpdate};
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Listing query parameters. `page` and the enum filters are parsed
/// leniently: garbage degrades to page 1 / no filter instead of failing the
/// request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    pub search: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub page: Option<String>,
}

impl ListPostsQuery {
    fn filter(&self, archived: bool) -> PostFilter {
        PostFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            job_type: self.job_type.as_deref().and_then(JobType::parse_param),
            experience_level: self
                .experience_level
                .as_deref()
                .and_then(ExperienceLevel::parse_param),
            archived,
            ..PostFilter::default()
        }
    }

    fn page(&self) -> i64 {
        listing::page_number(self.page.as_deref())
    }
}

/// Pagination-only query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    fn page(&self) -> i64 {
        listing::page_number(self.page.as_deref())
    }
}

/// Request body for creating a post. The resume must already be stored with
/// the upload collaborator; its key is required here.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "description is required"))]
    pub description: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    #[validate(length(min = 1, message = "a resume document is required"))]
    pub resume_key: String,
}

/// Request body for updating a post; all core fields are required.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "description is required"))]
    pub description: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
}

/// Query parameter selecting the favorite mutation.
#[derive(Debug, Deserialize)]
pub struct FavoriteQuery {
    pub action: FavoriteAction,
}

/// Get newest unarchived posts
pub async fn list_posts(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let page = listing::fetch_post_page(&pool, &query.filter(false), query.page()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "newest posts fetched successfully",
        page.posts,
        page.total_pages,
    )))
}

/// Create a new post
pub async fn create_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = PostService::new((**pool).clone());
    let post = service
        .create_post(
            user.0,
            NewPost {
                title: &req.title,
                description: &req.description,
                job_type: req.job_type,
                experience_level: req.experience_level,
                resume_key: &req.resume_key,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::new("post created successfully", post)))
}

/// Get the acting user's unarchived posts
pub async fn my_posts(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let filter = PostFilter {
        author_id: Some(user.0),
        ..PostFilter::default()
    };
    let page = listing::fetch_post_page(&pool, &filter, query.page()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "my posts fetched successfully",
        page.posts,
        page.total_pages,
    )))
}

/// Get the acting user's archived posts
pub async fn archived_posts(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let filter = PostFilter {
        author_id: Some(user.0),
        archived: true,
        ..PostFilter::default()
    };
    let page = listing::fetch_post_page(&pool, &filter, query.page()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "archived posts fetched successfully",
        page.posts,
        page.total_pages,
    )))
}

/// Get unarchived posts the acting user favorited
pub async fn favorite_posts(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let mut filter = query.filter(false);
    filter.favorited_by = Some(user.0);
    let page = listing::fetch_post_page(&pool, &filter, query.page()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(
        "favorite posts fetched successfully",
        page.posts,
        page.total_pages,
    )))
}

/// Get one post with its author's public links
pub async fn get_post(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    let service = PostService::new((**pool).clone());
    let detail = service
        .get_post_detail(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id} does not exist")))?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("post fetched successfully", detail)))
}

/// Update a post
pub async fn update_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = PostService::new((**pool).clone());
    let post = service
        .update_post(
            *post_id,
            user.0,
            PostUpdate {
                title: &req.title,
                description: &req.description,
                job_type: req.job_type,
                experience_level: req.experience_level,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("post modified successfully", post)))
}

/// Delete a post
pub async fn delete_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    service.delete_post(*post_id, user.0).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message_only("post deleted successfully")))
}

/// Archive a post
pub async fn archive_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.set_archived(*post_id, user.0, true).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("post archived successfully", post)))
}

/// Unarchive a post
pub async fn unarchive_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.set_archived(*post_id, user.0, false).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("post unarchived successfully", post)))
}

/// Add or remove the post from the acting user's favorites
pub async fn favorite_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    query: web::Query<FavoriteQuery>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.set_favorite(*post_id, user.0, query.action).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new("favorites updated successfully", post)))
}

/// Is the post in the acting user's favorites
pub async fn is_favorite_post(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let is_favorite = service.is_favorite(*post_id, user.0).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "favorite status fetched successfully",
        is_favorite,
    )))
}
