//! Data models for board-service
//!
//! Row types for users, posts and comments plus the API enums. JSON field
//! names are camelCase to match the public API contract; column names stay
//! snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job category attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl JobType {
    /// Parse a listing query parameter. Unknown values impose no filter
    /// rather than failing the request.
    pub fn parse_param(raw: &str) -> Option<Self> {
        match raw {
            "full_time" => Some(Self::FullTime),
            "part_time" => Some(Self::PartTime),
            "contract" => Some(Self::Contract),
            "freelance" => Some(Self::Freelance),
            "internship" => Some(Self::Internship),
            _ => None,
        }
    }
}

/// Experience bracket attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "experience_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    /// Parse a listing query parameter. Unknown values impose no filter.
    pub fn parse_param(raw: &str) -> Option<Self> {
        match raw {
            "junior" => Some(Self::Junior),
            "mid" => Some(Self::Mid),
            "senior" => Some(Self::Senior),
            _ => None,
        }
    }
}

/// Favorite mutation requested through the `action` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteAction {
    Add,
    Remove,
}

/// User entity - referenced by posts and comments, owned by the session
/// gateway which registers users on first OAuth login.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub oauth_id: String,
    pub fullname: String,
    pub description: Option<String>,
    pub linkedin_link: Option<String>,
    pub github_link: Option<String>,
    pub other_link: Option<String>,
    pub language: String,
    pub theme: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Job post entity. `resume_key` is an opaque reference into the upload
/// collaborator; this service never sees file bytes. `total_favorites`
/// mirrors the cardinality of `post_favorites` for the post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub resume_key: String,
    pub archived: bool,
    pub total_favorites: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public contact links of a post's author, shown on the post detail page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuthorLinks {
    pub github_link: Option<String>,
    pub linkedin_link: Option<String>,
    pub other_link: Option<String>,
}

/// Post detail payload: the post plus its author's public links.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorLinks,
}

/// Comment entity. The two counters mirror the cardinality of the
/// `comment_up_likes` / `comment_down_likes` membership tables; a user is
/// never in both sets for the same comment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub total_up_likes: i64,
    pub total_down_likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment as returned by the post-comments listing, annotated with the
/// requesting user's membership in each vote set so the client only has to
/// track "did I press like".
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithViewerVote {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub total_up_likes: i64,
    pub total_down_likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub viewer_has_up_voted: bool,
    pub viewer_has_down_voted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_type_param_parsing_is_lenient() {
        assert_eq!(JobType::parse_param("full_time"), Some(JobType::FullTime));
        assert_eq!(JobType::parse_param("internship"), Some(JobType::Internship));
        assert_eq!(JobType::parse_param(""), None);
        assert_eq!(JobType::parse_param("FULL_TIME"), None);
        assert_eq!(JobType::parse_param("plumber"), None);
    }

    #[test]
    fn experience_level_param_parsing_is_lenient() {
        assert_eq!(ExperienceLevel::parse_param("mid"), Some(ExperienceLevel::Mid));
        assert_eq!(ExperienceLevel::parse_param("staff"), None);
    }

    #[test]
    fn post_serializes_with_camel_case_fields() {
        let post = Post {
            id: Uuid::nil(),
            author_id: Uuid::nil(),
            title: "Backend engineer".to_string(),
            description: "Rust backend role".to_string(),
            job_type: JobType::FullTime,
            experience_level: ExperienceLevel::Senior,
            resume_key: "resume-123".to_string(),
            archived: false,
            total_favorites: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["jobType"], "full_time");
        assert_eq!(json["experienceLevel"], "senior");
        assert!(json.get("totalFavorites").is_some());
        assert!(json.get("total_favorites").is_none());
    }
}
