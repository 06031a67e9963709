//! HTTP handlers for board-service
//!
//! Handlers only convert between HTTP and the service layer; all business
//! logic lives under [`crate::services`]. Successful responses share the
//! `{status, message, data?, totalPages?}` envelope.
pub mod comments;
pub mod posts;
pub mod users;

// Re-export handler functions at module level
pub use comments::{
    create_comment, delete_comment, downvote_comment, post_comments, update_comment,
    upvote_comment,
};
pub use posts::{
    archive_post, archived_posts, create_post, delete_post, favorite_post, favorite_posts,
    get_post, is_favorite_post, list_posts, my_posts, unarchive_post, update_post,
};
pub use users::{get_me, register_user, update_me};

use serde::Serialize;

/// Uniform success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(rename = "totalPages", skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self {
            status: "success",
            message,
            data: Some(data),
            total_pages: None,
        }
    }

    pub fn paginated(message: &'static str, data: T, total_pages: i64) -> Self {
        Self {
            status: "success",
            message,
            data: Some(data),
            total_pages: Some(total_pages),
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: &'static str) -> Self {
        Self {
            status: "success",
            message,
            data: None,
            total_pages: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_absent_fields() {
        let json = serde_json::to_value(ApiResponse::message_only("post deleted successfully"))
            .unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("data").is_none());
        assert!(json.get("totalPages").is_none());
    }

    #[test]
    fn paginated_envelope_exposes_total_pages() {
        let json =
            serde_json::to_value(ApiResponse::paginated("posts fetched", vec![1, 2, 3], 3))
                .unwrap();
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }
}
