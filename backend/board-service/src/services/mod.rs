//! Business logic layer for board-service
//!
//! - `listing`: the paginated, filtered post and comment listing queries
//! - `votes`: the comment vote engine
//! - `posts` / `comments` / `users`: entity services
//! - `moderation`: comment content screening
pub mod comments;
pub mod listing;
pub mod moderation;
pub mod posts;
pub mod users;
pub mod votes;

// Re-export commonly used services
pub use comments::CommentService;
pub use posts::PostService;
pub use users::UserService;
pub use votes::VoteService;
