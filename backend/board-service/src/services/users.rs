//! User profile service.
//!
//! Registration is driven by the session gateway on first OAuth login; this
//! service only stores the profile. Profile links are validated against the
//! same patterns the web client applies.

use crate::error::{AppError, Result};
use crate::models::User;
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use uuid::Uuid;

lazy_static! {
    static ref LINKEDIN_PATTERN: Regex =
        Regex::new(r"^(https?://)?([\w]+\.)?linkedin\.com/in/[-a-zA-Z0-9]+/?$")
            .expect("invalid linkedin pattern");
    static ref GITHUB_PATTERN: Regex =
        Regex::new(r"^(https?://)?(www\.)?github\.com/[a-zA-Z0-9_-]{1,39}/?$")
            .expect("invalid github pattern");
    static ref URL_PATTERN: Regex =
        Regex::new(r"^((https?|ftp)://)?(www\.)?[a-zA-Z0-9_-]+(\.[a-zA-Z]+)+(/[\w#-]+)*/?$")
            .expect("invalid url pattern");
}

/// Partial profile update; absent fields keep their stored value.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub description: Option<String>,
    pub linkedin_link: Option<String>,
    pub github_link: Option<String>,
    pub other_link: Option<String>,
    pub language: Option<String>,
    pub theme: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a user. Called by the session gateway on first login;
    /// re-registering the same OAuth identity is a conflict.
    pub async fn create_user(&self, oauth_id: &str, fullname: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (oauth_id, fullname)
            VALUES ($1, $2)
            RETURNING id, oauth_id, fullname, description, linkedin_link, github_link,
                      other_link, language, theme, created_at, updated_at
            "#,
        )
        .bind(oauth_id)
        .bind(fullname)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("a user with this OAuth identity already exists".to_string())
            }
            other => AppError::from(other),
        })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, oauth_id, fullname, description, linkedin_link, github_link,
                   other_link, language, theme, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update the user's profile; only supplied fields change.
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User> {
        validate_link(update.linkedin_link.as_deref(), &LINKEDIN_PATTERN, "LinkedIn")?;
        validate_link(update.github_link.as_deref(), &GITHUB_PATTERN, "GitHub")?;
        validate_link(update.other_link.as_deref(), &URL_PATTERN, "website")?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET description = COALESCE($2, description),
                linkedin_link = COALESCE($3, linkedin_link),
                github_link = COALESCE($4, github_link),
                other_link = COALESCE($5, other_link),
                language = COALESCE($6, language),
                theme = COALESCE($7, theme),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, oauth_id, fullname, description, linkedin_link, github_link,
                      other_link, language, theme, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(update.description)
        .bind(update.linkedin_link)
        .bind(update.github_link)
        .bind(update.other_link)
        .bind(update.language)
        .bind(update.theme)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| AppError::NotFound(format!("user {user_id} does not exist")))
    }
}

fn validate_link(link: Option<&str>, pattern: &Regex, label: &str) -> Result<()> {
    match link {
        Some(value) if !pattern.is_match(value) => Err(AppError::Validation(format!(
            "invalid {label} link: {value}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_profile_links() {
        assert!(LINKEDIN_PATTERN.is_match("https://www.linkedin.com/in/jane-doe"));
        assert!(LINKEDIN_PATTERN.is_match("linkedin.com/in/jane-doe/"));
        assert!(GITHUB_PATTERN.is_match("https://github.com/janedoe"));
        assert!(GITHUB_PATTERN.is_match("github.com/jane-doe"));
        assert!(URL_PATTERN.is_match("https://janedoe.dev"));
        assert!(URL_PATTERN.is_match("www.example.com/portfolio"));
    }

    #[test]
    fn rejects_malformed_profile_links() {
        assert!(!LINKEDIN_PATTERN.is_match("https://example.com/in/jane"));
        assert!(!GITHUB_PATTERN.is_match("https://gitlab.com/janedoe"));
        assert!(!URL_PATTERN.is_match("not a url"));
    }

    #[test]
    fn absent_links_are_not_validated() {
        assert!(validate_link(None, &GITHUB_PATTERN, "GitHub").is_ok());
    }

    #[test]
    fn present_invalid_link_is_a_validation_error() {
        let err = validate_link(Some("ftp:nope"), &GITHUB_PATTERN, "GitHub").unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }
}
