//! Post and comment listing queries: filtering, ordering, pagination.
//!
//! Listings are newest-first (`created_at DESC`, `id DESC` as tie-break) and
//! paginated with a fixed page size. The count pass that produces the page
//! total reuses the exact predicate of the page query, so the pagination
//! metadata always agrees with the rows returned.

use crate::error::Result;
use crate::models::{CommentWithViewerVote, ExperienceLevel, JobType, Post};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Rows per listing page.
pub const PAGE_SIZE: i64 = 12;

/// Conjunctive filter over posts. Absent optional fields impose no
/// constraint; `archived` is a required dimension chosen by the caller per
/// listing type.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Case-insensitive substring match against the title.
    pub search: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub archived: bool,
    /// Restrict to posts written by this user.
    pub author_id: Option<Uuid>,
    /// Restrict to posts favorited by this user.
    pub favorited_by: Option<Uuid>,
}

/// One page of posts plus the page count for the matching set.
#[derive(Debug)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total_pages: i64,
}

/// One page of comments plus the page count for the post's comment set.
#[derive(Debug)]
pub struct CommentPage {
    pub comments: Vec<CommentWithViewerVote>,
    pub total_pages: i64,
}

/// Normalize a raw page query parameter. Absent, unparseable, zero and
/// negative values all mean the first page.
pub fn page_number(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

/// Number of pages needed for `total_rows` rows.
pub fn total_pages(total_rows: i64) -> i64 {
    (total_rows + PAGE_SIZE - 1) / PAGE_SIZE
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Append the filter's WHERE clause. Both the page query and the count query
/// go through here; they must never diverge.
fn push_filters(query: &mut QueryBuilder<Postgres>, filter: &PostFilter) {
    query.push(" WHERE archived = ").push_bind(filter.archived);

    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        query.push(" AND title ILIKE ").push_bind(like_pattern(search));
    }
    if let Some(job_type) = filter.job_type {
        query.push(" AND job_type = ").push_bind(job_type);
    }
    if let Some(level) = filter.experience_level {
        query.push(" AND experience_level = ").push_bind(level);
    }
    if let Some(author_id) = filter.author_id {
        query.push(" AND author_id = ").push_bind(author_id);
    }
    if let Some(user_id) = filter.favorited_by {
        query
            .push(" AND EXISTS (SELECT 1 FROM post_favorites pf WHERE pf.post_id = posts.id AND pf.user_id = ")
            .push_bind(user_id)
            .push(")");
    }
}

/// Fetch one page of posts plus the total page count for the same predicate.
pub async fn fetch_post_page(pool: &PgPool, filter: &PostFilter, page: i64) -> Result<PostPage> {
    let page = page.max(1);
    let offset = (page - 1) * PAGE_SIZE;

    let mut rows_query: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, author_id, title, description, job_type, experience_level, \
         resume_key, archived, total_favorites, created_at, updated_at FROM posts",
    );
    push_filters(&mut rows_query, filter);
    rows_query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(PAGE_SIZE)
        .push(" OFFSET ")
        .push_bind(offset);

    let posts = rows_query
        .build_query_as::<Post>()
        .fetch_all(pool)
        .await?;

    let mut count_query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM posts");
    push_filters(&mut count_query, filter);

    let total_rows: i64 = count_query
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    Ok(PostPage {
        posts,
        total_pages: total_pages(total_rows),
    })
}

/// Fetch one page of a post's comments, newest first, annotated with the
/// viewer's membership in each vote set.
pub async fn fetch_comment_page(
    pool: &PgPool,
    post_id: Uuid,
    viewer_id: Uuid,
    page: i64,
) -> Result<CommentPage> {
    let page = page.max(1);
    let offset = (page - 1) * PAGE_SIZE;

    let comments = sqlx::query_as::<_, CommentWithViewerVote>(
        r#"
        SELECT c.id, c.post_id, c.author_id, c.content,
               c.total_up_likes, c.total_down_likes, c.created_at, c.updated_at,
               EXISTS(SELECT 1 FROM comment_up_likes u
                      WHERE u.comment_id = c.id AND u.user_id = $2) AS viewer_has_up_voted,
               EXISTS(SELECT 1 FROM comment_down_likes d
                      WHERE d.comment_id = c.id AND d.user_id = $2) AS viewer_has_down_voted
        FROM comments c
        WHERE c.post_id = $1
        ORDER BY c.created_at DESC, c.id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(post_id)
    .bind(viewer_id)
    .bind(PAGE_SIZE)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;

    Ok(CommentPage {
        comments,
        total_pages: total_pages(total_rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Execute;

    fn predicate_sql(filter: &PostFilter) -> String {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM posts");
        push_filters(&mut query, filter);
        let built = query.build();
        built.sql().to_string()
    }

    #[test]
    fn page_number_degrades_to_first_page() {
        assert_eq!(page_number(None), 1);
        assert_eq!(page_number(Some("")), 1);
        assert_eq!(page_number(Some("0")), 1);
        assert_eq!(page_number(Some("-3")), 1);
        assert_eq!(page_number(Some("two")), 1);
        assert_eq!(page_number(Some("3")), 3);
        assert_eq!(page_number(Some(" 2 ")), 2);
    }

    #[test]
    fn total_pages_uses_ceiling_division() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(PAGE_SIZE), 1);
        assert_eq!(total_pages(PAGE_SIZE + 1), 2);
        assert_eq!(total_pages(25), 3);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c\\d"), "%c\\\\d%");
    }

    #[test]
    fn absent_filters_impose_no_constraint() {
        let sql = predicate_sql(&PostFilter::default());
        assert!(sql.contains("WHERE archived ="));
        assert!(!sql.contains("job_type"));
        assert!(!sql.contains("experience_level"));
        assert!(!sql.contains("title ILIKE"));
        assert!(!sql.contains("author_id"));
        assert!(!sql.contains("post_favorites"));
    }

    #[test]
    fn supplied_filters_all_join_the_conjunction() {
        let filter = PostFilter {
            search: Some("rust".to_string()),
            job_type: Some(JobType::FullTime),
            experience_level: Some(ExperienceLevel::Senior),
            archived: false,
            author_id: Some(Uuid::nil()),
            favorited_by: Some(Uuid::nil()),
        };
        let sql = predicate_sql(&filter);
        assert!(sql.contains("title ILIKE"));
        assert!(sql.contains("AND job_type ="));
        assert!(sql.contains("AND experience_level ="));
        assert!(sql.contains("AND author_id ="));
        assert!(sql.contains("post_favorites"));
    }

    #[test]
    fn blank_search_is_treated_as_absent() {
        let filter = PostFilter {
            search: Some("   ".to_string()),
            ..PostFilter::default()
        };
        assert!(!predicate_sql(&filter).contains("ILIKE"));
    }

    #[test]
    fn count_and_page_queries_share_one_predicate() {
        let filter = PostFilter {
            search: Some("engineer".to_string()),
            job_type: Some(JobType::Contract),
            archived: true,
            ..PostFilter::default()
        };

        let count_sql = predicate_sql(&filter);

        let mut rows_query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT id FROM posts");
        push_filters(&mut rows_query, &filter);
        let built = rows_query.build();
        let rows_sql = built.sql().to_string();

        let count_predicate = count_sql.split("WHERE").nth(1).unwrap();
        let rows_predicate = rows_sql.split("WHERE").nth(1).unwrap();
        assert_eq!(count_predicate, rows_predicate);
    }
}
