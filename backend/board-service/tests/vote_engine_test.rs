//! Store-backed tests for the comment vote engine.
//!
//! Each test exercises the full transactional path (row lock, membership
//! mutation, counter update) against a real PostgreSQL instance and then
//! checks the engine's invariants: counters equal set cardinality and no
//! user is ever in both vote sets.

mod common;

use board_service::services::votes::{VoteKind, VoteService};
use uuid::Uuid;

#[tokio::test]
async fn down_vote_then_up_vote_switches() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let author = common::seed_user(&pool).await;
    let voter = common::seed_user(&pool).await;
    let post = common::seed_post(&pool, author, "switch semantics").await;
    let comment = common::seed_comment(&pool, post, author).await;

    let engine = VoteService::new(pool.clone());

    let after_down = engine
        .apply_vote(comment, voter, VoteKind::Down)
        .await
        .expect("down vote");
    assert_eq!(after_down.total_down_likes, 1);
    assert_eq!(after_down.total_up_likes, 0);

    let after_up = engine
        .apply_vote(comment, voter, VoteKind::Up)
        .await
        .expect("switch to up vote");
    assert_eq!(after_up.total_up_likes, 1);
    assert_eq!(after_up.total_down_likes, 0);

    let (up_total, down_total, up_rows, down_rows) = common::comment_counts(&pool, comment).await;
    assert_eq!((up_total, down_total), (1, 0));
    assert_eq!((up_rows, down_rows), (1, 0));
}

#[tokio::test]
async fn double_up_vote_is_a_round_trip() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let author = common::seed_user(&pool).await;
    let voter = common::seed_user(&pool).await;
    let post = common::seed_post(&pool, author, "double toggle").await;
    let comment = common::seed_comment(&pool, post, author).await;

    let engine = VoteService::new(pool.clone());
    engine
        .apply_vote(comment, voter, VoteKind::Up)
        .await
        .expect("first up vote");
    let after = engine
        .apply_vote(comment, voter, VoteKind::Up)
        .await
        .expect("second up vote retracts");

    assert_eq!(after.total_up_likes, 0);
    assert_eq!(after.total_down_likes, 0);

    let (up_total, down_total, up_rows, down_rows) = common::comment_counts(&pool, comment).await;
    assert_eq!((up_total, down_total, up_rows, down_rows), (0, 0, 0, 0));
}

#[tokio::test]
async fn counters_track_set_cardinality_across_a_mixed_sequence() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let author = common::seed_user(&pool).await;
    let alice = common::seed_user(&pool).await;
    let bob = common::seed_user(&pool).await;
    let post = common::seed_post(&pool, author, "mixed sequence").await;
    let comment = common::seed_comment(&pool, post, author).await;

    let engine = VoteService::new(pool.clone());
    let script = [
        (alice, VoteKind::Up),
        (bob, VoteKind::Down),
        (alice, VoteKind::Down),
        (bob, VoteKind::Down),
        (alice, VoteKind::Down),
        (bob, VoteKind::Up),
    ];
    for (user, kind) in script {
        engine.apply_vote(comment, user, kind).await.expect("vote");

        let (up_total, down_total, up_rows, down_rows) =
            common::comment_counts(&pool, comment).await;
        assert_eq!(up_total, up_rows, "up counter drifted from membership");
        assert_eq!(down_total, down_rows, "down counter drifted from membership");

        let both: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM comment_up_likes u
            JOIN comment_down_likes d
              ON d.comment_id = u.comment_id AND d.user_id = u.user_id
            WHERE u.comment_id = $1
            "#,
        )
        .bind(comment)
        .fetch_one(&pool)
        .await
        .expect("overlap query");
        assert_eq!(both, 0, "a user ended up in both vote sets");
    }

    // alice: up, down, down -> no vote; bob: down, down, up -> up vote
    let (up_total, down_total, _, _) = common::comment_counts(&pool, comment).await;
    assert_eq!((up_total, down_total), (1, 0));
}

#[tokio::test]
async fn voting_on_a_missing_comment_is_not_found() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let voter = common::seed_user(&pool).await;

    let engine = VoteService::new(pool.clone());
    let err = engine
        .apply_vote(Uuid::new_v4(), voter, VoteKind::Up)
        .await
        .expect_err("voting on a missing comment must fail");
    assert_eq!(err.kind(), "not_found");
}
