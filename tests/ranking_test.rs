//! View tracking and hot-score persistence

mod common;

use common::place_model;
use phin::error::ServiceError;
use phin::orm::places::ApprovalStatus;
use phin::ranking::{record_view, reset_weekly_stats};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

#[actix_rt::test]
async fn test_record_view_bumps_counters_then_refreshes_scores() {
    let mut place = place_model(9, "Cozy Cafe", ApprovalStatus::Approved);
    place.view_count = 10;
    place.weekly_views = 3;
    place.average_rating = 4.0;
    place.total_ratings = 10;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            // counter increment
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            // score write
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .append_query_results([vec![place]])
        .into_connection();

    record_view(&db, 9).await.unwrap();

    let logged = format!("{:?}", db.into_transaction_log());
    // Increment happens in SQL, not read-modify-write
    assert!(logged.contains(r#""view_count" = "view_count" + "#), "got: {}", logged);
    assert!(logged.contains(r#""weekly_views" = "weekly_views" + "#), "got: {}", logged);
    // hot_score(10, 4.0, 10) = log10(11)*10 + 4.0*1.0*20 = 90.41
    assert!(logged.contains("90.41"), "all-time score missing: {}", logged);
    // hot_score(3, 4.0, 10) = log10(4)*10 + 80 = 86.02
    assert!(logged.contains("86.02"), "weekly score missing: {}", logged);
}

#[actix_rt::test]
async fn test_record_view_unknown_place() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let err = record_view(&db, 404).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[actix_rt::test]
async fn test_reset_weekly_stats_zeroes_weekly_columns_only() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 12,
        }])
        .into_connection();

    reset_weekly_stats(&db).await.unwrap();

    let logged = format!("{:?}", db.into_transaction_log());
    assert!(logged.contains("weekly_views"));
    assert!(logged.contains("weekly_hot_score"));
    assert!(!logged.contains(r#""view_count""#), "all-time counter must survive the reset");
    assert!(!logged.contains(r#""hot_score""#), "all-time score must survive the reset");
}
