//! End-to-end moderation gate tests for the place write path
//!
//! These install the process-global word index, so they run serially.

mod common;

use common::{place_model, word_model};
use phin::error::ServiceError;
use phin::orm::places::ApprovalStatus;
use phin::orm::restricted_words::Severity;
use phin::places::{self, NewPlace};
use phin::word_filter::{install_index, WordIndex};
use sea_orm::{DatabaseBackend, MockDatabase};
use serial_test::serial;

fn install_test_index() {
    install_index(WordIndex::from_entries(vec![
        word_model(1, "cặc", Severity::Ban, None),
        word_model(2, "đm", Severity::Warn, Some("đ*")),
    ]));
}

fn new_place(name: &str, description: &str) -> NewPlace {
    NewPlace {
        name: name.to_owned(),
        description: Some(description.to_owned()),
        address: None,
        category_slugs: vec![],
    }
}

#[actix_rt::test]
#[serial]
async fn test_banned_word_rejects_create_and_persists_nothing() {
    install_test_index();
    // No query or exec results are queued: any database access would fail
    // the test, proving the gate rejects before anything is written.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let err = places::create_place(&db, new_place("Cozy Cafe", "quán cặc nhất quận 3"), 1)
        .await
        .unwrap_err();

    match err {
        ServiceError::ContentRejected { words } => {
            assert_eq!(words, vec!["cặc".to_owned()]);
        }
        other => panic!("expected ContentRejected, got {:?}", other),
    }
}

#[actix_rt::test]
#[serial]
async fn test_banned_word_in_name_rejects_update() {
    install_test_index();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![place_model(5, "Cozy Cafe", ApprovalStatus::Approved)]])
        .into_connection();

    let input = places::UpdatePlace {
        description: Some("giá cặc quá".to_owned()),
        ..Default::default()
    };
    let err = places::update_place(&db, 5, input, 1, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ContentRejected { .. }));
}

#[actix_rt::test]
#[serial]
async fn test_warn_word_is_rewritten_and_place_persists() {
    install_test_index();

    let mut stored = place_model(7, "Cozy Cafe", ApprovalStatus::Pending);
    stored.description = Some("ngon nhưng đ* đắt".to_owned());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // Slug uniqueness probe finds no competitors
        .append_query_results([Vec::<phin::orm::places::Model>::new()])
        // INSERT ... RETURNING row
        .append_query_results([vec![stored]])
        .into_connection();

    let created = places::create_place(&db, new_place("Cozy Cafe", "ngon nhưng đm đắt"), 1)
        .await
        .expect("warn-class words must not block the write");

    assert_eq!(created.approval_status, ApprovalStatus::Pending);
    assert_eq!(created.description.as_deref(), Some("ngon nhưng đ* đắt"));

    // The sanitized text, not the submitted text, went to the store
    let log = db.into_transaction_log();
    let logged = format!("{:?}", log);
    assert!(logged.contains("đ* đắt"), "insert should carry the rewritten text");
    assert!(!logged.contains("đm đắt"), "raw warn word must not be persisted");
}

#[actix_rt::test]
#[serial]
async fn test_unknown_category_slug_fails_create() {
    install_test_index();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // Slug resolution returns nothing
        .append_query_results([Vec::<phin::orm::categories::Model>::new()])
        .into_connection();

    let mut input = new_place("Cozy Cafe", "sạch sẽ");
    input.category_slugs = vec!["no-such-category".to_owned()];

    let err = places::create_place(&db, input, 1).await.unwrap_err();
    match err {
        ServiceError::NotFound(msg) => assert!(msg.contains("no-such-category")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}
