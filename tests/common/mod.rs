//! Shared fixtures for integration tests

use chrono::NaiveDateTime;
use phin::orm::categories::{self, CategoryKind};
use phin::orm::places::{self, ApprovalStatus, PlaceStatus};
use phin::orm::ratings;
use phin::orm::restricted_words::{self, Severity};
use phin::text::normalize;
use phin::word_filter::default_replacement;

#[allow(dead_code)]
pub fn place_model(id: i32, name: &str, approval: ApprovalStatus) -> places::Model {
    places::Model {
        id,
        name: name.to_owned(),
        slug: phin::text::slugify(name),
        description: None,
        address: None,
        status: PlaceStatus::Active,
        approval_status: approval,
        rejection_reason: None,
        reviewed_by: None,
        average_rating: 0.0,
        total_ratings: 0,
        view_count: 0,
        hot_score: 0.0,
        weekly_views: 0,
        weekly_hot_score: 0.0,
        created_by: 1,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

#[allow(dead_code)]
pub fn category_model(id: i32, name: &str, kind: CategoryKind) -> categories::Model {
    categories::Model {
        id,
        name: name.to_owned(),
        slug: phin::text::slugify(name),
        kind,
        description: None,
        thumbnail_url: None,
        created_at: NaiveDateTime::default(),
    }
}

#[allow(dead_code)]
pub fn rating_model(
    id: i32,
    place_id: i32,
    user_id: i32,
    scores: [Option<i16>; 5],
) -> ratings::Model {
    let [drink_quality, location, price, service, staff_attitude] = scores;
    ratings::Model {
        id,
        place_id,
        user_id,
        drink_quality,
        location,
        price,
        service,
        staff_attitude,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

#[allow(dead_code)]
pub fn word_model(
    id: i32,
    word: &str,
    severity: Severity,
    replacement: Option<&str>,
) -> restricted_words::Model {
    restricted_words::Model {
        id,
        word: word.to_owned(),
        normalized: normalize(word),
        severity,
        replacement: replacement
            .map(str::to_owned)
            .unwrap_or_else(|| default_replacement(word)),
        created_by: None,
        created_at: NaiveDateTime::default(),
    }
}
