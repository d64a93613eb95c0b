//! Integration tests for the policies table: upsert semantics, listing
//! filters and the queries the answer flow depends on.

mod common;

use crate::common::{create_test_policy, scraped_page, unique, TestHarness};
use policy_core::domains::policies::models::{Policy, PolicyFilter, PolicyUpdate};
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn upsert_inserts_then_updates_scraped_fields_only(ctx: &TestHarness) {
    let identifier = unique("guest-policy");
    let first = Policy::upsert(
        &scraped_page(&identifier, "housing", "Guests may stay two nights."),
        &ctx.db_pool,
    )
    .await
    .unwrap();

    assert!(first.is_active);
    assert!(first.last_scraped_at.is_some());

    let mut rescraped = scraped_page(&identifier, "conduct", "Guests may stay three nights.");
    rescraped.title = "Guest Policy (revised)".to_string();
    rescraped.source_name = "Other Source".to_string();

    let second = Policy::upsert(&rescraped, &ctx.db_pool).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.content, "Guests may stay three nights.");
    assert_eq!(second.title, "Guest Policy (revised)");
    // First-insert values survive re-scrapes
    assert_eq!(second.category, "housing");
    assert_eq!(second.source_name, "Test Source");
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn upsert_keeps_deactivated_policies_inactive(ctx: &TestHarness) {
    let identifier = unique("retired");
    let page = scraped_page(&identifier, "general", "Old policy text.");
    let policy = Policy::upsert(&page, &ctx.db_pool).await.unwrap();

    Policy::set_active(policy.id, false, &ctx.db_pool)
        .await
        .unwrap();
    let again = Policy::upsert(&page, &ctx.db_pool).await.unwrap();

    assert!(!again.is_active);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn find_by_identifier_and_delete(ctx: &TestHarness) {
    let identifier = unique("parking");
    let policy = Policy::upsert(
        &scraped_page(&identifier, "campus", "Permits are required."),
        &ctx.db_pool,
    )
    .await
    .unwrap();

    let found = Policy::find_by_identifier(&identifier, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, policy.id);

    assert!(Policy::delete(policy.id, &ctx.db_pool).await.unwrap());
    assert!(!Policy::delete(policy.id, &ctx.db_pool).await.unwrap());
    assert!(Policy::find_by_id(policy.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn list_filters_by_category_keyword_and_active(ctx: &TestHarness) {
    let category = unique("cat");
    let refund = create_test_policy(&ctx.db_pool, &category, "Refund Policy", "Tuition refunds 100% in week one.")
        .await
        .unwrap();
    let late = create_test_policy(&ctx.db_pool, &category, "Late Fees", "A late fee applies after the due date.")
        .await
        .unwrap();
    Policy::set_active(late.id, false, &ctx.db_pool).await.unwrap();

    let active = Policy::list(
        &PolicyFilter {
            category: Some(category.clone()),
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, refund.id);

    let all = Policy::list(
        &PolicyFilter {
            category: Some(category.clone()),
            include_inactive: true,
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 2);

    // `%` in the keyword matches literally
    let keyword = Policy::list(
        &PolicyFilter {
            category: Some(category.clone()),
            search: Some("100%".to_string()),
            include_inactive: true,
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(keyword.len(), 1);
    assert_eq!(keyword[0].title, "Refund Policy");

    let paged = Policy::list(
        &PolicyFilter {
            category: Some(category),
            include_inactive: true,
            limit: 1,
            offset: 1,
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(paged.len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn find_recent_active_orders_by_update_and_limits(ctx: &TestHarness) {
    let category = unique("recent");
    let older = create_test_policy(&ctx.db_pool, &category, "Older", "first")
        .await
        .unwrap();
    let newer = create_test_policy(&ctx.db_pool, &category, "Newer", "second")
        .await
        .unwrap();

    let recent = Policy::find_recent_active(1, Some(&category), &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, newer.id);

    // Touching the older row moves it to the front
    Policy::update(
        older.id,
        PolicyUpdate {
            summary: Some("touched".to_string()),
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();

    let recent = Policy::find_recent_active(5, Some(&category), &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, older.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn categories_count_active_policies(ctx: &TestHarness) {
    let category = unique("count");
    create_test_policy(&ctx.db_pool, &category, "One", "a").await.unwrap();
    let two = create_test_policy(&ctx.db_pool, &category, "Two", "b").await.unwrap();
    create_test_policy(&ctx.db_pool, &category, "Three", "c").await.unwrap();
    Policy::set_active(two.id, false, &ctx.db_pool).await.unwrap();

    let categories = Policy::categories(&ctx.db_pool).await.unwrap();
    let entry = categories
        .iter()
        .find(|c| c.category == category)
        .expect("category present");
    assert_eq!(entry.count, 2);

    assert!(Policy::count_active(&ctx.db_pool).await.unwrap() >= 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn update_missing_policy_returns_none(ctx: &TestHarness) {
    let result = Policy::update(
        uuid::Uuid::new_v4(),
        PolicyUpdate {
            title: Some("nothing".to_string()),
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert!(result.is_none());
}
