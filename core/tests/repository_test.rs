//! Repository behaviour against the in-memory ticket table

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use ticket_assist_core::{
    Category, Lookup, SaveOutcome, StatusUpdate, TicketDraft, TicketError, TicketId,
    TicketRepository, TicketStatus,
};
use ticket_assist_testing::properties::{any_case_ticket_id, text_without_ticket_id};
use ticket_assist_testing::{
    test_clock, FailingCategorizer, FixedCategorizer, InMemoryTicketStore, TEST_TIMESTAMP,
};

type Repository<C> = TicketRepository<InMemoryTicketStore, C>;

fn repository(store: &InMemoryTicketStore) -> Repository<FixedCategorizer> {
    TicketRepository::new(
        store.clone(),
        FixedCategorizer::new(Category::Refund),
        Arc::new(test_clock()),
    )
}

fn draft(id: &str, content: &str) -> TicketDraft {
    TicketDraft {
        id: Some(id.to_string()),
        content: Some(content.to_string()),
        created_by: Some("rider@example.com".to_string()),
        category: None,
    }
}

fn id(raw: &str) -> TicketId {
    TicketId::parse(raw).unwrap()
}

fn seeded() -> InMemoryTicketStore {
    InMemoryTicketStore::with_default_header()
        .with_row(&["TIC1", "Seat broken", "maintenance", "2024-12-01 10:00:00", "a@b.com", "pending"])
        .with_row(&["TIC2", "Lost bag", "baggage_luggage", "2024-12-02 10:00:00", "c@d.com", "closed"])
}

// ---------------------------------------------------------------------------
// lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_lookup_without_id_never_reads_store() {
    let store = seeded();
    let repo = repository(&store);

    let lookup = repo.lookup("where is my refund?").await.unwrap();

    assert_eq!(lookup, Lookup::InvalidId("where is my refund?".to_string()));
    assert_eq!(lookup.to_string(), "Could not find a valid ticket ID in: where is my refund?");
    assert_eq!(store.calls().reads(), 0);
}

#[tokio::test]
async fn test_lookup_found_renders_ticket() {
    let store = seeded();
    let repo = repository(&store);

    let lookup = repo.lookup("status of tic2 please").await.unwrap();

    assert_eq!(
        lookup.to_string(),
        "Ticket TIC2 (baggage_luggage) was created by c@d.com on 2024-12-02 10:00:00. \
         Status: closed. Content: Lost bag"
    );
}

#[tokio::test]
async fn test_second_lookup_served_from_cache() {
    let store = seeded();
    let repo = repository(&store);

    repo.lookup("TIC1").await.unwrap();
    store.reset_calls();
    let lookup = repo.lookup("TIC1 again").await.unwrap();

    assert!(matches!(lookup, Lookup::Found(ref t) if t.id == id("TIC1")));
    assert_eq!(store.calls().reads(), 0);
}

#[tokio::test]
async fn test_lookup_missing_id() {
    let store = seeded();
    let repo = repository(&store);

    let lookup = repo.lookup("TIC404").await.unwrap();

    assert_eq!(lookup.to_string(), "Ticket ID TIC404 not found in the sheet.");
    assert!(repo.cached(&id("TIC404")).is_none());
}

#[tokio::test]
async fn test_lookup_store_failure_is_an_error() {
    let store = seeded();
    store.fail_reads("network down");
    let repo = repository(&store);

    let err = repo.lookup("TIC1").await.unwrap_err();

    assert!(matches!(err, TicketError::Store(_)));
}

#[tokio::test]
async fn test_invalidate_forces_store_read() {
    let store = seeded();
    let repo = repository(&store);
    repo.lookup("TIC1").await.unwrap();

    assert!(repo.invalidate(&id("TIC1")).is_some());
    store.reset_calls();
    repo.lookup("TIC1").await.unwrap();

    assert_eq!(store.calls().record_reads, 1);
}

// ---------------------------------------------------------------------------
// save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_save_new_ticket_appends_pending_row() {
    let store = seeded();
    let repo = repository(&store);

    let outcome = repo.save(draft("tic3", "Refund not received")).await.unwrap();

    assert_eq!(
        outcome,
        SaveOutcome::Created {
            id: id("TIC3"),
            category: Category::Refund
        }
    );
    assert_eq!(outcome.to_string(), "Ticket 'TIC3' saved successfully (category: refund).");
    assert_eq!(store.row_count(), 3);
    assert_eq!(store.calls().appends, 1);
    assert_eq!(
        store.data_rows()[2],
        vec!["TIC3", "Refund not received", "refund", TEST_TIMESTAMP, "rider@example.com", "pending"]
    );
}

#[tokio::test]
async fn test_resave_overwrites_in_place() {
    let store = seeded();
    let repo = repository(&store);

    let outcome = repo.save(draft("TIC1", "Seat still broken")).await.unwrap();

    assert_eq!(
        outcome.to_string(),
        "Ticket 'TIC1' updated successfully (category: refund)."
    );
    assert_eq!(store.row_count(), 2);
    assert_eq!(store.calls().appends, 0);
    assert_eq!(store.calls().row_updates, 1);
    assert_eq!(store.cell(2, "ticket_content").as_deref(), Some("Seat still broken"));
    assert_eq!(store.cell(2, "ticket_timestamp").as_deref(), Some(TEST_TIMESTAMP));
}

#[tokio::test]
async fn test_resave_preserves_status_in_store_and_cache() {
    let store = seeded();
    let repo = repository(&store);

    repo.save(draft("TIC2", "Lost bag, found tag")).await.unwrap();

    assert_eq!(store.cell(3, "ticket_status").as_deref(), Some("closed"));
    assert_eq!(repo.cached(&id("TIC2")).unwrap().status, TicketStatus::Closed);
}

#[tokio::test]
async fn test_resave_prefers_cached_status() {
    let store = seeded();
    let repo = repository(&store);
    repo.update_status("TIC1, escalated").await.unwrap();

    repo.save(draft("TIC1", "Seat broken in B2")).await.unwrap();

    assert_eq!(store.cell(2, "ticket_status").as_deref(), Some("escalated"));
}

#[tokio::test]
async fn test_supplied_category_skips_categorizer() {
    let store = seeded();
    let categorizer = FixedCategorizer::new(Category::Refund);
    let repo = TicketRepository::new(store.clone(), categorizer.clone(), Arc::new(test_clock()));

    let mut request = draft("TIC5", "Need a wheelchair at the station");
    request.category = Some("Special Assistance".to_string());
    let outcome = repo.save(request).await.unwrap();

    assert!(matches!(outcome, SaveOutcome::Created { category: Category::SpecialAssistance, .. }));
    assert_eq!(categorizer.calls(), 0);
}

#[tokio::test]
async fn test_unknown_supplied_category_is_classified() {
    let store = seeded();
    let categorizer = FixedCategorizer::new(Category::PaymentIssue);
    let repo = TicketRepository::new(store.clone(), categorizer.clone(), Arc::new(test_clock()));

    let mut request = draft("TIC5", "Charged twice");
    request.category = Some("billing".to_string());
    repo.save(request).await.unwrap();

    assert_eq!(categorizer.calls(), 1);
    assert_eq!(store.cell(4, "ticket_category").as_deref(), Some("payment_issue"));
}

#[tokio::test]
async fn test_categorizer_failure_saves_uncategorized() {
    let store = seeded();
    let repo = TicketRepository::new(store.clone(), FailingCategorizer::new(), Arc::new(test_clock()));

    let outcome = repo.save(draft("TIC7", "Something odd")).await.unwrap();

    assert_eq!(outcome.to_string(), "Ticket 'TIC7' saved successfully (category: uncategorized).");
    assert_eq!(store.cell(4, "ticket_category").as_deref(), Some("uncategorized"));
}

#[tokio::test]
async fn test_incomplete_draft_touches_nothing() {
    let store = seeded();
    let repo = repository(&store);

    let mut missing_content = draft("TIC8", "x");
    missing_content.content = Some("   ".to_string());
    let err = repo.save(missing_content).await.unwrap_err();
    assert!(matches!(err, TicketError::MissingField("ticket_content")));

    let mut missing_by = draft("TIC8", "x");
    missing_by.created_by = None;
    let err = repo.save(missing_by).await.unwrap_err();
    assert!(matches!(err, TicketError::MissingField("ticket_by")));

    let err = repo.save(draft("ORDER8", "x")).await.unwrap_err();
    assert!(matches!(err, TicketError::InvalidId(ref raw) if raw == "ORDER8"));

    assert_eq!(store.calls().reads() + store.calls().writes(), 0);
}

#[tokio::test]
async fn test_save_into_blank_table_writes_header_first() {
    let store = InMemoryTicketStore::new();
    let repo = repository(&store);

    repo.save(draft("TIC1", "First ticket")).await.unwrap();

    assert_eq!(store.header_row()[0], "ticket_id");
    assert_eq!(store.row_count(), 1);
    assert_eq!(store.cell(2, "ticket_status").as_deref(), Some("pending"));
}

#[tokio::test]
async fn test_save_follows_reordered_columns() {
    let store = InMemoryTicketStore::with_header(&[
        "ticket_status",
        "ticket_by",
        "notes",
        "ticket_id",
        "ticket_timestamp",
        "ticket_category",
        "ticket_content",
    ])
    .with_row(&["closed", "a@b.com", "VIP rider", "TIC1", "t", "refund", "old"]);
    let repo = repository(&store);

    repo.save(draft("TIC1", "new content")).await.unwrap();
    repo.save(draft("TIC2", "second")).await.unwrap();

    assert_eq!(
        store.data_rows(),
        vec![
            vec!["closed", "rider@example.com", "VIP rider", "TIC1", TEST_TIMESTAMP, "refund", "new content"],
            vec!["pending", "rider@example.com", "", "TIC2", TEST_TIMESTAMP, "refund", "second"],
        ]
    );
}

#[tokio::test]
async fn test_save_write_failure_leaves_cache_untouched() {
    let store = seeded();
    store.fail_writes("quota exceeded");
    let repo = repository(&store);

    let err = repo.save(draft("TIC9", "x")).await.unwrap_err();

    assert_eq!(err.to_string(), "Store unavailable: quota exceeded");
    assert!(repo.cached(&id("TIC9")).is_none());
}

#[tokio::test]
async fn test_save_then_lookup_round_trip() {
    let store = seeded();
    let repo = repository(&store);

    repo.save(draft("TIC99", "AC not working in coach B2")).await.unwrap();
    store.reset_calls();
    let rendered = repo.lookup("TIC99").await.unwrap().to_string();

    assert!(rendered.contains("TIC99"));
    assert!(rendered.contains("AC not working in coach B2"));
    assert!(rendered.contains("pending"));
    assert_eq!(store.calls().reads(), 0);
}

#[tokio::test]
async fn test_dropped_resave_does_not_leave_stale_cache() {
    let store = seeded();
    let repo = repository(&store);
    assert!(repo.lookup("TIC1").await.unwrap().to_string().ends_with("Content: Seat broken"));
    store.slow_writes(Duration::from_millis(200));

    let dropped =
        tokio::time::timeout(Duration::from_millis(50), repo.save(draft("TIC1", "Seat fixed?"))).await;

    assert!(dropped.is_err());
    assert_eq!(store.cell(2, "ticket_content").as_deref(), Some("Seat fixed?"));
    assert!(repo.cached(&id("TIC1")).is_none());
    let lookup = repo.lookup("TIC1").await.unwrap().to_string();
    assert!(lookup.ends_with("Content: Seat fixed?"));
}

// ---------------------------------------------------------------------------
// update_status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_update_status_writes_single_cell() {
    let store = seeded();
    let repo = repository(&store);

    let update = repo.update_status("tic1, Closed").await.unwrap();

    assert_eq!(update.to_string(), "Ticket 'TIC1' status updated to 'closed'.");
    assert_eq!(store.cell(2, "ticket_status").as_deref(), Some("closed"));
    assert_eq!(store.calls().cell_updates, 1);
    assert_eq!(store.calls().row_updates + store.calls().appends, 0);
}

#[tokio::test]
async fn test_update_status_defaults_to_pending() {
    let store = seeded();
    let repo = repository(&store);

    let bare = repo.update_status("TIC2").await.unwrap();
    assert_eq!(
        bare,
        StatusUpdate::Updated {
            id: id("TIC2"),
            status: TicketStatus::Pending
        }
    );

    repo.update_status("TIC2, closed").await.unwrap();
    repo.update_status("TIC2,  ").await.unwrap();
    assert_eq!(store.cell(3, "ticket_status").as_deref(), Some("pending"));
}

#[tokio::test]
async fn test_update_status_on_uncached_id_populates_cache() {
    let store = seeded();
    let repo = repository(&store);
    assert!(repo.cached(&id("TIC1")).is_none());

    repo.update_status("TIC1, closed").await.unwrap();

    let cached = repo.cached(&id("TIC1")).unwrap();
    assert_eq!(cached.status, TicketStatus::Closed);
    assert_eq!(cached.content, "Seat broken");

    store.reset_calls();
    let lookup = repo.lookup("TIC1").await.unwrap();
    assert!(lookup.to_string().contains("Status: closed"));
    assert_eq!(store.calls().reads(), 0);
}

#[tokio::test]
async fn test_update_status_keeps_cached_entry_in_step() {
    let store = seeded();
    let repo = repository(&store);
    repo.lookup("TIC1").await.unwrap();

    repo.update_status("TIC1, closed").await.unwrap();

    assert_eq!(repo.cached(&id("TIC1")).unwrap().status, TicketStatus::Closed);
}

#[tokio::test]
async fn test_dropped_status_update_does_not_leave_stale_cache() {
    let store = seeded();
    let repo = repository(&store);
    repo.lookup("TIC1").await.unwrap();
    store.slow_writes(Duration::from_millis(200));

    let dropped =
        tokio::time::timeout(Duration::from_millis(50), repo.update_status("TIC1, closed")).await;

    assert!(dropped.is_err());
    assert_eq!(store.cell(2, "ticket_status").as_deref(), Some("closed"));
    assert!(repo.lookup("TIC1").await.unwrap().to_string().contains("Status: closed"));
}

#[tokio::test]
async fn test_failed_status_write_evicts_cached_ticket() {
    let store = seeded();
    let repo = repository(&store);
    repo.lookup("TIC1").await.unwrap();
    store.fail_writes("quota exceeded");

    assert!(repo.update_status("TIC1, closed").await.is_err());
    assert!(repo.cached(&id("TIC1")).is_none());
}

#[tokio::test]
async fn test_update_status_missing_id_writes_nothing() {
    let store = seeded();
    let repo = repository(&store);

    let update = repo.update_status("TIC404, closed").await.unwrap();

    assert_eq!(update.to_string(), "Ticket ID 'TIC404' not found.");
    assert_eq!(store.calls().writes(), 0);
}

#[tokio::test]
async fn test_update_status_rejects_malformed_id_without_reading() {
    let store = seeded();
    let repo = repository(&store);

    let err = repo.update_status("please close it, closed").await.unwrap_err();

    assert!(matches!(err, TicketError::InvalidId(ref raw) if raw == "please close it"));
    assert_eq!(store.calls().reads(), 0);
}

// ---------------------------------------------------------------------------
// metrics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_scan_refreshes_cache() {
    let store = seeded();
    let repo = repository(&store);

    let metrics = repo.metrics().await.unwrap();

    assert_eq!(metrics.total, 2);
    assert_eq!(metrics.resolved, 1);
    assert!((metrics.resolution_percentage() - 50.0).abs() < f64::EPSILON);
    assert!(repo.cached(&id("TIC2")).is_some());
}

proptest! {
    #[test]
    fn prop_lookup_canonicalizes_any_case(raw in any_case_ticket_id()) {
        let store = InMemoryTicketStore::with_default_header();
        let repo = repository(&store);
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let lookup = runtime.block_on(repo.lookup(&format!("check {raw}"))).unwrap();

        prop_assert_eq!(lookup, Lookup::NotFound(id(&raw.to_ascii_uppercase())));
    }

    #[test]
    fn prop_text_without_id_never_reads(text in text_without_ticket_id()) {
        let store = seeded();
        let repo = repository(&store);
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let lookup = runtime.block_on(repo.lookup(&text)).unwrap();

        prop_assert!(matches!(lookup, Lookup::InvalidId(_)));
        prop_assert_eq!(store.calls().reads(), 0);
    }
}
