//! Sequence assembly controller tests.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{clip, seed, titles, FlakyStore, OWNER};
use seqcraft_core::assembly::SequenceAssembly;
use seqcraft_core::editor::ReorderOutcome;
use seqcraft_core::error::CoreError;
use seqcraft_core::reorder::Direction;
use seqcraft_core::sequence::{CreateSequence, UpdateSequence};
use seqcraft_core::sequence_validation::StructuralIssue;
use seqcraft_core::store::{FixedIdentity, SequenceStore, VideoCatalog};
use seqcraft_core::video::Role;

fn assembly(store: &Arc<FlakyStore>, user: Option<i64>) -> SequenceAssembly<FlakyStore> {
    SequenceAssembly::new(Arc::clone(store), Arc::new(FixedIdentity(user)))
}

#[tokio::test]
async fn build_a_sequence_end_to_end() {
    let store = Arc::new(FlakyStore::new());
    let (sequence, _) = seed(&store, &[("A", Role::Beginning), ("B", Role::Middle)]).await;
    let c = store.inner.create_video(OWNER, &clip("C", Role::End)).await.unwrap();

    let mut ui = assembly(&store, Some(OWNER));
    ui.load().await.unwrap();
    ui.select(sequence.id).await.unwrap();
    assert!(!ui.validation().unwrap().valid);

    // Append the closing clip.
    let item = ui.add_video(c.id).await.unwrap();
    assert_eq!(item.position, 2);
    assert_eq!(titles(ui.active().unwrap()), ["A", "B", "C"]);
    assert!(ui.validation().unwrap().valid);

    // Remove the middle clip; the gap stays.
    let b = ui.active().unwrap().items[1].id();
    ui.remove_item(b).await.unwrap();
    let positions: Vec<i32> = ui
        .active()
        .unwrap()
        .items
        .iter()
        .map(|i| i.item.position)
        .collect();
    assert_eq!(positions, vec![0, 2]);
    assert!(ui.validation().unwrap().valid);

    // Drag the opener behind the closer.
    ui.drag_start(0);
    let outcome = ui.drop_at(1).await.unwrap();
    assert_eq!(outcome, ReorderOutcome::Committed);
    assert_eq!(titles(ui.active().unwrap()), ["C", "A"]);

    let v = ui.validation().unwrap();
    assert!(!v.valid);
    assert!(v.has(StructuralIssue::FirstNotBeginning));
    assert!(v.has(StructuralIssue::LastNotEnd));
    assert!(ui.last_error().is_none());
}

// ---------------------------------------------------------------------------
// Sequence CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_requires_a_signed_in_user() {
    let store = Arc::new(FlakyStore::new());
    let mut ui = assembly(&store, None);

    let err = ui
        .create_sequence(CreateSequence::from_form("Evening", ""))
        .await
        .unwrap_err();

    assert_eq!(err, CoreError::NotAuthenticated);
    assert_eq!(store.count("create_sequence"), 0);
    assert_eq!(ui.last_error(), Some("Not authenticated"));
}

#[tokio::test]
async fn create_with_blank_title_never_reaches_store() {
    let store = Arc::new(FlakyStore::new());
    let mut ui = assembly(&store, Some(OWNER));

    let err = ui
        .create_sequence(CreateSequence::from_form("   ", "notes"))
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::Validation(_));
    assert_eq!(store.count("create_sequence"), 0);
}

#[tokio::test]
async fn create_selects_the_new_sequence() {
    let store = Arc::new(FlakyStore::new());
    let mut ui = assembly(&store, Some(OWNER));

    let created = ui
        .create_sequence(CreateSequence::from_form("  Evening ", "  "))
        .await
        .unwrap();

    assert_eq!(created.title, "Evening");
    assert_eq!(created.description, None);
    assert_eq!(created.user_id, OWNER);
    assert_eq!(ui.sequences().len(), 1);
    assert_eq!(ui.active().unwrap().id(), created.id);
    assert!(ui.active().unwrap().is_empty());
}

#[tokio::test]
async fn updating_the_active_sequence_refreshes_it() {
    let store = Arc::new(FlakyStore::new());
    let (sequence, _) = seed(&store, &[("A", Role::Beginning)]).await;
    let mut ui = assembly(&store, Some(OWNER));
    ui.load().await.unwrap();
    ui.select(sequence.id).await.unwrap();

    ui.update_sequence(sequence.id, UpdateSequence::from_form("Sunrise", "daily"))
        .await
        .unwrap();

    let active = ui.active().unwrap();
    assert_eq!(active.sequence.title, "Sunrise");
    assert_eq!(active.sequence.description.as_deref(), Some("daily"));
    assert_eq!(ui.sequences()[0].title, "Sunrise");
}

#[tokio::test]
async fn deleting_the_active_sequence_clears_selection() {
    let store = Arc::new(FlakyStore::new());
    let (sequence, _) = seed(&store, &[("A", Role::Beginning)]).await;
    let mut ui = assembly(&store, Some(OWNER));
    ui.load().await.unwrap();
    ui.select(sequence.id).await.unwrap();

    ui.delete_sequence(sequence.id).await.unwrap();

    assert!(ui.active().is_none());
    assert!(ui.sequences().is_empty());
    assert!(ui.validation().is_none());
}

#[tokio::test]
async fn selecting_a_missing_sequence_reports_not_found() {
    let store = Arc::new(FlakyStore::new());
    let mut ui = assembly(&store, Some(OWNER));

    let err = ui.select(999).await.unwrap_err();

    assert_matches!(err, CoreError::NotFound { entity: "Sequence", id: 999 });
    assert!(ui.active().is_none());
    assert!(ui.last_error().is_some());
}

#[tokio::test]
async fn sequence_deleted_elsewhere_is_deselected_on_next_reload() {
    let store = Arc::new(FlakyStore::new());
    let (sequence, _) = seed(&store, &[("A", Role::Beginning)]).await;
    let extra = store.inner.create_video(OWNER, &clip("B", Role::End)).await.unwrap();
    let mut ui = assembly(&store, Some(OWNER));
    ui.load().await.unwrap();
    ui.select(sequence.id).await.unwrap();

    store.inner.delete_sequence(sequence.id).await.unwrap();
    let err = ui.add_video(extra.id).await.unwrap_err();

    assert!(err.is_not_found());
    assert!(ui.active().is_none());
    assert!(ui.last_error().is_some());
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn candidates_exclude_videos_already_in_sequence() {
    let store = Arc::new(FlakyStore::new());
    let (sequence, videos) = seed(&store, &[("A", Role::Beginning), ("B", Role::Middle)]).await;
    let c = store.inner.create_video(OWNER, &clip("C", Role::End)).await.unwrap();
    let d = store.inner.create_video(OWNER, &clip("D", Role::Middle)).await.unwrap();
    let mut ui = assembly(&store, Some(OWNER));
    ui.load().await.unwrap();

    // Without a selection every video is offered.
    assert_eq!(ui.candidates(None).len(), 4);

    ui.select(sequence.id).await.unwrap();
    let ids: Vec<i64> = ui.candidates(None).iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![d.id, c.id]);
    let middles: Vec<i64> = ui.candidates(Some(Role::Middle)).iter().map(|v| v.id).collect();
    assert_eq!(middles, vec![d.id]);
    assert!(ui.candidates(Some(Role::Beginning)).is_empty());

    // A present video is refused without contacting the store.
    store.reset_calls();
    let err = ui.add_video(videos[0].id).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert_eq!(store.count("add_item"), 0);
}

#[tokio::test]
async fn adding_without_selection_is_rejected() {
    let store = Arc::new(FlakyStore::new());
    let v = store.inner.create_video(OWNER, &clip("A", Role::Beginning)).await.unwrap();
    let mut ui = assembly(&store, Some(OWNER));
    ui.load().await.unwrap();

    let err = ui.add_video(v.id).await.unwrap_err();

    assert_matches!(err, CoreError::Validation(_));
    assert_eq!(store.count("add_item"), 0);
}

#[tokio::test]
async fn adding_an_unknown_video_is_not_found() {
    let store = Arc::new(FlakyStore::new());
    let (sequence, _) = seed(&store, &[("A", Role::Beginning)]).await;
    let mut ui = assembly(&store, Some(OWNER));
    ui.load().await.unwrap();
    ui.select(sequence.id).await.unwrap();

    let err = ui.add_video(4242).await.unwrap_err();

    assert_matches!(err, CoreError::NotFound { entity: "Video", id: 4242 });
    // The sequence itself is still there, so the selection survives.
    assert!(ui.active().is_some());
}

// ---------------------------------------------------------------------------
// Reordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rollback_is_reported_as_an_error_message() {
    let store = Arc::new(FlakyStore::new());
    let (sequence, _) = seed(&store, &[("A", Role::Beginning), ("B", Role::End)]).await;
    let mut ui = assembly(&store, Some(OWNER));
    ui.load().await.unwrap();
    ui.select(sequence.id).await.unwrap();

    store.fail_next_set_positions(0);
    let outcome = ui.move_item(0, Direction::Down).await.unwrap();

    assert_matches!(outcome, ReorderOutcome::RolledBack { .. });
    assert_eq!(titles(ui.active().unwrap()), ["A", "B"]);
    assert_eq!(ui.last_error(), Some("Store error: update timed out"));

    ui.clear_error();
    assert!(ui.last_error().is_none());
}

#[tokio::test]
async fn reorder_without_selection_is_a_noop() {
    let store = Arc::new(FlakyStore::new());
    let mut ui = assembly(&store, Some(OWNER));

    ui.drag_start(0);
    assert_eq!(ui.drop_at(1).await.unwrap(), ReorderOutcome::Unchanged);
    assert_eq!(
        ui.move_item(0, Direction::Down).await.unwrap(),
        ReorderOutcome::Unchanged
    );
    assert!(ui.drag_state().is_none());
    assert_eq!(store.count("set_positions"), 0);
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn play_all_walks_the_sequence_in_order() {
    let store = Arc::new(FlakyStore::new());
    let (sequence, _) = seed(
        &store,
        &[("A", Role::Beginning), ("B", Role::Middle), ("C", Role::End)],
    )
    .await;
    let mut ui = assembly(&store, Some(OWNER));
    assert!(!ui.play_all());

    ui.select(sequence.id).await.unwrap();
    assert!(ui.play_all());

    let mut played = vec![ui.now_playing().unwrap().title.clone()];
    ui.clip_ended();
    while let Some(v) = ui.now_playing() {
        played.push(v.title.clone());
        ui.clip_ended();
    }
    assert_eq!(played, ["A", "B", "C"]);
}

#[tokio::test]
async fn switching_sequences_stops_playback() {
    let store = Arc::new(FlakyStore::new());
    let (first, _) = seed(&store, &[("A", Role::Beginning)]).await;
    let (second, _) = seed(&store, &[("B", Role::End)]).await;
    let mut ui = assembly(&store, Some(OWNER));

    ui.select(first.id).await.unwrap();
    ui.play_all();
    assert!(ui.now_playing().is_some());

    ui.select(second.id).await.unwrap();
    assert!(ui.now_playing().is_none());

    ui.play_all();
    ui.stop_playback();
    assert!(ui.now_playing().is_none());
}
