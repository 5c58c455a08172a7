//! Integration tests for `PgStore` against a real database.
//!
//! `#[sqlx::test]` creates a fresh database per test on the server named by
//! `DATABASE_URL` and applies the migrations.
//!
//! - `set_positions` assigns indices and rolls back on a foreign id
//! - duplicate `(sequence, video)` items are a conflict
//! - deleting a video or a sequence cascades to items
//! - removal leaves gaps in `sort_order`
//! - video updates can clear optional columns

use assert_matches::assert_matches;
use seqcraft_core::error::CoreError;
use seqcraft_core::sequence::CreateSequence;
use seqcraft_core::store::{SequenceStore, VideoCatalog};
use seqcraft_core::types::DbId;
use seqcraft_core::video::{CreateVideo, Role, UpdateVideo};
use seqcraft_db::PgStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const OWNER: DbId = 1;

fn new_video(title: &str, role: Role) -> CreateVideo {
    CreateVideo {
        title: title.to_string(),
        description: None,
        url: format!("https://cdn.example.com/{title}.mp4"),
        thumbnail_url: None,
        role,
        duration_seconds: Some(12),
        tags: vec!["demo".to_string()],
    }
}

/// A sequence holding one new video per role, in order. Returns the item ids.
async fn seeded(store: &PgStore, roles: &[Role]) -> (DbId, Vec<DbId>) {
    let sequence = store
        .create_sequence(OWNER, &CreateSequence::from_form("Morning routine", ""))
        .await
        .unwrap();
    let mut items = Vec::new();
    for (i, role) in roles.iter().enumerate() {
        let video = store
            .create_video(OWNER, &new_video(&format!("clip-{i}"), *role))
            .await
            .unwrap();
        let item = store.add_item(sequence.id, video.id, i as i32).await.unwrap();
        items.push(item.id);
    }
    (sequence.id, items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_positions_assigns_indices(pool: PgPool) {
    let store = PgStore::new(pool);
    let (sequence_id, items) = seeded(&store, &[Role::Beginning, Role::Middle, Role::End]).await;

    let reversed: Vec<DbId> = items.iter().rev().copied().collect();
    store.set_positions(sequence_id, &reversed).await.unwrap();

    let view = store.get_sequence_with_items(sequence_id).await.unwrap();
    assert_eq!(view.item_ids(), reversed);
    let positions: Vec<i32> = view.items.iter().map(|i| i.item.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_positions_with_foreign_id_changes_nothing(pool: PgPool) {
    let store = PgStore::new(pool);
    let (sequence_id, items) = seeded(&store, &[Role::Beginning, Role::End]).await;
    let (_, other) = seeded(&store, &[Role::Middle]).await;

    let err = store
        .set_positions(sequence_id, &[items[1], other[0], items[0]])
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "SequenceItem", .. });

    let view = store.get_sequence_with_items(sequence_id).await.unwrap();
    assert_eq!(view.item_ids(), items);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_item_is_conflict(pool: PgPool) {
    let store = PgStore::new(pool);
    let (sequence_id, _) = seeded(&store, &[Role::Beginning]).await;
    let view = store.get_sequence_with_items(sequence_id).await.unwrap();
    let video_id = view.items[0].video.id;

    let err = store.add_item(sequence_id, video_id, 1).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn add_item_to_missing_sequence_is_not_found(pool: PgPool) {
    let store = PgStore::new(pool);
    let video = store
        .create_video(OWNER, &new_video("lonely", Role::Middle))
        .await
        .unwrap();

    let err = store.add_item(9999, video.id, 0).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Sequence", id: 9999 });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deletes_cascade_to_items(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let (sequence_id, _) = seeded(&store, &[Role::Beginning, Role::End]).await;
    let view = store.get_sequence_with_items(sequence_id).await.unwrap();

    store.delete_video(view.items[0].video.id).await.unwrap();
    let view = store.get_sequence_with_items(sequence_id).await.unwrap();
    assert_eq!(view.len(), 1);

    store.delete_sequence(sequence_id).await.unwrap();
    let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sequence_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining.0, 0);
    assert!(store
        .get_sequence_with_items(sequence_id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn removal_leaves_gap(pool: PgPool) {
    let store = PgStore::new(pool);
    let (sequence_id, items) = seeded(&store, &[Role::Beginning, Role::Middle, Role::End]).await;

    store.remove_item(items[1]).await.unwrap();

    let view = store.get_sequence_with_items(sequence_id).await.unwrap();
    let positions: Vec<i32> = view.items.iter().map(|i| i.item.position).collect();
    assert_eq!(positions, vec![0, 2]);
    assert_eq!(view.next_position().unwrap(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn videos_filter_by_role(pool: PgPool) {
    let store = PgStore::new(pool);
    store.create_video(OWNER, &new_video("a", Role::End)).await.unwrap();
    store.create_video(OWNER, &new_video("b", Role::Middle)).await.unwrap();

    let ends = store.list_videos(Some(Role::End)).await.unwrap();
    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].title, "a");
    assert_eq!(ends[0].tags, vec!["demo"]);
    assert_eq!(store.list_videos(None).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_video_finds_by_id(pool: PgPool) {
    let store = PgStore::new(pool);
    let created = store.create_video(OWNER, &new_video("a", Role::End)).await.unwrap();

    let found = store.get_video(created.id).await.unwrap();
    assert_eq!(found.title, "a");
    assert_eq!(found.role, Role::End);

    let err = store.get_video(created.id + 1000).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Video", .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_clears_optional_columns(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut input = new_video("a", Role::Middle);
    input.description = Some("old notes".to_string());
    input.thumbnail_url = Some("https://cdn.example.com/a.jpg".to_string());
    let created = store.create_video(OWNER, &input).await.unwrap();

    // An absent field keeps its value.
    let renamed = store
        .update_video(
            created.id,
            &UpdateVideo {
                title: Some("b".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.description.as_deref(), Some("old notes"));
    assert_eq!(renamed.duration_seconds, Some(12));

    let cleared = store
        .update_video(
            created.id,
            &UpdateVideo {
                description: Some(None),
                thumbnail_url: Some(None),
                duration_seconds: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.title, "b");
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.thumbnail_url, None);
    assert_eq!(cleared.duration_seconds, None);
}
