mod common;

use bookmarks_service::services::{CounterStore, Ranking, ViewCounter};
use common::{MemoryCounterStore, TestApp};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn increment_returns_running_total() {
    let store = Arc::new(MemoryCounterStore::default());
    let counter = ViewCounter::new(store.clone());
    let item = Uuid::new_v4();

    for expected in 1..=5 {
        assert_eq!(counter.increment(item).await.unwrap(), expected);
    }
    assert_eq!(counter.views(item).await.unwrap(), 5);

    let top = store.top_with_scores(1).await.unwrap();
    assert_eq!(top, vec![(item, 5.0)]);
}

#[tokio::test]
async fn top_n_is_bounded_and_non_increasing() {
    let store = Arc::new(MemoryCounterStore::default());
    let ranking = Ranking::new(store.clone());
    let views = [3, 9, 1, 9, 4, 7];
    let ids: Vec<Uuid> = views
        .iter()
        .map(|v| {
            let id = Uuid::new_v4();
            store.set_views(id, *v);
            id
        })
        .collect();

    let top = ranking.top_n(4).await.unwrap();
    assert_eq!(top.len(), 4);

    let mut scores = Vec::new();
    for id in &top {
        scores.push(store.views(*id).await.unwrap());
    }
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(scores, vec![9, 9, 7, 4]);

    assert_eq!(ranking.top_n(100).await.unwrap().len(), ids.len());
    assert!(ranking.top_n(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn ties_are_ordered_by_ascending_id() {
    let store = Arc::new(MemoryCounterStore::default());
    let ranking = Ranking::new(store.clone());

    let leader = Uuid::from_u128(50);
    store.set_views(leader, 10);
    for n in [7u128, 3, 9, 1] {
        store.set_views(Uuid::from_u128(n), 2);
    }

    // The store hands back the highest ids first among equal scores;
    // the cut must still keep the lowest ones.
    let top = ranking.top_n(3).await.unwrap();
    assert_eq!(top, vec![leader, Uuid::from_u128(1), Uuid::from_u128(3)]);
}

#[tokio::test]
async fn empty_ranking_is_not_an_error() {
    let ranking = Ranking::new(Arc::new(MemoryCounterStore::default()));
    assert!(ranking.top_n(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn image_detail_counts_views() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let image = app.image(owner, "Harbour").await;

    let first = app.state.images.detail(image.id, &image.slug).await.unwrap();
    let second = app.state.images.detail(image.id, &image.slug).await.unwrap();
    assert_eq!(first.total_views, 1);
    assert_eq!(second.total_views, 2);

    assert!(app.state.images.detail(image.id, "wrong-slug").await.is_err());
    assert_eq!(app.counters.views(image.id).await.unwrap(), 2);
}

#[tokio::test]
async fn image_ranking_follows_rank_order_and_skips_missing() {
    let app = TestApp::new();
    let owner = app.user("owner").await;
    let popular = app.image(owner, "Popular").await;
    let middling = app.image(owner, "Middling").await;
    let deleted = app.image(owner, "Deleted").await;

    app.counters.set_views(popular.id, 30);
    app.counters.set_views(deleted.id, 20);
    app.counters.set_views(middling.id, 10);
    app.images.remove(deleted.id);

    let ranked = app.state.images.ranking(3).await.unwrap();
    let titles: Vec<&str> = ranked.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Popular", "Middling"]);
}
