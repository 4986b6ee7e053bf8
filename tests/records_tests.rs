use fifteen::records::{
    InMemoryMatchStore, MatchPlayer, MatchRecord, MatchStore, RatingTrend, StoreError,
};
use fifteen::RECENT_MATCHES_LIMIT;

fn player(uid: &str, rating: f64, rv: f64) -> MatchPlayer {
    MatchPlayer {
        uid: uid.into(),
        name: uid.to_uppercase(),
        rating,
        rv,
    }
}

fn record(id: &str, black: &str, white: &str, timestamp: i64) -> MatchRecord {
    MatchRecord {
        id: id.into(),
        black: player(black, 1500.0, 8.0),
        white: player(white, 1500.0, -8.0),
        timestamp,
    }
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let store = InMemoryMatchStore::new();
    store.insert(record("a", "ana", "bob", 1));
    assert_eq!(store.get_by_id("a").await.unwrap().black.uid, "ana");
    let err = store.get_by_id("zzz").await.unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            collection: "matches",
            id: "zzz".into()
        }
    );
    assert_eq!(err.to_string(), "matches/zzz not found");
}

#[tokio::test]
async fn listing_is_newest_first_and_capped() {
    let store = InMemoryMatchStore::new();
    for i in 0..30 {
        let (black, white) = if i % 2 == 0 { ("ana", "bob") } else { ("cid", "ana") };
        store.insert(record(&format!("m{}", i), black, white, i * 10));
    }
    store.insert(record("other", "bob", "cid", 10_000));

    let listed = store.list_by_player_id("ana").await.unwrap();
    assert_eq!(listed.len(), RECENT_MATCHES_LIMIT);
    assert!(listed.iter().all(|r| r.involves("ana")));
    assert!(listed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    assert_eq!(listed[0].id, "m29");

    let bob = store.list_by_player_id("bob").await.unwrap();
    assert_eq!(bob.len(), 16);
    assert_eq!(bob[0].id, "other");
    assert!(store.list_by_player_id("nobody").await.unwrap().is_empty());
}

#[test]
fn rating_display_and_trend() {
    let p = player("ana", 1512.6, 12.4);
    assert_eq!(p.display_rating(), 1513);
    assert_eq!(p.rating_trend(), RatingTrend::Gain);
    assert_eq!(player("b", 1400.0, -3.0).rating_trend(), RatingTrend::Loss);
    assert_eq!(player("c", 1400.0, 0.0).rating_trend(), RatingTrend::Unchanged);
}
