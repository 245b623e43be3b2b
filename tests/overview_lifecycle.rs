use std::sync::Arc;

use chrono::{TimeZone, Utc};
use series_overview::prelude::*;

fn ts(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn key() -> SeriesKey {
    SeriesKey::bar("rb2410", Exchange::Shfe, Interval::Minute)
}

#[tokio::test]
async fn test_write_merge_delete_scenario() {
    let tracker = OverviewTracker::new(Arc::new(InMemoryMetadataStore::new()));

    let overview = tracker
        .record_write(&key(), &[ts(100), ts(105), ts(103)], 3)
        .await
        .unwrap();
    assert_eq!((overview.start, overview.end, overview.count), (ts(100), ts(105), 3));

    let overview = tracker
        .record_write(&key(), &[ts(90), ts(110)], 5)
        .await
        .unwrap();
    assert_eq!((overview.start, overview.end, overview.count), (ts(90), ts(110), 5));

    assert!(tracker.record_delete(&key()).await.unwrap());
    assert!(tracker.get_overview(&key()).await.unwrap().is_none());
    assert!(!tracker.record_delete(&key()).await.unwrap());
}

#[tokio::test]
async fn test_listing_never_contains_placeholders() {
    let store = Arc::new(InMemoryMetadataStore::new());
    let tracker = OverviewTracker::new(Arc::clone(&store));
    assert!(store.is_empty().await);

    for symbol in ["A", "B", "C"] {
        let key = SeriesKey::tick(symbol, Exchange::Sse);
        tracker.record_write(&key, &[ts(1)], 1).await.unwrap();
    }
    tracker
        .record_delete(&SeriesKey::tick("B", Exchange::Sse))
        .await
        .unwrap();

    let listed = tracker.list_overviews_sorted().await.unwrap();
    let symbols: Vec<&str> = listed.iter().map(|o| o.key.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["A", "C"]);
    assert!(listed.iter().all(|o| o.count > 0 && o.start <= o.end));
}

#[tokio::test]
async fn test_database_round_trip() {
    let db = SeriesDatabase::in_memory(DatabaseConfig::new("research")).unwrap();

    let bars: Vec<BarData> = [100, 105, 103]
        .into_iter()
        .map(|s| {
            BarData::new("rb2410", Exchange::Shfe, Interval::Minute, ts(s))
                .with_ohlc(dec!(1), dec!(2), dec!(1), dec!(2))
        })
        .collect();
    db.save_bar_data(&bars).await.unwrap();

    let more: Vec<BarData> = [90, 110]
        .into_iter()
        .map(|s| BarData::new("rb2410", Exchange::Shfe, Interval::Minute, ts(s)))
        .collect();
    let overview = db.save_bar_data(&more).await.unwrap().unwrap();
    assert_eq!((overview.start, overview.end, overview.count), (ts(90), ts(110), 5));

    let loaded = db
        .load_bar_data("rb2410", Exchange::Shfe, Interval::Minute, ts(0), ts(1_000))
        .await
        .unwrap();
    let stamps: Vec<Timestamp> = loaded.iter().map(|b| b.datetime).collect();
    assert_eq!(stamps, vec![ts(90), ts(100), ts(103), ts(105), ts(110)]);

    let removed = db
        .delete_bar_data("rb2410", Exchange::Shfe, Interval::Minute)
        .await
        .unwrap();
    assert_eq!(removed, 5);
    assert!(db.tracker().get_overview(&key()).await.unwrap().is_none());
    assert!(db.get_bar_overview().await.unwrap().is_empty());
}
