#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, unreachable_pub)]
use axum::http::StatusCode;
use serde_json::json;
mod common;

#[tokio::test]
async fn test_stats_on_empty_store() {
    let app = common::TestApp::spawn().await;

    let (status, stats) = app.get_json("/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({
            "total_messages": 0,
            "senders_count": 0,
            "messages_per_sender": [],
            "first_message_ts": null,
            "last_message_ts": null,
        })
    );
}

#[tokio::test]
async fn test_stats_counts_and_range() {
    let app = common::TestApp::spawn().await;

    app.ingest("m1", "+111", "2025-01-15T10:00:00Z", None).await;
    app.ingest("m2", "+222", "2025-01-15T08:00:00Z", None).await;
    app.ingest("m3", "+222", "2025-01-16T10:00:00Z", None).await;
    app.ingest("m4", "+333", "2025-01-15T12:00:00Z", None).await;
    app.ingest("m5", "+222", "2025-01-15T11:00:00Z", None).await;
    app.ingest("m6", "+333", "2025-01-15T13:00:00Z", None).await;
    // Redelivery must not change the numbers.
    app.ingest("m1", "+111", "2025-01-15T10:00:00Z", None).await;

    let (_, stats) = app.get_json("/stats").await;
    assert_eq!(stats["total_messages"], 6);
    assert_eq!(stats["senders_count"], 3);
    assert_eq!(
        stats["messages_per_sender"],
        json!([
            { "from": "+222", "count": 3 },
            { "from": "+333", "count": 2 },
            { "from": "+111", "count": 1 },
        ])
    );
    assert_eq!(stats["first_message_ts"], "2025-01-15T08:00:00.000000Z");
    assert_eq!(stats["last_message_ts"], "2025-01-16T10:00:00.000000Z");
}

#[tokio::test]
async fn test_top_senders_are_capped_and_ties_break_by_sender() {
    let app = common::TestApp::spawn().await;

    // Twelve senders with one message each; the ten smallest numbers win.
    for i in (10..22).rev() {
        app.ingest(&format!("m{i}"), &format!("+1555000{i}"), "2025-01-15T10:00:00Z", None).await;
    }

    let (_, stats) = app.get_json("/stats").await;
    assert_eq!(stats["total_messages"], 12);
    assert_eq!(stats["senders_count"], 12);

    let senders: Vec<&str> =
        stats["messages_per_sender"].as_array().unwrap().iter().map(|e| e["from"].as_str().unwrap()).collect();
    let expected: Vec<String> = (10..20).map(|i| format!("+1555000{i}")).collect();
    assert_eq!(senders, expected);
}

#[tokio::test]
async fn test_stats_agree_with_message_listing() {
    let app = common::TestApp::spawn().await;

    for i in 0..5 {
        let sender = if i % 2 == 0 { "+100" } else { "+200" };
        app.ingest(&format!("m{i}"), sender, &format!("2025-01-15T10:0{i}:00Z"), None).await;
    }

    let (_, stats) = app.get_json("/stats").await;
    let (_, list) = app.get_json("/messages").await;
    assert_eq!(stats["total_messages"], list["total"]);

    let per_sender_sum: i64 =
        stats["messages_per_sender"].as_array().unwrap().iter().map(|e| e["count"].as_i64().unwrap()).sum();
    assert_eq!(per_sender_sum, 5);
    assert_eq!(stats["first_message_ts"], list["data"][0]["ts"]);
    assert_eq!(stats["last_message_ts"], list["data"][4]["ts"]);
}
