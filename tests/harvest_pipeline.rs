//! End-to-end pipeline test: resolve links, harvest over mocked platform
//! APIs, match keywords and merge the spreadsheet report.

use chrono::NaiveDate;
use seine::harvest::{CancelFlag, Coordinator, DateWindow, EmptyReason, ProgressEvent};
use seine::platform::{
    Gateway, HttpStreamTransport, RetryPolicy, StreamClient, StreamSession, WallClient,
};
use seine::resolve::{resolve, TargetSet};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{mpsc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        base_delay: Duration::from_millis(1),
        backoff_factor: 1.0,
        max_attempts: 2,
        rate_limit_pause: Duration::from_millis(1),
    }
}

fn window() -> DateWindow {
    DateWindow::from_selection(
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
    )
}

async fn mock_wall_server(in_window_ts: i64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": {
                "count": 2,
                "items": [
                    {
                        "id": 1,
                        "owner_id": -77,
                        "date": in_window_ts,
                        "text": "Big sale today, do not miss it",
                        "views": {"count": 120},
                        "likes": {"count": 7},
                        "reposts": {"count": 3}
                    },
                    {
                        "id": 2,
                        "owner_id": -77,
                        "date": in_window_ts,
                        "text": "nothing of interest"
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    server
}

async fn mock_stream_server(too_old_ts: i64) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/sendCode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/signIn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "authorized",
            "session": "test-session-token"
        })))
        .mount(&server)
        .await;

    // The whole channel history is older than the window, so the client
    // stops after the first page and reports no posts.
    Mock::given(method("POST"))
        .and(path("/messages/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "messages": [
                {"id": 9, "date": too_old_ts, "text": "ancient news", "views": 4}
            ]
        })))
        .mount(&server)
        .await;

    server
}

fn pipeline_targets() -> TargetSet {
    let targets = vec![
        resolve("https://vk.com/shop", "Shop").unwrap(),
        resolve("https://t.me/chan", "Chan").unwrap(),
        resolve("https://ok.ru/group/123", "Group").unwrap(),
    ];
    TargetSet::new(targets)
}

async fn build_pipeline(wall: &MockServer, stream: &MockServer) -> Coordinator {
    let gateway = Arc::new(Gateway::new(fast_policy()).unwrap());

    let wall_client = WallClient::with_base_url(
        gateway.clone(),
        "test-token".to_string(),
        "5.137".to_string(),
        100,
        100,
        &wall.uri(),
    )
    .unwrap();

    let transport =
        HttpStreamTransport::new(&stream.uri(), "api-id".to_string(), "api-hash".to_string())
            .unwrap();
    let mut session = StreamSession::new(Box::new(transport));
    session.submit_phone("+100").await.unwrap();
    session.submit_code("12345").await.unwrap();
    let stream_client = StreamClient::new(Arc::new(Mutex::new(session)), 100);

    // No feed client on purpose: the feed target must come back as
    // unsupported instead of failing the run.
    let mut coordinator = Coordinator::new(5);
    coordinator.register(Arc::new(wall_client));
    coordinator.register(Arc::new(stream_client));
    coordinator
}

#[tokio::test]
async fn test_full_pipeline_from_links_to_report() {
    let w = window();
    let wall_server = mock_wall_server(w.start_ts() + 3_600).await;
    let stream_server = mock_stream_server(w.start_ts() - 3_600).await;

    let targets = pipeline_targets();
    let coordinator = build_pipeline(&wall_server, &stream_server).await;

    let keywords = vec!["sale".to_string()];
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();

    let summary = coordinator
        .run(&targets, &keywords, w, CancelFlag::new(), Some(progress_tx))
        .await;

    // One outcome per target.
    assert_eq!(summary.outcome_count(), 3);

    assert_eq!(summary.matched.len(), 1);
    let group = &summary.matched[0];
    assert_eq!(group.target.platform_id, "vk_shop");
    assert_eq!(group.matches.len(), 1);
    assert_eq!(group.matches[0].matched_keywords, vec!["sale"]);
    assert_eq!(group.matches[0].post_permalink, "https://vk.com/wall-77_1");
    assert_eq!(group.matches[0].views, 120);

    let reason_for = |id: &str| {
        summary
            .empties
            .iter()
            .find(|e| e.target.platform_id == id)
            .map(|e| e.reason)
    };
    assert_eq!(reason_for("tg_chan"), Some(EmptyReason::NoMatches));
    assert_eq!(reason_for("ok_123"), Some(EmptyReason::UnsupportedPlatform));

    // The last progress event is the terminal signal.
    let mut last = None;
    while let Some(event) = progress_rx.recv().await {
        last = Some(event);
    }
    assert_eq!(last, Some(ProgressEvent::Finished));

    // Merge into a report and read it back.
    let dir = TempDir::new().unwrap();
    let hash = targets.content_hash();
    let report_path = seine::report::merge(
        dir.path(),
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        &summary,
        &hash,
        None,
    )
    .unwrap();

    let book = umya_spreadsheet::reader::xlsx::read(&report_path).unwrap();
    let sheet = book.get_sheet_by_name("01.05.2024").unwrap();
    assert_eq!(sheet.get_value((1, 2)), "https://vk.com/shop");
    assert_eq!(sheet.get_value((2, 2)), "Shop");
    assert_eq!(sheet.get_value((5, 2)), "sale");

    let unmatched = book.get_sheet_by_name("unmatched 01.05.2024").unwrap();
    let reasons: Vec<String> = (2..=3).map(|row| unmatched.get_value((3, row))).collect();
    assert!(reasons.contains(&"no matches".to_string()));
    assert!(reasons.contains(&"unsupported platform".to_string()));
}

#[tokio::test]
async fn test_target_order_does_not_change_the_set_hash() {
    let a = pipeline_targets();
    let b = TargetSet::new(vec![
        resolve("https://ok.ru/group/123", "Group").unwrap(),
        resolve("https://vk.com/shop", "Shop").unwrap(),
        resolve("https://t.me/chan", "Chan").unwrap(),
    ]);

    assert_eq!(a.content_hash(), b.content_hash());
}
