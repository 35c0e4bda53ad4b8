use httpmock::prelude::*;

use ipvet::checkin;
use ipvet::config::AppConfig;

fn test_config(server: &MockServer) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.checkin.attendance_url = format!("{}/api/attendance?random={{random}}", server.base_url());
    cfg.checkin.cookie = Some("session=abc123; smac=1".to_string());
    // Point the state file away from any developer machine leftovers.
    cfg.checkin.state_path = std::env::temp_dir()
        .join(format!("ipvet-checkin-test-{}.json", std::process::id()))
        .to_string_lossy()
        .into_owned();
    cfg
}

#[tokio::test]
async fn successful_checkin_sends_the_exact_headers() {
    let server = MockServer::start();
    let cfg = test_config(&server);
    let attendance = server.mock(|when, then| {
        when.method(POST)
            .path("/api/attendance")
            .query_param("random", "false")
            .header("cookie", "session=abc123; smac=1")
            .header("origin", "https://www.nodeseek.com")
            .header("referer", "https://www.nodeseek.com/board")
            .header("accept", "application/json, text/plain, */*")
            .header("accept-language", "zh-CN,zh;q=0.9,en;q=0.8")
            .header("content-type", "application/json")
            .header(
                "user-agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36",
            );
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"success": true, "message": "收益 +5"}"#);
    });

    let client = reqwest::Client::new();
    let notification = checkin::run(&client, &cfg, None).await;

    attendance.assert();
    assert_eq!(notification.title, "NodeSeek check-in");
    assert_eq!(notification.subtitle.as_deref(), Some("✅ success"));
    assert_eq!(notification.body, "收益 +5");
}

#[tokio::test]
async fn random_reward_flag_reaches_the_query_string() {
    let server = MockServer::start();
    let mut cfg = test_config(&server);
    cfg.checkin.random_reward = true;
    let attendance = server.mock(|when, then| {
        when.method(POST)
            .path("/api/attendance")
            .query_param("random", "true");
        then.status(200).body(r#"{"message": "ok"}"#);
    });

    let client = reqwest::Client::new();
    checkin::run(&client, &cfg, None).await;

    attendance.assert();
}

#[tokio::test]
async fn cookie_flag_overrides_the_configured_one() {
    let server = MockServer::start();
    let cfg = test_config(&server);
    let attendance = server.mock(|when, then| {
        when.method(POST)
            .path("/api/attendance")
            .header("cookie", "session=flagwins");
        then.status(200).body(r#"{"message": "ok"}"#);
    });

    let client = reqwest::Client::new();
    let notification = checkin::run(&client, &cfg, Some("session=flagwins")).await;

    attendance.assert();
    assert_eq!(notification.subtitle.as_deref(), Some("✅ success"));
}

#[tokio::test]
async fn risk_control_block_is_reported_and_pushed() {
    let server = MockServer::start();
    let mut cfg = test_config(&server);
    cfg.telegram.api_base = server.base_url();
    cfg.telegram.bot_token = Some("123:abc".to_string());
    cfg.telegram.chat_id = Some("42".to_string());

    server.mock(|when, then| {
        when.method(POST).path("/api/attendance");
        then.status(403).body("<html>cf blocked</html>");
    });
    let push = server.mock(|when, then| {
        when.method(POST)
            .path("/bot123:abc/sendMessage")
            .json_body_partial(r#"{"chat_id": "42", "parse_mode": "HTML", "disable_web_page_preview": true}"#);
        then.status(200).body(r#"{"ok": true}"#);
    });

    let client = reqwest::Client::new();
    let notification = checkin::run(&client, &cfg, None).await;

    push.assert();
    assert_eq!(notification.subtitle.as_deref(), Some("⚠️ 403 risk control"));
    assert!(notification.body.contains("cf blocked"));
}

#[tokio::test]
async fn success_push_respects_notify_only_fail() {
    let server = MockServer::start();
    let mut cfg = test_config(&server);
    cfg.telegram.api_base = server.base_url();
    cfg.telegram.bot_token = Some("123:abc".to_string());
    cfg.telegram.chat_id = Some("42".to_string());
    cfg.telegram.notify_only_fail = true;

    server.mock(|when, then| {
        when.method(POST).path("/api/attendance");
        then.status(200).body(r#"{"message": "ok"}"#);
    });
    let push = server.mock(|when, then| {
        when.method(POST).path("/bot123:abc/sendMessage");
        then.status(200).body(r#"{"ok": true}"#);
    });

    let client = reqwest::Client::new();
    let notification = checkin::run(&client, &cfg, None).await;

    assert_eq!(notification.subtitle.as_deref(), Some("✅ success"));
    assert_eq!(push.hits(), 0);
}

#[tokio::test]
async fn missing_cookie_never_hits_the_endpoint() {
    let server = MockServer::start();
    let mut cfg = test_config(&server);
    cfg.checkin.cookie = None;
    let attendance = server.mock(|when, then| {
        when.method(POST).path("/api/attendance");
        then.status(200);
    });

    let client = reqwest::Client::new();
    let notification = checkin::run(&client, &cfg, None).await;

    assert_eq!(attendance.hits(), 0);
    assert_eq!(notification.title, "NodeSeek check-in result");
    assert_eq!(
        notification.subtitle.as_deref(),
        Some("❌ unable to check in")
    );
}

#[tokio::test]
async fn server_error_maps_to_its_own_message() {
    let server = MockServer::start();
    let cfg = test_config(&server);
    server.mock(|when, then| {
        when.method(POST).path("/api/attendance");
        then.status(500).body("boom");
    });

    let client = reqwest::Client::new();
    let notification = checkin::run(&client, &cfg, None).await;

    assert_eq!(notification.subtitle.as_deref(), Some("❌ server error"));
    assert!(notification.body.contains("boom"));
}
