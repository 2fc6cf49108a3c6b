//! Tests for envelope decoding and request building.

use super::methods::message_params;
use super::request::decode;
use super::*;
use serde_json::json;
use telepoll_core::{error::TransportError, types::Update};

#[test]
fn test_decode_ok_envelope() {
    let body = br#"{"ok": true, "result": [{"update_id": 1}, {"update_id": 2}]}"#;
    let updates: Vec<Update> = decode(200, body).unwrap();
    let ids: Vec<i64> = updates.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_decode_empty_result() {
    let updates: Vec<Update> = decode(200, br#"{"ok": true, "result": []}"#).unwrap();
    assert!(updates.is_empty());
}

#[test]
fn test_decode_api_error() {
    let body = br#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
    let err = decode::<Vec<Update>>(401, body).unwrap_err();
    assert_eq!(
        err,
        TransportError::Api {
            code: 401,
            description: "Unauthorized".into(),
            retry_after: None,
        }
    );
    assert!(err.is_unauthorized());
}

#[test]
fn test_decode_rate_limit_carries_retry_after() {
    let body = br#"{
        "ok": false,
        "error_code": 429,
        "description": "Too Many Requests: retry after 12",
        "parameters": {"retry_after": 12}
    }"#;
    match decode::<bool>(429, body).unwrap_err() {
        TransportError::Api {
            code, retry_after, ..
        } => {
            assert_eq!(code, 429);
            assert_eq!(retry_after, Some(12));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_decode_error_code_falls_back_to_http_status() {
    let err = decode::<bool>(409, br#"{"ok": false}"#).unwrap_err();
    assert!(matches!(err, TransportError::Api { code: 409, .. }));
}

#[test]
fn test_decode_not_json() {
    let err = decode::<bool>(502, b"<html>Bad Gateway</html>").unwrap_err();
    match err {
        TransportError::Malformed(msg) => assert!(msg.contains("HTTP 502")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_decode_ok_without_result() {
    let err = decode::<bool>(200, br#"{"ok": true}"#).unwrap_err();
    assert!(matches!(err, TransportError::Malformed(_)));
}

#[test]
fn test_decode_wrong_result_shape() {
    let err = decode::<Vec<Update>>(200, br#"{"ok": true, "result": {"update_id": 1}}"#)
        .unwrap_err();
    assert!(matches!(err, TransportError::Malformed(_)));
}

#[test]
fn test_message_params_minimal() {
    let params = message_params(&ChatId::Id(42), "hi", &SendOptions::default());
    assert_eq!(params, json!({"chat_id": 42, "text": "hi"}));
}

#[test]
fn test_message_params_with_options() {
    let options = SendOptions {
        disable_web_page_preview: true,
        reply_markup: Some(json!({"inline_keyboard": []})),
        ..SendOptions::default()
    }
    .parse_mode(ParseMode::Html)
    .reply_to(7);
    let params = message_params(&ChatId::from("@news"), "<b>hi</b>", &options);
    assert_eq!(
        params,
        json!({
            "chat_id": "@news",
            "text": "<b>hi</b>",
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
            "reply_to_message_id": 7,
            "reply_markup": {"inline_keyboard": []},
        })
    );
}

#[test]
fn test_chat_action_serialization() {
    assert_eq!(
        serde_json::to_value(ChatAction::UploadDocument).unwrap(),
        json!("upload_document")
    );
    assert_eq!(serde_json::to_value(ParseMode::MarkdownV2).unwrap(), json!("MarkdownV2"));
}

#[test]
fn test_debug_hides_token() {
    let api = BotApi::new("123:secret");
    assert!(!format!("{api:?}").contains("secret"));
}

#[test]
fn test_base_url_trailing_slash() {
    let api = BotApi::with_base_url("http://localhost:8081/", "t");
    assert_eq!(api.url("getMe"), "http://localhost:8081/bott/getMe");
}
