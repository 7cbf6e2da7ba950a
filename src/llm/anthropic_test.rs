use super::*;
use crate::services::history::{ChatRole, ChatTurn, normalize};

fn make_response(content: serde_json::Value) -> String {
    serde_json::json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": content,
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "Hello world" }
    ]));
    assert_eq!(parse_response(&json).unwrap(), "Hello world");
}

#[test]
fn parse_unknown_content_filtered() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "hi" },
        { "type": "some_future_type", "data": {} }
    ]));
    assert_eq!(parse_response(&json).unwrap(), "hi");
}

#[test]
fn parse_thinking_blocks_are_filtered() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "Let me think..." },
        { "type": "text", "text": "Here is my answer" }
    ]));
    assert_eq!(parse_response(&json).unwrap(), "Here is my answer");
}

#[test]
fn parse_thinking_only_response_is_empty() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "Let me think..." }
    ]));
    assert!(matches!(parse_response(&json), Err(GatewayError::EmptyResponse)));
}

#[test]
fn parse_invalid_json() {
    let err = parse_response("not json").unwrap_err();
    assert!(matches!(err, GatewayError::ApiParse(_)));
}

#[test]
fn chat_messages_map_model_to_assistant() {
    let history = normalize(&[
        ChatTurn { role: ChatRole::User, content: Some("hi".into()) },
        ChatTurn { role: ChatRole::Assistant, content: Some("hello".into()) },
    ]);
    let messages = serde_json::to_value(build_chat_messages(&history, "next")).unwrap();
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"][0]["type"], "text");
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(messages[2]["content"][0]["text"], "next");
}

#[test]
fn vision_message_has_base64_image_block() {
    let messages = serde_json::to_value(build_vision_messages("analyze", b"abc", "image/jpeg")).unwrap();
    let content = &messages[0]["content"];
    assert_eq!(content[0]["type"], "image");
    assert_eq!(content[0]["source"]["type"], "base64");
    assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
    assert_eq!(content[0]["source"]["data"], "YWJj");
    assert_eq!(content[1]["text"], "analyze");
}
