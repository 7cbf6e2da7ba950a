use super::*;
use crate::state::test_helpers::{MockGateway, RecordedCall};

fn leaf() -> LeafImage {
    LeafImage { bytes: vec![0xFF, 0xD8, 0xFF, 0xE0], mime_type: "image/jpeg".into() }
}

#[tokio::test]
async fn leaf_reply_yields_record() {
    let gateway = MockGateway::replying(r#"```json
{"isPlantLeaf": true, "plantName": "Rose", "disease": "Black spot"}
```"#);
    let result = analyze(&gateway, &leaf(), "en").await.unwrap();
    let Diagnosis::Leaf(record) = result else {
        panic!("expected leaf");
    };
    assert_eq!(record.plant_name, "Rose");
    assert_eq!(record.disease, "Black spot");
}

#[tokio::test]
async fn rejection_is_not_an_error() {
    let gateway = MockGateway::replying(r#"{"isPlantLeaf": false}"#);
    let result = analyze(&gateway, &leaf(), "en").await.unwrap();
    assert_eq!(result, Diagnosis::Rejected);
}

#[tokio::test]
async fn sends_image_and_language_to_gateway() {
    let gateway = MockGateway::replying(r#"{"isPlantLeaf": false}"#);
    analyze(&gateway, &leaf(), "fr").await.unwrap();
    let calls = gateway.recorded();
    let RecordedCall::Vision { prompt, image_len, mime_type } = &calls[0] else {
        panic!("expected vision call");
    };
    assert!(prompt.contains("\"fr\""));
    assert_eq!(*image_len, 4);
    assert_eq!(mime_type, "image/jpeg");
}

#[tokio::test]
async fn prose_reply_is_extraction_error() {
    let gateway = MockGateway::replying("Sorry, I can't help with that.");
    let err = analyze(&gateway, &leaf(), "en").await.unwrap_err();
    assert!(matches!(err, AnalyzeError::Extraction(ExtractionError::NoJsonFound)));
    assert_eq!(err.error_code(), "E_NO_JSON_FOUND");
}

#[tokio::test]
async fn malformed_reply_is_extraction_error() {
    let gateway = MockGateway::replying(r#"{"isPlantLeaf": true,}"#);
    let err = analyze(&gateway, &leaf(), "en").await.unwrap_err();
    assert!(matches!(err, AnalyzeError::Extraction(ExtractionError::MalformedJson(_))));
}

#[tokio::test]
async fn gateway_failure_is_gateway_error() {
    let gateway = MockGateway::failing(GatewayError::ApiRequest("connection reset".into()));
    let err = analyze(&gateway, &leaf(), "en").await.unwrap_err();
    assert!(matches!(err, AnalyzeError::Gateway(GatewayError::ApiRequest(_))));
    assert!(err.retryable());
}
