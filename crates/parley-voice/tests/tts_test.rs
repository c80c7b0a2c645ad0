use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use parley_voice::{MurfConfig, TextToSpeech, TtsService, VoiceError};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const API_KEY: &str = "test-murf-key";

#[derive(Default)]
struct MockMurf {
    omit_audio: bool,
    last_request: Mutex<Option<Value>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn generate(
    State(mock): State<Arc<MockMurf>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    *mock.last_request.lock().unwrap() = Some(body);
    if mock.omit_audio {
        Ok(Json(json!({ "audioLengthInSeconds": 0 })))
    } else {
        Ok(Json(json!({
            "audioFile": "https://murf.example.test/audio/123.mp3",
            "audioLengthInSeconds": 1.4
        })))
    }
}

async fn voices(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!([
        { "voiceId": "en-US-natalie", "displayName": "Natalie (F)", "locale": "en-US" },
        { "voiceId": "en-US-terrell", "displayName": "Terrell (M)", "locale": "en-US" }
    ])))
}

async fn spawn_mock(omit_audio: bool) -> (String, Arc<MockMurf>) {
    let mock = Arc::new(MockMurf {
        omit_audio,
        ..Default::default()
    });
    let router = Router::new()
        .route("/v1/speech/generate", post(generate))
        .route("/v1/speech/voices", get(voices))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), mock)
}

fn service(base_url: String) -> TtsService {
    TtsService::new(MurfConfig {
        api_key: API_KEY.to_string(),
        base_url,
        ..Default::default()
    })
}

#[tokio::test]
async fn test_synthesize_returns_audio_url() {
    let (base_url, mock) = spawn_mock(false).await;
    let tts = service(base_url);

    let url = tts.synthesize("Hello there", Some("en-US-terrell")).await.unwrap();
    assert_eq!(url, "https://murf.example.test/audio/123.mp3");

    let request = mock.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request["text"], "Hello there");
    assert_eq!(request["voiceId"], "en-US-terrell");
    assert_eq!(request["format"], "MP3");
    assert_eq!(request["sampleRate"], 24000);
}

#[tokio::test]
async fn test_omitted_voice_uses_default() {
    let (base_url, mock) = spawn_mock(false).await;
    let tts = service(base_url);

    tts.synthesize("Hello", None).await.unwrap();
    tts.synthesize("Hello", Some("  ")).await.unwrap();

    let request = mock.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request["voiceId"], tts.default_voice());
    assert_eq!(tts.default_voice(), "en-US-natalie");
}

#[tokio::test]
async fn test_missing_audio_in_response_is_tts_error() {
    let (base_url, _mock) = spawn_mock(true).await;
    let tts = service(base_url);

    let result = tts.synthesize("Hello", None).await;
    assert!(matches!(result, Err(VoiceError::Tts(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let (base_url, mock) = spawn_mock(false).await;
    let tts = service(base_url);

    let result = tts.synthesize("  ", None).await;
    assert!(matches!(result, Err(VoiceError::Tts(_))));
    assert!(mock.last_request.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_voices_catalog_is_passed_through() {
    let (base_url, _mock) = spawn_mock(false).await;
    let tts = service(base_url);

    let first = tts.voices().await.unwrap();
    let second = tts.voices().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0]["voiceId"], "en-US-natalie");
    assert_eq!(first.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_missing_credential_fails_every_call() {
    let tts = TtsService::new(MurfConfig::default());
    assert!(!tts.is_enabled());

    assert!(matches!(
        tts.synthesize("hello", None).await,
        Err(VoiceError::Config { .. })
    ));
    assert!(matches!(tts.voices().await, Err(VoiceError::Config { .. })));
}
