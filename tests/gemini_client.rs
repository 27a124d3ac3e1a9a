//! End-to-end checks of the Gemini client against a throwaway local HTTP server.

use folklore_map::gemini::GeminiClient;
use folklore_map::story::{StoryError, StoryOutcome, StoryService, TextGenerator, build_request};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Cargo sets this for every test process, so it doubles as a stand-in key.
const KEY_VAR: &str = "CARGO_PKG_NAME";

/// Variable nobody sets.
const UNSET_KEY_VAR: &str = "FOLKLORE_MAP_TEST_UNSET_API_KEY";

struct CapturedRequest {
    head: String,
    body: Value,
}

/// Serves exactly one HTTP request with the given status and JSON body.
async fn serve_once(status: &'static str, body: Value) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1beta", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending the body");
            buf.extend_from_slice(&chunk[..n]);
        }
        let request_body =
            serde_json::from_slice(&buf[header_end..header_end + content_length]).unwrap();

        let payload = body.to_string();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
            payload.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        CapturedRequest {
            head,
            body: request_body,
        }
    });

    (base_url, handle)
}

/// Client that talks to the local server directly, ignoring proxy settings.
fn local_client(base_url: impl Into<String>, key_var: &str) -> GeminiClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    GeminiClient::new(base_url, "gemini-test", key_var).with_http_client(http)
}

fn legend_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn successful_call_returns_legend() {
    let reply = legend_reply(
        r#"{"title": "El Coquena de la Quebrada", "story": "Cuentan los arrieros...\nY nunca más volvió."}"#,
    );
    let (base_url, server) = serve_once("200 OK", reply).await;
    let service = StoryService::new(local_client(base_url, KEY_VAR));

    let outcome = service
        .fetch_story("Jujuy", Some("Quebrada de Humahuaca, el Coquena, Pachamama"))
        .await;

    let StoryOutcome::Told(story) = outcome else {
        panic!("expected a told story");
    };
    assert_eq!(story.title, "El Coquena de la Quebrada");
    assert!(!story.content.is_empty());
    assert_eq!(story.region, "Jujuy");

    let captured = server.await.unwrap();
    let request_line = captured.head.lines().next().unwrap();
    assert_eq!(
        request_line,
        "POST /v1beta/models/gemini-test:generateContent HTTP/1.1"
    );
    assert!(captured.head.to_ascii_lowercase().contains("x-goog-api-key:"));
    assert_eq!(
        captured.body["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert_eq!(
        captured.body["generationConfig"]["responseSchema"]["required"],
        json!(["title", "story"])
    );
    let prompt = captured.body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(prompt.contains("\"Jujuy\" (Quebrada de Humahuaca, el Coquena, Pachamama)"));
}

#[tokio::test]
async fn api_error_message_is_surfaced_to_the_service() {
    let reply = json!({
        "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
    });
    let (base_url, server) = serve_once("400 Bad Request", reply).await;
    let client = local_client(base_url, KEY_VAR);

    let result = client.generate(&build_request("Salta", None)).await;

    assert!(matches!(
        result,
        Err(StoryError::Api { status: 400, ref message }) if message == "API key not valid."
    ));
    server.await.unwrap();
}

#[tokio::test]
async fn empty_candidates_fall_back() {
    let (base_url, server) = serve_once("200 OK", json!({ "candidates": [] })).await;
    let service = StoryService::new(local_client(base_url, KEY_VAR));

    let outcome = service.fetch_story("Catamarca", None).await;

    assert!(matches!(
        outcome,
        StoryOutcome::Fallback {
            cause: StoryError::EmptyResponse,
            ..
        }
    ));
    server.await.unwrap();
}

#[tokio::test]
async fn connection_failure_falls_back_to_fixed_legend() {
    // Grab a free port, then close it so the connection is refused.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = local_client(format!("http://{addr}/v1beta"), KEY_VAR);
    let outcome = StoryService::new(client)
        .fetch_story("Jujuy", Some("Quebrada de Humahuaca, el Coquena, Pachamama"))
        .await;

    let StoryOutcome::Fallback { story, cause } = outcome else {
        panic!("expected the fallback legend");
    };
    assert!(matches!(cause, StoryError::Http(_)));
    assert_eq!(story.title, "El Silencio de la Pampa");
    assert_eq!(
        story.content,
        "Las voces de los antiguos espíritus callan hoy. Intenta conectar de nuevo más tarde para escuchar sus susurros..."
    );
}

#[tokio::test]
async fn missing_credential_falls_back_without_network() {
    let client = local_client("http://127.0.0.1:1/v1beta", UNSET_KEY_VAR);
    let outcome = StoryService::new(client).fetch_story("Tucumán", None).await;

    let StoryOutcome::Fallback { story, cause } = outcome else {
        panic!("expected the fallback legend");
    };
    assert!(matches!(cause, StoryError::MissingApiKey(ref var) if var == UNSET_KEY_VAR));
    assert_eq!(story.title, "El Silencio de la Pampa");
    assert_eq!(story.region, "Tucumán");
}
