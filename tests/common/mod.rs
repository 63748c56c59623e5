#![allow(dead_code)]

use std::sync::LazyLock;
use std::time::Duration;

use incident_intake::adapters::config::AppConfig;
use incident_intake::adapters::http::router;
use incident_intake::service_factory::ServiceFactory;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SPREADSHEET_ID: &str = "sheet-1";
pub const BOT_TOKEN: &str = "123:abc";

static TEST_KEY: LazyLock<RsaPrivateKey> = LazyLock::new(|| {
    RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("generate test key")
});

pub fn test_key_pem() -> String {
    TEST_KEY
        .to_pkcs8_pem(LineEnding::LF)
        .expect("encode test key")
        .to_string()
}

/// Configuration pointing every upstream at `server`.
pub fn config(server: &MockServer) -> AppConfig {
    AppConfig {
        google_service_account_email: "svc@project.iam.gserviceaccount.com".into(),
        google_service_account_key: test_key_pem(),
        google_sheets_id: format!("https://docs.google.com/spreadsheets/d/{}/edit", SPREADSHEET_ID),
        google_token_url: format!("{}/token", server.uri()),
        google_sheets_api_url: format!("{}/v4/spreadsheets", server.uri()),
        telegram_api_url: server.uri(),
        http_timeout_secs: 5,
        ..Default::default()
    }
}

pub fn with_telegram(mut config: AppConfig, chat_ids: &str) -> AppConfig {
    config.telegram_bot_token = BOT_TOKEN.into();
    config.telegram_chat_ids = chat_ids.into();
    config
}

/// Serves the app on an ephemeral port and returns its base URL.
pub async fn spawn_app(config: AppConfig) -> String {
    let state = ServiceFactory::create(&config).expect("build services");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let address = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });
    format!("http://{}", address)
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.integration",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

pub async fn mount_stores(server: &MockServer, rows: Value) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/v4/spreadsheets/{}/values/Tiendas!A2:B",
            SPREADSHEET_ID
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Tiendas!A2:B1000",
            "majorDimension": "ROWS",
            "values": rows
        })))
        .mount(server)
        .await;
}

pub async fn mount_appends(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updates": {}})))
        .mount(server)
        .await;
}

pub fn pest_submission() -> Value {
    json!({
        "Tienda_Nombre": "Store A",
        "Fecha_Evento": "2024-01-01",
        "Nombre": "Ana",
        "Apellido": "Diaz",
        "Tipo_Evento": "Plaga",
        "Tipo_Plaga": "Roedor",
        "Sector_Hallazgo": "Bodega",
        "Comentario_Plaga": "visto"
    })
}

/// Every appended row as `(range, cells)`, in arrival order.
pub async fn appended_rows(server: &MockServer) -> Vec<(String, Vec<String>)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path().ends_with(":append"))
        .map(|request| {
            let range = request
                .url
                .path()
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .trim_end_matches(":append")
                .to_string();
            let body: Value = request.body_json().expect("append body is JSON");
            let cells = body["values"][0]
                .as_array()
                .expect("one row")
                .iter()
                .map(|cell| cell.as_str().unwrap_or_default().to_string())
                .collect();
            (range, cells)
        })
        .collect()
}

/// Requests sent to the Bot API so far.
pub async fn telegram_requests(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path().ends_with("/sendMessage"))
        .map(|request| request.body_json().expect("sendMessage body is JSON"))
        .collect()
}

/// Polls until `count` chat messages arrived or a second passes.
pub async fn wait_for_telegram(server: &MockServer, count: usize) -> Vec<Value> {
    for _ in 0..50 {
        let requests = telegram_requests(server).await;
        if requests.len() >= count {
            return requests;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    telegram_requests(server).await
}
