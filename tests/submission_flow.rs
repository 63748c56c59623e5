mod common;

use common::*;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn submit(base: &str, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/api/submit", base))
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn pest_submission_is_written_to_master_and_pest_tables() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"], ["T002", "Store B"]])).await;
    mount_appends(&server).await;
    let base = spawn_app(config(&server)).await;

    let (status, body) = submit(&base, pest_submission()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["Tienda_ID"], "T001");
    assert_eq!(body["warn"], "");
    let response_id = body["Response_ID"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(response_id).is_ok());

    let rows = appended_rows(&server).await;
    assert_eq!(rows.len(), 2);

    let (master_range, master) = &rows[0];
    assert_eq!(master_range, "Respuestas!A:U");
    assert_eq!(
        master,
        &vec![
            response_id.to_string(),
            master[1].clone(),
            "T001".into(),
            "Store A".into(),
            "2024-01-01".into(),
            "Ana".into(),
            "Diaz".into(),
            "Plaga".into(),
            "".into(),
            "Roedor".into(),
            "Bodega".into(),
            "visto".into(),
            "".into(),
            "".into(),
            "".into(),
            "".into(),
            "".into(),
            "".into(),
            "".into(),
            "".into(),
            "203.0.113.7".into(),
        ]
    );
    assert!(chrono::DateTime::parse_from_rfc3339(&master[1]).is_ok());
    assert!(master[1].ends_with('Z'));

    let (pest_range, pest) = &rows[1];
    assert_eq!(pest_range, "Respuestas_Plaga!A:K");
    assert_eq!(pest.len(), 11);
    assert_eq!(&pest[..7], &master[..7]);
    assert_eq!(&pest[7..], ["", "Roedor", "Bodega", "visto"]);

    let token_requests: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.url.path() == "/token")
        .collect();
    assert_eq!(token_requests.len(), 1);
    let form = String::from_utf8(token_requests[0].body.clone()).unwrap();
    assert!(form.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"));
}

#[tokio::test]
async fn missing_event_date_is_rejected_without_upstream_calls() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"]])).await;
    mount_appends(&server).await;
    let base = spawn_app(config(&server)).await;

    let mut submission = pest_submission();
    submission.as_object_mut().unwrap().remove("Fecha_Evento");
    let (status, body) = submit(&base, submission).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("Fecha_Evento"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn ambiguous_store_name_resolves_to_last_match_with_warning() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["id1", "Store A"], ["id2", "store a"]])).await;
    mount_appends(&server).await;
    let base = spawn_app(config(&server)).await;

    let (status, body) = submit(&base, pest_submission()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Tienda_ID"], "id2");
    assert_eq!(body["warn"], "multiple rows share this store name");
}

#[tokio::test]
async fn unknown_store_still_persists_with_warning() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T9", "Elsewhere"]])).await;
    mount_appends(&server).await;
    let base = spawn_app(config(&server)).await;

    let (status, body) = submit(&base, pest_submission()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Tienda_ID"], "");
    assert_eq!(body["warn"], "store not found by name");
    assert_eq!(appended_rows(&server).await.len(), 2);
}

#[tokio::test]
async fn unrecognized_category_appends_master_row_only() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"]])).await;
    mount_appends(&server).await;
    let base = spawn_app(config(&server)).await;

    let mut submission = pest_submission();
    submission["Tipo_Evento"] = json!("Otro");
    let (status, body) = submit(&base, submission).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let rows = appended_rows(&server).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "Respuestas!A:U");
    assert_eq!(rows[0].1[7], "Otro");
}

#[tokio::test]
async fn aroma_flags_are_written_as_cells() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"]])).await;
    mount_appends(&server).await;
    let base = spawn_app(config(&server)).await;

    let (status, _) = submit(
        &base,
        json!({
            "Tienda_Nombre": "Store A",
            "Fecha_Evento": "2024-03-03",
            "Nombre": "Ana",
            "Apellido": "Diaz",
            "Tipo_Evento": "Aroma",
            "Dosif_inco_Aroma": true,
            "Equip_malo_Aroma": false,
            "Comentario_Aroma": "sin aroma"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rows = appended_rows(&server).await;
    assert_eq!(rows[1].0, "Respuestas_Aroma!A:K");
    assert_eq!(&rows[1].1[7..], ["TRUE", "", "", "sin aroma"]);
}

#[tokio::test]
async fn key_supplied_as_service_account_json_works() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"]])).await;
    mount_appends(&server).await;

    let mut config = config(&server);
    config.google_service_account_key = json!({
        "type": "service_account",
        "client_email": "svc@project.iam.gserviceaccount.com",
        "private_key": test_key_pem(),
    })
    .to_string();
    let base = spawn_app(config).await;

    let (status, body) = submit(&base, pest_submission()).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
}

#[tokio::test]
async fn token_rejection_is_a_server_error_with_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;
    mount_appends(&server).await;
    let base = spawn_app(config(&server)).await;

    let (status, body) = submit(&base, pest_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("invalid_grant"));
    assert!(appended_rows(&server).await.is_empty());
}

#[tokio::test]
async fn malformed_key_fails_the_request_not_startup() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    let mut config = config(&server);
    config.google_service_account_key = "not a key".into();
    let base = spawn_app(config).await;

    let (status, body) = submit(&base, pest_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("BEGIN PRIVATE KEY"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn category_failure_after_master_is_reported() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"]])).await;
    Mock::given(method("POST"))
        .and(path_regex(r"Respuestas_Plaga!A:K:append$"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_appends(&server).await;
    let base = spawn_app(config(&server)).await;

    let (status, body) = submit(&base, pest_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("master table"), "error: {}", error);
    assert!(error.contains("Respuestas_Plaga"), "error: {}", error);
}

#[tokio::test]
async fn master_failure_skips_category_table() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"]])).await;
    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .mount(&server)
        .await;
    let base = spawn_app(config(&server)).await;

    let (status, body) = submit(&base, pest_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("PERMISSION_DENIED"));
    let appends = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.url.path().ends_with(":append"))
        .count();
    assert_eq!(appends, 1);
}

#[tokio::test]
async fn accepted_submission_is_relayed_to_every_chat() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"]])).await;
    mount_appends(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", BOT_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;
    let base = spawn_app(with_telegram(config(&server), "111,222")).await;

    let (status, _) = submit(&base, pest_submission()).await;
    assert_eq!(status, StatusCode::OK);

    let messages = wait_for_telegram(&server, 2).await;
    assert_eq!(messages.len(), 2);
    let mut chats: Vec<&str> = messages
        .iter()
        .map(|message| message["chat_id"].as_str().unwrap())
        .collect();
    chats.sort();
    assert_eq!(chats, ["111", "222"]);
    for message in &messages {
        assert_eq!(message["parse_mode"], "HTML");
        assert!(message["text"].as_str().unwrap().contains("Roedor"));
    }
}

#[tokio::test]
async fn chat_failure_does_not_change_the_response() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"]])).await;
    mount_appends(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", BOT_TOKEN)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let base = spawn_app(with_telegram(config(&server), "111")).await;

    let (status, body) = submit(&base, pest_submission()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn client_abort_does_not_cancel_pending_appends() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_stores(&server, json!([["T001", "Store A"]])).await;
    Mock::given(method("POST"))
        .and(path_regex(r"Respuestas!A:U:append$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"updates": {}}))
                .set_delay(Duration::from_millis(400)),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    mount_appends(&server).await;
    let base = spawn_app(config(&server)).await;

    let impatient = reqwest::Client::builder()
        .timeout(Duration::from_millis(150))
        .build()
        .unwrap();
    let sent = impatient
        .post(format!("{}/api/submit", base))
        .json(&pest_submission())
        .send()
        .await;
    assert!(sent.unwrap_err().is_timeout());

    let mut ranges = Vec::new();
    for _ in 0..75 {
        ranges = appended_rows(&server)
            .await
            .into_iter()
            .map(|(range, _)| range)
            .collect();
        if ranges.len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(ranges, ["Respuestas!A:U", "Respuestas_Plaga!A:K"]);
}
