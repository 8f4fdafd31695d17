use std::sync::Arc;
use std::time::Duration;

use personas_core::*;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ApiConfig {
    ApiConfig::new(format!("{}/api", server.uri()), "test-token")
}

fn client(config: ApiConfig) -> ApiClient {
    ApiClient::new(Arc::new(config)).unwrap()
}

#[tokio::test]
async fn sends_bearer_token_and_json_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Personas"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let body: Value = client(config(&server)).get("Personas", &[]).await.unwrap();

    assert_eq!(body, json!({ "data": [] }));
}

#[tokio::test]
async fn passes_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Personas/buscar"))
        .and(query_param("nombre", "ana"))
        .and(query_param("email", "ana"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let _: Value = client(config(&server))
        .get("Personas/buscar", &[("nombre", "ana"), ("email", "ana")])
        .await
        .unwrap();
}

#[tokio::test]
async fn server_errors_are_retried_twice_then_translated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Personas"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(config(&server))
        .get::<Value>("Personas", &[])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.title(), "Error del Servidor");
    assert_eq!(
        err.to_string(),
        "Error interno del servidor. Intenta nuevamente más tarde."
    );
}

#[tokio::test]
async fn transient_failure_recovers_on_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Personas"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/Personas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(config(&server)).get::<Value>("Personas", &[]).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn slow_responses_time_out_as_connectivity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Personas"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = config(&server)
        .with_timeout(Duration::from_millis(50))
        .with_retries(1);
    let err = client(config)
        .get::<Value>("Personas", &[])
        .await
        .unwrap_err();

    assert!(err.is_connectivity());
    assert_eq!(err.title(), "Sin Conexión");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unreachable_server_is_connectivity() {
    let config = ApiConfig::new("http://127.0.0.1:1/api", "test-token").with_retries(0);

    let err = client(config).get::<Value>("Personas", &[]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
}

#[tokio::test]
async fn unlisted_status_uses_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Personas"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "El email ya está registrado" })),
        )
        .mount(&server)
        .await;

    let err = client(config(&server).with_retries(0))
        .post::<_, Value>("Personas", &json!({ "email": "a@x.com" }))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.message(), "El email ya está registrado");
}

#[tokio::test]
async fn not_found_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Personas/42"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(config(&server).with_retries(0))
        .get::<Value>("Personas/42", &[])
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.message(), "El recurso solicitado no fue encontrado.");
}

#[tokio::test]
async fn unauthorized_is_an_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(config(&server).with_retries(0))
        .get::<Value>("Personas", &[])
        .await
        .unwrap_err();

    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn malformed_success_body_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Personas"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(config(&server))
        .get::<Value>("Personas", &[])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unknown);
}

#[tokio::test]
async fn empty_delete_response_is_ok() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/Personas/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(config(&server)).delete::<()>("Personas/7").await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn connection_check_hits_health_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health-check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client(config(&server)).test_connection().await.unwrap();

    assert_eq!(status["status"], "ok");
}
