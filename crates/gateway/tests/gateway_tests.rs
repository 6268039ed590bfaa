use ottica_storefront_gateway::{
    Credentials, ErrorKind, Gateway, GatewayError, GatewayEvent, GatewayOptions,
};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup_gateway(server: &MockServer) -> Gateway {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    Gateway::new(
        &format!("{}/api/v1", server.uri()),
        GatewayOptions::default(),
    )
    .unwrap()
}

fn login(gateway: &Gateway, access: &str, refresh: &str) {
    gateway.store_credentials(&Credentials {
        access: access.to_string(),
        refresh: refresh.to_string(),
    });
}

#[tokio::test]
async fn test_anonymous_request_has_no_authorization_header() {
    let server = MockServer::start().await;
    let gateway = setup_gateway(&server);

    Mock::given(method("GET"))
        .and(path("/api/v1/products/categories/"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/products/categories/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let result: Vec<Value> = gateway.get("/products/categories/", &[]).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_bearer_token_and_query_params() {
    let server = MockServer::start().await;
    let gateway = setup_gateway(&server);
    login(&gateway, "access-1", "refresh-1");

    Mock::given(method("GET"))
        .and(path("/api/v1/products/"))
        .and(header("Authorization", "Bearer access-1"))
        .and(query_param("brand__slug", "ray-ban"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [], "count": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    let params = vec![("brand__slug".to_string(), "ray-ban".to_string())];
    let response = gateway
        .request(Method::GET, "/products/", None, Some(&params))
        .await
        .unwrap();
    assert!(response.is_success());
    let body: Value = response.json().unwrap();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_401_refreshes_once_and_retries() {
    let server = MockServer::start().await;
    let gateway = setup_gateway(&server);
    login(&gateway, "expired", "refresh-1");

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile/"))
        .and(header("Authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Given token not valid for any token type"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile/"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "email": "cliente@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // the refresh call is unauthenticated
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh/"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh/"))
        .and(body_json(json!({ "refresh": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let profile: Value = gateway.get("/auth/profile/", &[]).await.unwrap();
    assert_eq!(profile["email"], "cliente@example.com");
    assert_eq!(gateway.access_token().as_deref(), Some("fresh"));
    assert_eq!(gateway.refresh_token().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_second_401_is_not_refreshed_again() {
    let server = MockServer::start().await;
    let gateway = setup_gateway(&server);
    login(&gateway, "expired", "refresh-1");

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "nope" })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let err = gateway
        .get::<Value>("/auth/profile/", &[])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.kind(), ErrorKind::Authentication);
    // the refreshed credentials stay; only a failed refresh clears them
    assert_eq!(gateway.access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_failed_refresh_clears_credentials_and_notifies() {
    let server = MockServer::start().await;
    let gateway = setup_gateway(&server);
    login(&gateway, "expired", "revoked");
    let mut events = gateway.subscribe();

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is blacklisted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = gateway
        .get::<Value>("/auth/profile/", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::SessionExpired));
    assert!(gateway.access_token().is_none());
    assert!(gateway.refresh_token().is_none());
    assert_eq!(
        events.try_recv().unwrap(),
        GatewayEvent::SessionInvalidated {
            login_path: "/login".to_string()
        }
    );
}

#[tokio::test]
async fn test_401_without_refresh_token_is_surfaced() {
    let server = MockServer::start().await;
    let gateway = setup_gateway(&server);

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = gateway
        .post::<_, Value>("/auth/login/", &json!({ "email": "x@y.it", "password": "bad" }))
        .await
        .unwrap_err();
    assert_eq!(
        err.api_message(),
        Some("No active account found with the given credentials")
    );
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let server = MockServer::start().await;
    let gateway = setup_gateway(&server);
    login(&gateway, "access-1", "refresh-1");

    Mock::given(method("GET"))
        .and(path("/api/v1/products/missing/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = gateway
        .get::<Value>("/products/missing/", &[])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.describe("Errore nel caricamento prodotto"), "Not found.");
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let server = MockServer::start().await;
    let gateway = setup_gateway(&server);
    login(&gateway, "expired", "refresh-1");

    Mock::given(method("GET"))
        .and(path("/api/v1/stores/"))
        .and(header("Authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stores/"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": "fresh", "refresh": "refresh-2" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let _: Vec<Value> = gateway.get("/stores/", &[]).await.unwrap();
    assert_eq!(gateway.refresh_token().as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    let gateway = Arc::new(setup_gateway(&server));
    login(&gateway, "expired", "refresh-1");

    Mock::given(method("GET"))
        .and(path("/api/v1/products/brands/"))
        .and(header("Authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/brands/"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move { gateway.get::<Vec<Value>>("/products/brands/", &[]).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}

#[tokio::test]
async fn test_each_401_refreshes_without_coalescing() {
    let server = MockServer::start().await;
    let options = GatewayOptions {
        coalesce_refresh: false,
        ..GatewayOptions::default()
    };
    let gateway = Arc::new(Gateway::new(&format!("{}/api/v1", server.uri()), options).unwrap());
    login(&gateway, "expired", "refresh-1");

    Mock::given(method("GET"))
        .and(path("/api/v1/products/categories/"))
        .and(header("Authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/categories/"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;
    // Both requests are rejected before either refresh completes.
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh/"))
        .and(body_json(json!({ "refresh": "refresh-1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": "fresh" }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move {
                gateway
                    .get::<Vec<Value>>("/products/categories/", &[])
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(gateway.access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_transport_error_kind() {
    let gateway = Gateway::new("http://127.0.0.1:9/api/v1", GatewayOptions::default()).unwrap();
    let err = gateway.get::<Value>("/products/", &[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[test]
fn test_rejects_non_base_url() {
    let err = Gateway::new("mailto:shop@example.com", GatewayOptions::default()).unwrap_err();
    assert!(matches!(err, GatewayError::Config(_)));
}
