//! # HTTP Flows
//!
//! Drives the fully wired service (config → store → incident service →
//! router) through its HTTP surface.
//!
//! ## Flows Tested:
//!
//! 1. **Create → Get → Patch → List** against the SQLite store
//! 2. **Identity sources**: session token and trusted proxy header
//! 3. **Seed → paginate**: seeded totals and page arithmetic

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use incident_api::domain::StoreConfig;
    use incident_api::{ApiConfig, IncidentApiService, StoreBackend};
    use incident_core::{IncidentService, IncidentStore};
    use incident_server::{generate_incidents, open_store, reseed, SeedOptions};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const TOKEN: &str = "tok-oncall";
    const PROXY_HEADER: &str = "x-auth-user";

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Harness {
        router: Router,
        store: Arc<dyn IncidentStore>,
        _dir: TempDir,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ApiConfig::default();
        config.store = StoreConfig {
            backend: StoreBackend::Sqlite,
            sqlite_path: Some(dir.path().join("incidents.db")),
        };
        config
            .identity
            .sessions
            .insert(TOKEN.to_string(), "user-1".to_string());
        config.identity.trusted_user_header = Some(PROXY_HEADER.to_string());

        let store = open_store(&config.store).unwrap();
        let service = IncidentService::new(Arc::clone(&store));
        let api = IncidentApiService::new(config, Arc::new(service)).unwrap();
        Harness {
            router: api.router(),
            store,
            _dir: dir,
        }
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder.header("content-type", "application/json")
        } else {
            builder
        }
    }

    fn authed(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = request(method, uri, body.clone())
            .header("authorization", format!("Bearer {TOKEN}"));
        finish(builder, body)
    }

    fn finish(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
        match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_incident_lifecycle() {
        let h = harness();

        let (status, created) = send(
            &h.router,
            authed(
                Method::POST,
                "/api/incidents",
                Some(json!({
                    "title": "Payments failing",
                    "service": "Billing Service",
                    "severity": "SEV1",
                    "summary": "Card processor returns 502",
                    "ownerId": "mallory"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["ownerId"], "user-1");
        assert_eq!(created["status"], "OPEN");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, fetched) = send(
            &h.router,
            authed(Method::GET, &format!("/api/incidents/{id}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, patched) = send(
            &h.router,
            authed(
                Method::PATCH,
                &format!("/api/incidents/{id}"),
                Some(json!({ "status": "MITIGATED", "summary": null })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["status"], "MITIGATED");
        assert_eq!(patched["summary"], Value::Null);
        assert_eq!(patched["severity"], "SEV1");
        assert_eq!(patched["createdAt"], created["createdAt"]);

        let (status, page) = send(
            &h.router,
            authed(
                Method::GET,
                "/api/incidents?status=MITIGATED&service=Billing%20Service",
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["pagination"]["total"], 1);
        assert_eq!(page["data"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_error_payloads_by_kind() {
        let h = harness();

        let missing = uuid::Uuid::new_v4();
        let (status, body) = send(
            &h.router,
            authed(Method::GET, &format!("/api/incidents/{missing}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["kind"], "NotFound");

        let (status, body) = send(
            &h.router,
            authed(
                Method::PATCH,
                &format!("/api/incidents/{missing}"),
                Some(json!({})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No fields provided for update");

        let (status, body) = send(
            &h.router,
            authed(Method::GET, "/api/incidents?limit=101&severity=LOW", None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["fieldErrors"]["limit"].is_array());
        assert!(body["error"]["fieldErrors"]["severity"].is_array());
    }

    // =============================================================================
    // IDENTITY
    // =============================================================================

    #[tokio::test]
    async fn test_trusted_header_sets_owner() {
        let h = harness();

        let body = json!({ "title": "Search index stale", "service": "Search Service", "severity": "SEV3" });
        let req = finish(
            request(Method::POST, "/api/incidents", Some(body.clone()))
                .header(PROXY_HEADER, "user-5"),
            Some(body),
        );
        let (status, created) = send(&h.router, req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["ownerId"], "user-5");
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let h = harness();
        let req = finish(
            request(Method::GET, "/api/incidents", None).header("authorization", "Bearer nope"),
            None,
        );
        let (status, body) = send(&h.router, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["kind"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let h = harness();
        let req = finish(
            request(Method::GET, "/health", None).header("x-request-id", "req-123"),
            None,
        );
        let response = h.router.clone().oneshot(req).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-123");
    }

    // =============================================================================
    // SEED + PAGINATION
    // =============================================================================

    #[tokio::test]
    async fn test_seeded_store_paginates() {
        let h = harness();
        let options = SeedOptions {
            count: 45,
            users: 3,
            days: 10,
        };
        let incidents =
            generate_incidents(&options, &mut StdRng::seed_from_u64(11), chrono::Utc::now())
                .unwrap();
        reseed(h.store.as_ref(), incidents).await.unwrap();

        let (status, page) = send(
            &h.router,
            authed(Method::GET, "/api/incidents?page=5&limit=10", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["pagination"]["total"], 45);
        assert_eq!(page["pagination"]["totalPages"], 5);
        assert_eq!(page["data"].as_array().unwrap().len(), 5);

        let (_, first) = send(&h.router, authed(Method::GET, "/api/incidents", None)).await;
        let dates: Vec<_> = first["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| {
                chrono::DateTime::parse_from_rfc3339(i["createdAt"].as_str().unwrap()).unwrap()
            })
            .collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted, "default order is newest first");

        let (_, beyond) = send(
            &h.router,
            authed(Method::GET, "/api/incidents?page=6&limit=10", None),
        )
        .await;
        assert_eq!(beyond["data"], json!([]));
        assert_eq!(beyond["pagination"]["total"], 45);
    }
}
