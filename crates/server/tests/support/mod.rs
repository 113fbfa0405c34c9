#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use models::db::{connect_with_config, DatabaseConfig};
use server::routes;
use server::state::ServerState;

pub const BACKEND_URL: &str = "http://localhost:8080";

pub struct TestApp {
    pub router: Router,
    // 上传目录随测试结束删除
    pub uploads: TempDir,
}

pub async fn spawn_app() -> anyhow::Result<TestApp> {
    let uploads = tempfile::tempdir()?;
    let mut cfg = configs::AppConfig::default();
    cfg.auth.jwt_secret = "integration-secret".into();
    cfg.storage.upload_dir = uploads.path().to_string_lossy().into_owned();
    cfg.storage.backend_url = BACKEND_URL.into();

    let db = connect_with_config(&DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() }).await?;
    migration::Migrator::up(&db, None).await?;

    let state = ServerState::new(&cfg, db);
    let router = routes::build_router(state, CorsLayer::very_permissive(), None);
    Ok(TestApp { router, uploads })
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

async fn collect(res: Response<Body>) -> TestResponse {
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = res.into_body().collect().await.unwrap().to_bytes().to_vec();
    TestResponse { status, headers, bytes }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        collect(self.router.clone().oneshot(req).await.unwrap()).await
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.call(Method::GET, uri, token, None).await
    }

    /// Sign up and return the bearer token.
    pub async fn sign_up(&self, email: &str, password: &str) -> String {
        let res = self
            .call(Method::POST, "/api/auth/sign-up", None, Some(json!({ "email": email, "password": password })))
            .await;
        assert_eq!(res.status, StatusCode::OK, "sign-up failed: {:?}", res.json());
        res.json().as_str().unwrap().to_string()
    }
}
