mod support;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};

use support::{spawn_app, TestApp, BACKEND_URL};

async fn create_customer(app: &TestApp, token: &str, name: &str) -> Value {
    let res = app
        .call(Method::POST, "/api/customer", Some(token), Some(json!({ "data": { "name": name, "birthdate": "1990-01-02", "gender": "female" } })))
        .await;
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.json());
    res.json()
}

fn local_path(url: &str) -> &str {
    url.strip_prefix(BACKEND_URL).unwrap()
}

#[tokio::test]
async fn customer_crud_as_admin() {
    let app = spawn_app().await.unwrap();
    let token = app.sign_up("boss@example.com", "password1").await;

    let created = create_customer(&app, &token, "Alice").await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["gender"], "female");

    let found = app.get(&format!("/api/customer/{id}"), Some(&token)).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.json()["name"], "Alice");

    create_customer(&app, &token, "Bob").await;
    let page = app.get("/api/customer?name=ali&limit=10&orderBy=name_ASC", Some(&token)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.json()["count"], 1);
    assert_eq!(page.json()["rows"][0]["name"], "Alice");

    let all = app.get("/api/customer?orderBy=name_DESC", Some(&token)).await;
    assert_eq!(all.json()["count"], 2);
    assert_eq!(all.json()["rows"][0]["name"], "Bob");

    let items = app.get("/api/customer/autocomplete?query=Ali", Some(&token)).await;
    assert_eq!(items.json(), json!([{ "id": id, "label": "Alice" }]));

    let updated = app
        .call(Method::PUT, &format!("/api/customer/{id}"), Some(&token), Some(json!({ "data": { "name": "Alicia" } })))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["name"], "Alicia");
    assert!(updated.json()["gender"].is_null());

    let deleted = app.call(Method::DELETE, &format!("/api/customer?ids={id}"), Some(&token), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.get(&format!("/api/customer/{id}"), Some(&token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.json()["message"], "Not Found");
}

#[tokio::test]
async fn invalid_customer_is_rejected() {
    let app = spawn_app().await.unwrap();
    let token = app.sign_up("boss@example.com", "password1").await;

    let res = app.call(Method::POST, "/api/customer", Some(&token), Some(json!({ "data": { "name": "A" } }))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Bad Request");

    let res = app.get("/api/customer?createdAtRange=yesterday,", Some(&token)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn permissions_gate_entity_routes() {
    let app = spawn_app().await.unwrap();
    app.sign_up("boss@example.com", "password1").await;
    let worker = app.sign_up("worker@example.com", "password1").await;

    let anonymous = app.get("/api/customer", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/product")
        .header(header::AUTHORIZATION, format!("Bearer {worker}"))
        .header(header::ACCEPT_LANGUAGE, "pt-BR")
        .body(Body::empty())
        .unwrap();
    let res = app.send(req).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json()["error"], "Forbidden");
    assert_eq!(res.json()["message"], "Não permitido");

    let res = app.call(Method::POST, "/api/order", Some(&worker), Some(json!({ "data": {} }))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn photo_upload_then_product_create() {
    let app = spawn_app().await.unwrap();
    let token = app.sign_up("boss@example.com", "password1").await;

    let creds = app.get("/api/file/credentials?storageId=productPhotos&filename=photo.png", Some(&token)).await;
    assert_eq!(creds.status, StatusCode::OK, "{:?}", creds.json());
    let creds = creds.json();
    let private_url = creds["privateUrl"].as_str().unwrap().to_string();
    let upload_url = creds["uploadCredentials"]["url"].as_str().unwrap().to_string();
    assert!(upload_url.starts_with(BACKEND_URL));

    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\nhello\r\n--{boundary}--\r\n"
    );
    let req = Request::builder()
        .method(Method::POST)
        .uri(local_path(&upload_url))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    let uploaded = app.send(req).await;
    assert_eq!(uploaded.status, StatusCode::OK, "{:?}", uploaded.json());
    assert_eq!(uploaded.json()["privateUrl"], private_url.as_str());
    assert!(app.uploads.path().join(&private_url).exists());

    let download_url = uploaded.json()["downloadUrl"].as_str().unwrap().to_string();
    let file = app.get(local_path(&download_url), None).await;
    assert_eq!(file.status, StatusCode::OK);
    assert_eq!(file.bytes, b"hello");

    let product = app
        .call(
            Method::POST,
            "/api/product",
            Some(&token),
            Some(json!({ "data": {
                "name": "Lamp",
                "unitPrice": "12.50",
                "photos": [{ "name": "photo.png", "sizeInBytes": 5, "privateUrl": private_url, "new": true }]
            } })),
        )
        .await;
    assert_eq!(product.status, StatusCode::OK, "{:?}", product.json());
    assert_eq!(product.json()["photos"][0]["privateUrl"], private_url.as_str());
}

#[tokio::test]
async fn forged_upload_token_is_forbidden() {
    let app = spawn_app().await.unwrap();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/file/upload?token=forged")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=B")
        .body(Body::from("--B--\r\n"))
        .unwrap();
    assert_eq!(app.send(req).await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn storage_grants_follow_roles() {
    let app = spawn_app().await.unwrap();
    app.sign_up("boss@example.com", "password1").await;
    let worker = app.sign_up("worker@example.com", "password1").await;

    let denied = app.get("/api/file/credentials?storageId=productPhotos&filename=a.png", Some(&worker)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let avatar = app.get("/api/file/credentials?storageId=userAvatarsProfiles&filename=me.png", Some(&worker)).await;
    assert_eq!(avatar.status, StatusCode::OK);

    let traversal = app.get("/api/file/download?privateUrl=../secret", None).await;
    assert_eq!(traversal.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_links_customer_and_products() {
    let app = spawn_app().await.unwrap();
    let token = app.sign_up("boss@example.com", "password1").await;
    let customer = create_customer(&app, &token, "Alice").await;

    let product = app
        .call(Method::POST, "/api/product", Some(&token), Some(json!({ "data": { "name": "Lamp", "unitPrice": "10" } })))
        .await;
    assert_eq!(product.status, StatusCode::OK, "{:?}", product.json());
    let product_id = product.json()["id"].clone();

    let order = app
        .call(
            Method::POST,
            "/api/order",
            Some(&token),
            Some(json!({ "data": { "customer": customer["id"], "products": [product_id], "delivered": true } })),
        )
        .await;
    assert_eq!(order.status, StatusCode::OK, "{:?}", order.json());
    let order = order.json();
    assert_eq!(order["customer"]["name"], "Alice");
    assert_eq!(order["products"].as_array().unwrap().len(), 1);

    let dangling = app
        .call(Method::POST, "/api/order", Some(&token), Some(json!({ "data": { "products": [uuid::Uuid::new_v4()] } })))
        .await;
    assert_eq!(dangling.status, StatusCode::BAD_REQUEST);

    let page = app.get("/api/order", Some(&token)).await;
    assert_eq!(page.json()["count"], 1);
}

#[tokio::test]
async fn admin_manages_users() {
    let app = spawn_app().await.unwrap();
    let token = app.sign_up("boss@example.com", "password1").await;
    let me = app.get("/api/auth/me", Some(&token)).await.json();
    let my_id = me["id"].as_str().unwrap().to_string();

    let invited = app
        .call(Method::POST, "/api/user", Some(&token), Some(json!({ "data": { "emails": "new@example.com", "roles": "custom" } })))
        .await;
    assert_eq!(invited.status, StatusCode::NO_CONTENT, "{:?}", invited.json());

    let page = app.get("/api/user?email=new@", Some(&token)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.json()["count"], 1);
    assert_eq!(page.json()["rows"][0]["roles"], json!(["custom"]));

    // invited accounts are claimed by signing up
    let claimed = app.sign_up("new@example.com", "password1").await;
    let them = app.get("/api/auth/me", Some(&claimed)).await;
    assert_eq!(them.json()["roles"], json!(["custom"]));

    let revoke = app
        .call(Method::PUT, "/api/user", Some(&token), Some(json!({ "data": { "id": my_id, "roles": ["custom"] } })))
        .await;
    assert_eq!(revoke.status, StatusCode::BAD_REQUEST);

    let suicide = app.call(Method::DELETE, &format!("/api/user?ids={my_id}"), Some(&token), None).await;
    assert_eq!(suicide.status, StatusCode::BAD_REQUEST);
    assert_eq!(suicide.json()["message"], "You can't delete yourself");
}

#[tokio::test]
async fn list_without_limit_returns_every_row() {
    let app = spawn_app().await.unwrap();
    let token = app.sign_up("boss@example.com", "password1").await;
    for name in ["Ann", "Ben", "Cid"] {
        create_customer(&app, &token, name).await;
    }

    let all = app.get("/api/customer", Some(&token)).await;
    assert_eq!(all.status, StatusCode::OK, "{:?}", all.json());
    assert_eq!(all.json()["count"], 3);
    assert_eq!(all.json()["rows"].as_array().unwrap().len(), 3);

    let skipped = app.get("/api/customer?offset=1&orderBy=name_ASC", Some(&token)).await;
    assert_eq!(skipped.status, StatusCode::OK, "{:?}", skipped.json());
    let names: Vec<Value> = skipped.json()["rows"].as_array().unwrap().iter().map(|r| r["name"].clone()).collect();
    assert_eq!(names, vec![json!("Ben"), json!("Cid")]);

    let unclamped = app.get("/api/customer?limit=5000", Some(&token)).await;
    assert_eq!(unclamped.json()["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let app = spawn_app().await.unwrap();
    let token = app.sign_up("boss@example.com", "password1").await;
    let bad_gender = json!({ "data": { "name": "Alice", "gender": "other" } });

    let res = app.call(Method::POST, "/api/customer", Some(&token), Some(bad_gender.clone())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({ "error": "Bad Request", "message": "An error occurred" }));

    let anonymous = app.call(Method::POST, "/api/customer", None, Some(bad_gender.clone())).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.json()["error"], "Unauthorized");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/customer")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::ACCEPT_LANGUAGE, "pt-BR")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(bad_gender.to_string()))
        .unwrap();
    let res = app.send(req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "Ocorreu um erro");

    let not_json = Request::builder()
        .method(Method::PUT)
        .uri("/api/auth/profile")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from("plain text"))
        .unwrap();
    let res = app.send(not_json).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Bad Request");

    let bad_id = app.get("/api/customer/not-a-uuid", Some(&token)).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.json()["message"], "An error occurred");

    let bad_role = app
        .call(Method::POST, "/api/user", Some(&token), Some(json!({ "data": { "emails": "x@example.com", "roles": "root" } })))
        .await;
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_role.json()["error"], "Bad Request");

    let bad_sign_in = app.call(Method::POST, "/api/auth/sign-in", None, Some(json!({ "email": 42 }))).await;
    assert_eq!(bad_sign_in.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_sign_in.json()["message"], "An error occurred");
}
