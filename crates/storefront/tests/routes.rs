//! Router-level tests.
//!
//! The full application router is driven with `oneshot` while `wiremock`
//! stands in for the content store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use fashionable_queen_storefront::app;
use fashionable_queen_storefront::config::{SanityConfig, StorefrontConfig};
use fashionable_queen_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY_PATH: &str = "/v2023-10-01/data/query/production";
const MUTATE_PATH: &str = "/v2023-10-01/data/mutate/production";
const ASSETS_PATH: &str = "/v2023-10-01/assets/images/production";

fn test_app(server: &MockServer) -> Router {
    test_app_with(server, |_| {})
}

fn test_app_with(server: &MockServer, configure: impl FnOnce(&mut StorefrontConfig)) -> Router {
    let mut sanity = SanityConfig::for_project("0faffs5n");
    sanity.api_base_url = server.uri();
    sanity.write_token = Some(SecretString::from("skW8qLmN3vXz"));
    let mut config = StorefrontConfig::with_sanity(sanity);
    configure(&mut config);
    app(AppState::new(config).unwrap())
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn session_cookie(response: &Response) -> String {
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

async fn mount_entry(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .and(query_param("$id", "\"a1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "_id": "a1",
                "_type": "stitch",
                "title": "Embroidered Lawn 3pc",
                "price": 6500,
                "discountedPrice": 5200,
                "fabric": "Lawn",
                "sizeOptions": ["S", "M", "L"],
                "colorOptions": null,
                "color": "Teal",
                "imageUrl": "https://cdn.sanity.io/images/a1.jpg"
            }
        })))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_answers_ok() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn readiness_reports_unreachable_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(
            Request::builder()
                .uri("/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ---------------------------------------------------------------------------
// Review API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn review_with_invalid_rating_is_rejected_before_any_store_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "a1" })))
        .expect(0)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(post_json(
            "/api/review",
            &json!({ "product": "a1", "rating": 9, "review": "Nice", "author": "Sana" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Rating must be a number between 1 and 5"
    );
}

#[tokio::test]
async fn review_for_unknown_product_is_not_created() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(MUTATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(post_json(
            "/api/review",
            &json!({ "product": "ghost", "rating": 4, "review": "Nice", "author": "Sana" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Product not found");
}

#[tokio::test]
async fn valid_review_is_created() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "a1" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(MUTATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionId": "tx1",
            "results": [{
                "id": "r1",
                "operation": "create",
                "document": {
                    "_id": "r1",
                    "rating": 4,
                    "review": "Nice",
                    "author": "Sana",
                    "createdAt": "2025-03-01T10:00:00Z"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(post_json(
            "/api/review",
            &json!({ "product": "a1", "rating": 4, "review": "  Nice ", "author": "Sana" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Review added");
    assert_eq!(body["review"]["_id"], "r1");
}

#[tokio::test]
async fn listing_reviews_skips_malformed_documents() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .and(query_param("$productId", "\"a1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                { "_id": "r1", "rating": 4.5, "review": "Soft lawn", "author": "Hina" },
                { "_id": "r2", "rating": "five", "review": "Great", "author": "Sana" }
            ]
        })))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(
            Request::builder()
                .uri("/api/review?product=a1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(body["reviews"][0]["rating"], 5);
}

#[tokio::test]
async fn listing_reviews_requires_product() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/api/review").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing product ID");
}

// ---------------------------------------------------------------------------
// Related products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn related_products_require_both_parameters() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(
            Request::builder()
                .uri("/api/related-products?productId=a1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing productId or fabric"
    );
}

// ---------------------------------------------------------------------------
// Catalog pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_category_is_not_found() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/shoes").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_renders_when_store_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/trouser").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Cart and checkout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn checkout_with_empty_cart_returns_to_cart() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/checkout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn sized_product_without_size_is_not_added() {
    let server = MockServer::start().await;
    mount_entry(&server).await;
    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cart/add")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("category=stitch&product_id=a1&size=&quantity=1"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/stitch/a1");
    let cookie = session_cookie(&response);

    let count = app
        .oneshot(
            Request::builder()
                .uri("/cart/count")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_text(count).await.trim(), "");
}

#[tokio::test]
async fn added_items_flow_into_the_checkout_link() {
    let server = MockServer::start().await;
    mount_entry(&server).await;
    let app = test_app(&server);

    let added = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cart/add")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("HX-Request", "true")
                .body(Body::from("category=stitch&product_id=a1&size=M&color=Teal&quantity=2"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(added.status(), StatusCode::OK);
    assert_eq!(added.headers()["HX-Trigger"], "cart-updated");
    let cookie = session_cookie(&added);
    assert!(body_text(added).await.contains(">2<"));

    let checkout = app
        .oneshot(
            Request::builder()
                .uri("/checkout")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(checkout.status(), StatusCode::SEE_OTHER);
    let link = location(&checkout);
    assert!(link.starts_with("https://wa.me/923232979158?text="), "{link}");
    assert!(link.contains("Embroidered%20Lawn%203pc"), "{link}");
}

fn cart_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Add two of `a1` (size M, Teal) to a fresh session, returning its cookie.
async fn start_cart(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(cart_form(
            "/cart/add",
            "category=stitch&product_id=a1&size=M&color=Teal&quantity=2",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response)
}

/// Number shown in the cart badge; an empty badge means zero.
async fn cart_count(app: &Router, cookie: &str) -> u64 {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cart/count")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let html = body_text(response).await;
    html.trim()
        .strip_suffix("</span>")
        .and_then(|badge| badge.rsplit('>').next())
        .map_or(0, |count| count.parse().unwrap())
}

async fn post_cart(app: &Router, uri: &str, body: &str, cookie: &str) -> Response {
    app.clone()
        .oneshot(cart_form(uri, body, Some(cookie)))
        .await
        .unwrap()
}

const LINE_A1: &str = "product_id=a1&size=M&color=Teal";

#[tokio::test]
async fn blank_quantity_adds_one() {
    let server = MockServer::start().await;
    mount_entry(&server).await;
    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(cart_form(
            "/cart/add",
            "category=stitch&product_id=a1&size=S&color=&quantity=",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response);
    assert_eq!(cart_count(&app, &cookie).await, 1);
}

#[tokio::test]
async fn update_clamps_quantity_to_one() {
    let server = MockServer::start().await;
    mount_entry(&server).await;
    let app = test_app(&server);
    let cookie = start_cart(&app).await;
    assert_eq!(cart_count(&app, &cookie).await, 2);

    for (quantity, expected) in [("5", 5), ("0", 1), ("-3", 1)] {
        let response = post_cart(
            &app,
            "/cart/update",
            &format!("{LINE_A1}&quantity={quantity}"),
            &cookie,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/cart");
        assert_eq!(cart_count(&app, &cookie).await, expected, "quantity={quantity}");
    }
}

#[tokio::test]
async fn remove_only_matches_the_full_line_key() {
    let server = MockServer::start().await;
    mount_entry(&server).await;
    let app = test_app(&server);
    let cookie = start_cart(&app).await;

    // Same product, different size: nothing to remove.
    let response = post_cart(
        &app,
        "/cart/remove",
        "product_id=a1&size=L&color=Teal",
        &cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(cart_count(&app, &cookie).await, 2);

    post_cart(&app, "/cart/remove", LINE_A1, &cookie).await;
    assert_eq!(cart_count(&app, &cookie).await, 0);
}

#[tokio::test]
async fn clear_empties_the_cart() {
    let server = MockServer::start().await;
    mount_entry(&server).await;
    let app = test_app(&server);
    let cookie = start_cart(&app).await;

    let response = post_cart(&app, "/cart/clear", "", &cookie).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");
    assert_eq!(cart_count(&app, &cookie).await, 0);
}

async fn checkout(app: &Router, cookie: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri("/checkout")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn checkout_keeps_cart_by_default() {
    let server = MockServer::start().await;
    mount_entry(&server).await;
    let app = test_app(&server);
    let cookie = start_cart(&app).await;

    let response = checkout(&app, &cookie).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("https://wa.me/"));
    assert_eq!(cart_count(&app, &cookie).await, 2);
}

#[tokio::test]
async fn checkout_clears_cart_when_configured() {
    let server = MockServer::start().await;
    mount_entry(&server).await;
    let app = test_app_with(&server, |config| {
        config.checkout.clear_cart_on_checkout = true;
    });
    let cookie = start_cart(&app).await;

    let response = checkout(&app, &cookie).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("https://wa.me/"));
    assert_eq!(cart_count(&app, &cookie).await, 0);

    // The next checkout finds nothing to send.
    let again = checkout(&app, &cookie).await;
    assert_eq!(location(&again), "/cart");
}

// ---------------------------------------------------------------------------
// Product creation
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "fqboundary7d1";

fn multipart_body(parts: &[(&str, &str)], file: Option<(&str, &str)>) -> Body {
    let mut body = String::new();
    for (name, value) in parts {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some((name, filename)) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\nJPEGDATA\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Body::from(body)
}

fn post_multipart(body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/products")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

const PRODUCT_FIELDS: &[(&str, &str)] = &[
    ("title", "Chiffon Suit"),
    ("description", "Three piece chiffon"),
    ("price", "7800"),
    ("fabric", "Chiffon"),
    ("category", "unstitch"),
    ("piecesIncluded", "Shirt, Dupatta, Trouser"),
];

#[tokio::test]
async fn product_without_image_is_rejected() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(post_multipart(multipart_body(PRODUCT_FIELDS, None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Product image is required");
}

#[tokio::test]
async fn failed_upload_creates_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ASSETS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "disk full" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(MUTATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(post_multipart(multipart_body(
            PRODUCT_FIELDS,
            Some(("image", "front.jpg")),
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn product_is_created_after_upload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ASSETS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document": { "_id": "image-f00-jpg", "url": "https://cdn.sanity.io/f00.jpg" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(MUTATE_PATH))
        .and(wiremock::matchers::body_partial_json(json!({
            "mutations": [{
                "create": {
                    "_type": "unstitch",
                    "category": "unstitch",
                    "piecesIncluded": ["Shirt", "Dupatta", "Trouser"],
                    "image": { "_type": "image", "asset": { "_type": "reference", "_ref": "image-f00-jpg" } }
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "p1", "document": { "_id": "p1", "_type": "unstitch" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(post_multipart(multipart_body(
            PRODUCT_FIELDS,
            Some(("image", "front.jpg")),
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["_id"], "p1");
}
