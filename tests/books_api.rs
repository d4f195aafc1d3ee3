use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookshelf_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let registry = bookshelf_app::build_registry();
    bookshelf_http::build_router(&registry, &Settings::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn add(app: &Router, body: Value) -> String {
    let (status, json) = send(app, Method::POST, "/books", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["bookId"].as_str().unwrap().to_string()
}

fn book(name: &str, page_count: u32, read_page: u32) -> Value {
    json!({
        "name": name,
        "year": 2010,
        "author": "John Doe",
        "summary": "Lorem ipsum dolor sit amet",
        "publisher": "Dicoding Indonesia",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": false
    })
}

#[tokio::test]
async fn add_book_returns_created_id() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/books", Some(book("Harry Potter", 200, 200))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "Buku berhasil ditambahkan");
    let id = json["data"]["bookId"].as_str().unwrap();
    assert_eq!(id.len(), 16);

    let (status, json) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let stored = &json["data"]["book"];
    assert_eq!(stored["id"], id);
    assert_eq!(stored["finished"], true);
    assert_eq!(stored["insertedAt"], stored["updatedAt"]);
}

#[tokio::test]
async fn add_book_rejects_invalid_payloads() {
    let app = app();

    let (status, json) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"pageCount": 100, "readPage": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({"status": "fail", "message": "Gagal menambahkan buku. Mohon isi nama buku"})
    );

    let (status, json) = send(&app, Method::POST, "/books", Some(book("Brief History", 300, 310))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
    );

    let (status, json) = send(&app, Method::POST, "/books", Some(json!("Harry Potter"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "fail");
    assert!(json["message"].as_str().unwrap().starts_with("Gagal menambahkan buku."));

    let (_, json) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(json["data"]["books"], json!([]));
}

#[tokio::test]
async fn add_book_with_mistyped_fields_reports_missing_name() {
    let app = app();
    let (status, json) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"year": "2010", "pageCount": "100", "readPage": null, "reading": "yes"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({"status": "fail", "message": "Gagal menambahkan buku. Mohon isi nama buku"})
    );
}

#[tokio::test]
async fn add_book_accepts_any_json_number() {
    let app = app();
    let id = add(&app, json!({"name": "Dune", "pageCount": 200.0, "readPage": 200})).await;

    let (_, json) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    let stored = &json["data"]["book"];
    assert_eq!(stored["finished"], true);
    assert_eq!(stored["pageCount"], json!(200.0));
    assert_eq!(stored["readPage"], 200);

    let id = add(&app, json!({"name": "Dune", "pageCount": 100.5, "readPage": -1, "reading": "yes"})).await;
    let (_, json) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    let stored = &json["data"]["book"];
    assert_eq!(stored["finished"], false);
    assert_eq!(stored["reading"], true);
    assert_eq!(stored["readPage"], -1);
}

#[tokio::test]
async fn timestamps_have_millisecond_width() {
    let app = app();
    let id = add(&app, book("Harry Potter", 1, 1)).await;

    let (_, json) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    let inserted = json["data"]["book"]["insertedAt"].as_str().unwrap();
    assert_eq!(inserted.len(), "2024-05-01T10:00:00.000Z".len(), "{inserted}");
    assert_eq!(&inserted[19..20], ".");
    assert!(inserted.ends_with('Z'));
}

#[tokio::test]
async fn list_books_projects_summaries_and_filters() {
    let app = app();
    let harry = add(&app, book("Harry Potter", 200, 200)).await;
    let mut hobbit = book("The Hobbit", 300, 10);
    hobbit["reading"] = json!(true);
    let hobbit = add(&app, hobbit).await;

    let (status, json) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(
        json["data"]["books"],
        json!([
            {"id": harry, "name": "Harry Potter", "publisher": "Dicoding Indonesia"},
            {"id": hobbit, "name": "The Hobbit", "publisher": "Dicoding Indonesia"}
        ])
    );

    let (_, json) = send(&app, Method::GET, "/books?name=hARRy", None).await;
    assert_eq!(json["data"]["books"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["books"][0]["id"], harry.as_str());

    let (_, json) = send(&app, Method::GET, "/books?reading=1", None).await;
    assert_eq!(json["data"]["books"][0]["id"], hobbit.as_str());

    let (_, json) = send(&app, Method::GET, "/books?finished=1", None).await;
    assert_eq!(json["data"]["books"][0]["id"], harry.as_str());

    // name wins over the other filters
    let (_, json) = send(&app, Method::GET, "/books?name=hobbit&finished=1", None).await;
    assert_eq!(json["data"]["books"][0]["id"], hobbit.as_str());
}

#[tokio::test]
async fn list_books_rejects_repeated_query_keys() {
    let app = app();
    let (status, json) = send(&app, Method::GET, "/books?name=a&name=b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "fail");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn get_unknown_book_is_not_found() {
    let app = app();
    let (status, json) = send(&app, Method::GET, "/books/xxxxxxxxxxxxxxxx", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"status": "fail", "message": "Buku tidak ditemukan"}));
}

#[tokio::test]
async fn edit_book_updates_fields_and_timestamp() {
    let app = app();
    let id = add(&app, book("Harry Potter", 200, 20)).await;
    let (_, before) = send(&app, Method::GET, &format!("/books/{id}"), None).await;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let (status, json) = send(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        Some(book("Harry Potter and the Goblet of Fire", 600, 600)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"status": "success", "message": "Buku berhasil diperbarui"})
    );

    let (_, after) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    let (before, after) = (&before["data"]["book"], &after["data"]["book"]);
    assert_eq!(after["name"], "Harry Potter and the Goblet of Fire");
    assert_eq!(after["finished"], true);
    assert_eq!(after["insertedAt"], before["insertedAt"]);
    assert_ne!(after["updatedAt"], before["updatedAt"]);
}

#[tokio::test]
async fn edit_book_failures() {
    let app = app();
    let id = add(&app, book("Harry Potter", 200, 20)).await;
    let uri = format!("/books/{id}");

    let (status, json) = send(&app, Method::PUT, &uri, Some(json!({"pageCount": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Gagal memperbarui buku. Mohon isi nama buku");

    let (status, json) = send(&app, Method::PUT, &uri, Some(book("Harry Potter", 10, 11))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount"
    );

    // validation runs before the id lookup
    let (status, _) = send(&app, Method::PUT, "/books/missing", Some(book("", 1, 1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(&app, Method::PUT, "/books/missing", Some(book("Dune", 1, 1))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Gagal memperbarui buku. Id tidak ditemukan");
}

#[tokio::test]
async fn delete_book_then_get_is_not_found() {
    let app = app();
    let keep = add(&app, book("Keep", 1, 1)).await;
    let id = add(&app, book("Drop", 1, 1)).await;
    let uri = format!("/books/{id}");

    let (status, json) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "success", "message": "Buku berhasil dihapus"}));

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Buku gagal dihapus. Id tidak ditemukan");

    let (_, json) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(json["data"]["books"], json!([{"id": keep, "name": "Keep", "publisher": "Dicoding Indonesia"}]));
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, json) = send(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/books/{book_id}"]["put"].is_object());
}
