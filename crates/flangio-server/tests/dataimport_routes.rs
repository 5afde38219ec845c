//! Router tests for file uploads and the import log

mod common;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Request, Response, StatusCode};
use common::{assert_redirect, cookie_pair, json_body, TestApp};

const BOUNDARY: &str = "flangio-test-boundary";

const SIGN_UP: [(&str, &str); 6] = [
    ("username", "importer"),
    ("email", "importer@example.com"),
    ("first_name", "Im"),
    ("last_name", "Porter"),
    ("password1", "importpass"),
    ("password2", "importpass"),
];

/// multipart/form-data body with plain fields followed by one file part
fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str)>) -> Body {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
    }
    if let Some((filename, contents)) = file {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/json\r\n\r\n{}\r\n",
            BOUNDARY, filename, contents
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    Body::from(body)
}

async fn logged_in(app: &TestApp) -> String {
    app.post_form("/accounts/create", &SIGN_UP).await;
    let response = app
        .post_form(
            "/accounts/login",
            &[("email", "importer@example.com"), ("password", "importpass")],
        )
        .await;
    cookie_pair(&response, "flangio_session").unwrap()
}

async fn upload(
    app: &TestApp,
    uri: &str,
    session: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str)>,
) -> Response<Body> {
    let mut builder = Request::post(uri).header(
        CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(session) = session {
        builder = builder.header(COOKIE, session);
    }
    app.send(builder.body(multipart_body(fields, file)).unwrap())
        .await
}

async fn document_count(app: &TestApp, db: &str, coll: &str) -> usize {
    let body = json_body(app.get(&format!("/mongodb/{}/{}/documents", db, coll)).await).await;
    body["results"].as_array().unwrap().len()
}

#[tokio::test]
async fn test_import_requires_login() {
    let app = TestApp::new();
    let response = upload(
        &app,
        "/dataimport/import",
        None,
        &[],
        Some(("people.json", r#"{"a": 1}"#)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.state.imports.is_empty());
}

#[tokio::test]
async fn test_import_array_into_form_namespace() {
    let app = TestApp::new();
    let session = logged_in(&app).await;

    let response = upload(
        &app,
        "/dataimport/import",
        Some(&session),
        &[("database_name", "people"), ("collection_name", "staff")],
        Some(("Staff List.json", r#"[{"name": "a"}, {"name": "b"}]"#)),
    )
    .await;
    assert_redirect(&response, "/mongodb/");
    assert_eq!(
        app.flash_after(&response).await,
        vec!["The data was imported successfully."]
    );
    assert_eq!(document_count(&app, "people", "staff").await, 2);

    let body = json_body(app.get("/dataimport/").await).await;
    assert_eq!(body["message"], "Found 1 import(s).");
    let record = &body["results"][0];
    assert_eq!(record["user"], "importer");
    assert_eq!(record["documents_imported"], 2);
    assert!(record["slug"].as_str().unwrap().starts_with("staff-list-"));
}

#[tokio::test]
async fn test_import_path_namespace_and_json_lines() {
    let app = TestApp::new();
    let session = logged_in(&app).await;

    let response = upload(
        &app,
        "/dataimport/logs/events/import",
        Some(&session),
        &[("database_name", "ignored")],
        Some(("events.jsonl", "{\"n\": 1}\n{\"n\": 2}\n{\"n\": 3}\n")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(document_count(&app, "logs", "events").await, 3);

    let body = json_body(app.get("/dataimport/logs/events").await).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    let body = json_body(app.get("/dataimport/logs/other").await).await;
    assert_eq!(body["message"], "Found 0 import(s).");
}

#[tokio::test]
async fn test_import_default_namespace() {
    let app = TestApp::new();
    let session = logged_in(&app).await;
    upload(
        &app,
        "/dataimport/import",
        Some(&session),
        &[],
        Some(("one.json", r#"{"k": "v"}"#)),
    )
    .await;
    assert_eq!(document_count(&app, "flangio", "main").await, 1);
}

#[tokio::test]
async fn test_import_rejects_bad_files() {
    let app = TestApp::new();
    let session = logged_in(&app).await;

    let missing = upload(&app, "/dataimport/import", Some(&session), &[], None).await;
    let body = json_body(missing).await;
    assert_eq!(body["code"], 400);
    assert_eq!(body["errors"][0]["field"], "file");
    assert_eq!(body["errors"][0]["description"], "This field is required.");

    let not_objects = upload(
        &app,
        "/dataimport/import",
        Some(&session),
        &[],
        Some(("bad.json", "[1, 2]")),
    )
    .await;
    let body = json_body(not_objects).await;
    assert_eq!(body["errors"][0]["field"], "file");
    assert_eq!(
        body["errors"][0]["description"],
        "Item 1 in the file is not a JSON object."
    );
    assert!(app.state.imports.is_empty());
}

#[tokio::test]
async fn test_delete_import_keeps_documents() {
    let app = TestApp::new();
    let session = logged_in(&app).await;
    upload(
        &app,
        "/dataimport/a/b/import",
        Some(&session),
        &[],
        Some(("rows.json", r#"[{"r": 1}, {"r": 2}]"#)),
    )
    .await;
    let slug = app.state.imports.list_imports(None, None)[0].slug.clone();

    let response = app
        .post_form(&format!("/dataimport/records/{}/delete", slug), &[])
        .await;
    assert_redirect(&response, "/mongodb/");
    assert_eq!(
        app.flash_after(&response).await,
        vec!["The record of the import was deleted. No data was removed from MongoDB."]
    );
    assert!(app.state.imports.is_empty());
    assert_eq!(document_count(&app, "a", "b").await, 2);

    let again = app
        .post_form(&format!("/dataimport/records/{}/delete", slug), &[])
        .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_collection_named_delete_lists_imports() {
    let app = TestApp::new();
    let session = logged_in(&app).await;
    upload(
        &app,
        "/dataimport/people/delete/import",
        Some(&session),
        &[],
        Some(("rows.json", r#"{"r": 1}"#)),
    )
    .await;

    let response = app.get("/dataimport/people/delete").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Found 1 import(s).");
    assert_eq!(body["results"][0]["collection_name"], "delete");
}
