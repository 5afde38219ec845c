//! Data import routes

use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use flangio_common::{Envelope, FieldError, FlangioError, Result};
use flangio_imports::{import_file, IMPORT_DELETED_MESSAGE, IMPORT_SUCCESS_MESSAGE};
use serde_json::json;
use tracing::info;

use crate::auth::SessionUser;
use crate::flash::Flash;
use crate::forms::{invalid_form, REQUIRED_MESSAGE};
use crate::response::JsonEnvelope;
use crate::routes::mongodb::SHOW_DBS;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dataimport/", get(list_all))
        .route("/dataimport/import", post(import_default))
        .route("/dataimport/records/{slug}/delete", post(delete_import))
        .route("/dataimport/{db}/{coll}", get(list_for_namespace))
        .route("/dataimport/{db}/{coll}/import", post(import_into))
}

fn listing(state: &AppState, database: Option<&str>, collection: Option<&str>) -> JsonEnvelope {
    let records = state.imports.list_imports(database, collection);
    Envelope::ok(format!("Found {} import(s).", records.len()))
        .with_results(json!(records))
        .into()
}

async fn list_all(State(state): State<AppState>) -> JsonEnvelope {
    listing(&state, None, None)
}

async fn list_for_namespace(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
) -> JsonEnvelope {
    listing(&state, Some(&db), Some(&coll))
}

/// Fields of the upload form
#[derive(Debug, Default)]
struct Upload {
    database_name: Option<String>,
    collection_name: Option<String>,
    file: Option<(String, String)>,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> FlangioError {
    FlangioError::Validation(e.to_string())
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "database_name" => {
                upload.database_name = Some(field.text().await.map_err(multipart_error)?);
            }
            "collection_name" => {
                upload.collection_name = Some(field.text().await.map_err(multipart_error)?);
            }
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                let contents = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    FlangioError::Validation("The file must be UTF-8 encoded text.".to_string())
                })?;
                upload.file = Some((filename, contents));
            }
            _ => {}
        }
    }
    Ok(upload)
}

async fn import_default(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    flash: Flash,
    multipart: Multipart,
) -> Response {
    run_import(&state, &user.username, flash, None, multipart).await
}

async fn import_into(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    SessionUser(user): SessionUser,
    flash: Flash,
    multipart: Multipart,
) -> Response {
    run_import(&state, &user.username, flash, Some((db, coll)), multipart).await
}

async fn run_import(
    state: &AppState,
    username: &str,
    flash: Flash,
    target: Option<(String, String)>,
    multipart: Multipart,
) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return rejected(vec![FieldError::new("file", e.to_string())]),
    };
    let Some((filename, contents)) = upload.file else {
        return rejected(vec![FieldError::new("file", REQUIRED_MESSAGE)]);
    };

    // Path names win over form fields, which win over the defaults
    let (database, collection) = match &target {
        Some((db, coll)) => (Some(db.as_str()), Some(coll.as_str())),
        None => (upload.database_name.as_deref(), upload.collection_name.as_deref()),
    };
    let ns = state.admin.namespace(database, collection);

    match import_file(
        state.admin.store().as_ref(),
        &state.imports,
        &ns,
        username,
        &filename,
        &contents,
    )
    .await
    {
        Ok(record) => {
            info!(slug = %record.slug, user = username, "data file imported");
            flash
                .success(IMPORT_SUCCESS_MESSAGE)
                .redirect(SHOW_DBS)
                .into_response()
        }
        Err(FlangioError::Validation(message)) => {
            rejected(vec![FieldError::new("file", message)])
        }
        Err(e) => JsonEnvelope::from(e).into_response(),
    }
}

async fn delete_import(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    flash: Flash,
) -> Response {
    match state.imports.delete_import(&slug) {
        Ok(_) => flash
            .success(IMPORT_DELETED_MESSAGE)
            .redirect(SHOW_DBS)
            .into_response(),
        Err(e) => JsonEnvelope::from(e).into_response(),
    }
}

fn rejected(errors: Vec<FieldError>) -> Response {
    JsonEnvelope(invalid_form(errors)).into_response()
}
