//! MongoDB admin routes

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use flangio_common::{Envelope, Result};
use flangio_mongodb::document::json_to_document;
use flangio_mongodb::{parse_object, FindQuery, Namespace, Payload};
use serde::Deserialize;

use crate::flash::Flash;
use crate::forms::{invalid_form, CreateDatabaseForm, DeleteForm, DocumentForm, EnsureIndexForm};
use crate::response::JsonEnvelope;
use crate::state::AppState;

/// Where form flows land after acting on the store
pub const SHOW_DBS: &str = "/mongodb/";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mongodb/", get(show_dbs))
        .route("/mongodb/create-database", post(create_database))
        .route("/mongodb/documents/create", post(create_document))
        .route(
            "/mongodb/documents/update",
            post(update_document).put(update_document),
        )
        .route("/mongodb/documents/delete", post(delete_documents))
        .route("/mongodb/{db}/create-collection", post(create_collection))
        .route("/mongodb/{db}/drop", post(drop_database))
        .route("/mongodb/{db}/{coll}/drop", post(drop_collection))
        .route("/mongodb/{db}/{coll}/clear", post(clear_collection))
        .route("/mongodb/{db}/{coll}/ensure-index", post(ensure_index))
        .route("/mongodb/{db}/{coll}/documents", get(browse_documents))
        .route("/mongodb/{db}/{coll}/documents/create", post(create_document_in))
        .route(
            "/mongodb/{db}/{coll}/documents/update",
            post(update_document_in).put(update_document_in),
        )
        .route("/mongodb/{db}/{coll}/documents/delete", post(delete_documents_in))
}

/// Success → success message; failure → the message and each error description
fn report(flash: Flash, envelope: Envelope) -> Flash {
    if envelope.is_success() {
        return flash.success(envelope.message);
    }
    envelope
        .errors
        .unwrap_or_default()
        .into_iter()
        .fold(flash.error(envelope.message), |flash, e| flash.error(e.description))
}

fn namespace(state: &AppState, db: &str, coll: &str) -> Namespace {
    state.admin.namespace(Some(db), Some(coll))
}

async fn show_dbs(State(state): State<AppState>) -> JsonEnvelope {
    state.admin.list_databases().await.into()
}

async fn create_database(
    State(state): State<AppState>,
    flash: Flash,
    Form(form): Form<CreateDatabaseForm>,
) -> Response {
    create_namespace(&state, flash, form, None).await
}

async fn create_collection(
    State(state): State<AppState>,
    Path(db): Path<String>,
    flash: Flash,
    Form(form): Form<CreateDatabaseForm>,
) -> Response {
    create_namespace(&state, flash, form, Some(&db)).await
}

async fn create_namespace(
    state: &AppState,
    flash: Flash,
    form: CreateDatabaseForm,
    database: Option<&str>,
) -> Response {
    let cleaned = match form.clean(database) {
        Ok(cleaned) => cleaned,
        Err(errors) => return JsonEnvelope(invalid_form(errors)).into_response(),
    };
    let ns = Namespace::new(cleaned.database_name, cleaned.collection_name);
    let envelope = state.admin.create_database(&ns, &cleaned.initial_document).await;
    report(flash, envelope).redirect(SHOW_DBS).into_response()
}

async fn drop_database(
    State(state): State<AppState>,
    Path(db): Path<String>,
    flash: Flash,
) -> impl IntoResponse {
    let envelope = state.admin.drop_database(&db).await;
    report(flash, envelope).redirect(SHOW_DBS)
}

async fn drop_collection(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    flash: Flash,
) -> impl IntoResponse {
    let envelope = state.admin.drop_collection(&namespace(&state, &db, &coll)).await;
    report(flash, envelope).redirect(SHOW_DBS)
}

async fn clear_collection(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    flash: Flash,
) -> impl IntoResponse {
    let envelope = state.admin.clear_collection(&namespace(&state, &db, &coll)).await;
    report(flash, envelope).redirect(SHOW_DBS)
}

async fn ensure_index(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    flash: Flash,
    Form(form): Form<EnsureIndexForm>,
) -> Response {
    let spec = match form.clean() {
        Ok(spec) => spec,
        Err(errors) => return JsonEnvelope(invalid_form(errors)).into_response(),
    };
    let envelope = state
        .admin
        .ensure_index(&namespace(&state, &db, &coll), &spec)
        .await;
    report(flash, envelope).redirect(SHOW_DBS).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BrowseParams {
    filter: Option<String>,
    skip: Option<u64>,
    limit: Option<i64>,
}

impl BrowseParams {
    fn into_query(self) -> Result<FindQuery> {
        let mut query = FindQuery::new();
        if let Some(raw) = self.filter.filter(|f| !f.trim().is_empty()) {
            query = query.filter(json_to_document(parse_object(&raw, Payload::Query)?)?);
        }
        if let Some(skip) = self.skip {
            query = query.skip(skip);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        Ok(query)
    }
}

async fn browse_documents(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    Query(params): Query<BrowseParams>,
) -> JsonEnvelope {
    match params.into_query() {
        Ok(query) => state
            .admin
            .find_documents(&namespace(&state, &db, &coll), &query)
            .await
            .into(),
        Err(e) => e.into(),
    }
}

async fn write_document(state: &AppState, ns: Namespace, form: DocumentForm, update: bool) -> JsonEnvelope {
    match form.clean() {
        Ok(raw) => state
            .admin
            .create_or_update_document(&raw, &ns, update)
            .await
            .into(),
        Err(errors) => invalid_form(errors).into(),
    }
}

async fn delete_matching(state: &AppState, ns: Namespace, form: DeleteForm) -> JsonEnvelope {
    match form.clean() {
        Ok((raw, just_one)) => state.admin.delete_by_query(&raw, &ns, just_one).await.into(),
        Err(errors) => invalid_form(errors).into(),
    }
}

async fn create_document(State(state): State<AppState>, Form(form): Form<DocumentForm>) -> JsonEnvelope {
    let ns = state.admin.namespace(None, None);
    write_document(&state, ns, form, false).await
}

async fn create_document_in(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    Form(form): Form<DocumentForm>,
) -> JsonEnvelope {
    let ns = namespace(&state, &db, &coll);
    write_document(&state, ns, form, false).await
}

async fn update_document(State(state): State<AppState>, Form(form): Form<DocumentForm>) -> JsonEnvelope {
    let ns = state.admin.namespace(None, None);
    write_document(&state, ns, form, true).await
}

async fn update_document_in(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    Form(form): Form<DocumentForm>,
) -> JsonEnvelope {
    let ns = namespace(&state, &db, &coll);
    write_document(&state, ns, form, true).await
}

async fn delete_documents(State(state): State<AppState>, Form(form): Form<DeleteForm>) -> JsonEnvelope {
    let ns = state.admin.namespace(None, None);
    delete_matching(&state, ns, form).await
}

async fn delete_documents_in(
    State(state): State<AppState>,
    Path((db, coll)): Path<(String, String)>,
    Form(form): Form<DeleteForm>,
) -> JsonEnvelope {
    let ns = namespace(&state, &db, &coll);
    delete_matching(&state, ns, form).await
}
