use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::features::sessions::handlers::{
    add_entries, annotate, clear_entries, create_session, delete_session, get_preview,
    get_session, remove_entry, update_entry, write_all, write_entry, SessionsState,
};

/// Create routes for the sessions feature
///
/// `upload_limit` bounds the multipart body of a single selection.
pub fn routes(state: SessionsState, upload_limit: usize) -> Router {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/{session_id}",
            get(get_session).delete(delete_session),
        )
        .route(
            "/api/sessions/{session_id}/entries",
            post(add_entries)
                .layer(DefaultBodyLimit::max(upload_limit))
                .delete(clear_entries),
        )
        .route(
            "/api/sessions/{session_id}/entries/{entry_id}",
            patch(update_entry).delete(remove_entry),
        )
        .route(
            "/api/sessions/{session_id}/entries/{entry_id}/preview",
            get(get_preview),
        )
        .route(
            "/api/sessions/{session_id}/entries/{entry_id}/write",
            post(write_entry),
        )
        .route("/api/sessions/{session_id}/annotate", post(annotate))
        .route("/api/sessions/{session_id}/write-all", post(write_all))
        .with_state(state)
}
