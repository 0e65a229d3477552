use crate::{
    routes::{
        add_student::{get_add_student, post_add_student},
        edit_student::{get_edit_student, post_update_student},
        index::{get_home, get_index_route},
        search_student::post_search_student,
        show_student::{get_delete_student, get_show_student},
    },
    session_store::SqliteSessionStore,
    state::RollcallState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use time::Duration;
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, services::ServeDir,
    trace::TraceLayer,
};
use tower_sessions::{Expiry, SessionManagerLayer};

/// Every route plus the session, body-limit, compression and trace layers.
pub fn build_router(state: RollcallState) -> Router {
    let server_config = state.config().server_config();
    let upload_config = state.config().upload_config();

    let session_store = SqliteSessionStore::new((*state).clone());
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(server_config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            server_config.session_inactivity_secs,
        )));

    let uploads = ServeDir::new(state.uploads().directory());

    Router::new()
        .route("/", get(get_index_route))
        .route("/home", get(get_home))
        .route("/add_student", get(get_add_student).post(post_add_student))
        .route("/show_student", get(get_show_student))
        .route("/delete_student/{roll_number}", get(get_delete_student))
        .route("/edit_student/{roll_number}", get(get_edit_student))
        .route("/update_student/{roll_number}", post(post_update_student))
        .route("/search_student", post(post_search_student))
        .nest_service("/uploads", uploads)
        .layer(session_layer)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_config.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
