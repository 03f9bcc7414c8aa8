use crate::{
    routes::{
        index::get_index_route,
        students::{
            api_fallback, api_method_not_allowed, delete_student, get_students, post_student,
            put_student,
        },
    },
    state::RosterState,
};
use axum::{
    Router,
    routing::{get, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod index;
pub mod students;

pub fn build_router(state: RosterState) -> Router {
    let api = Router::new()
        .route("/students", get(get_students).post(post_student))
        .route("/students/{id_no}", put(put_student).delete(delete_student))
        .method_not_allowed_fallback(api_method_not_allowed)
        .fallback(api_fallback);

    let app = Router::new().route("/", get(get_index_route));
    //axum won't nest at the root, so an empty base merges instead
    let app = match state.config().api_base() {
        "" => app.merge(api),
        base => app.nest(base, api),
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
