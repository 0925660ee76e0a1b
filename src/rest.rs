use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::{
    handlers::{todos, users},
    middleware::{auth_middleware, handle_panic},
    response::ApiResponse,
    AppState,
};

async fn index() -> ApiResponse<&'static str> {
    ApiResponse("Yup, it's working. Explore the API documentation")
}

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/users", post(users::register_user))
        .route("/users/login", post(users::login_user));

    let protected = Router::new()
        .route("/users/me", get(users::get_current_user))
        .route("/todos", post(todos::create_todo).get(todos::get_user_todos))
        .route(
            "/todos/:id",
            patch(todos::update_todo).delete(todos::delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    with_middleware(
        Router::new()
            .route("/", get(index))
            .nest("/api/v1", public.merge(protected)),
    )
    .with_state(state)
}

/// Request tracing around panic recovery, so a recovered 500 is still traced.
fn with_middleware<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(LatencyUnit::Millis),
                    ),
            )
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}
