use axum::{
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, SecurityHeaders};
use crate::handlers::{health_check, shows, tickets};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    build_router(state, SecurityHeaders::from_env())
}

pub fn build_router(state: AppState, security: SecurityHeaders) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/shows", get(shows::list_shows).post(shows::create_show))
        .route(
            "/shows/:id",
            get(shows::get_show)
                .put(shows::update_show)
                .delete(shows::delete_show),
        )
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets/:id/cancel", put(tickets::cancel_ticket))
        .with_state(state);

    security
        .apply(api)
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}
