use app_core::middleware::{require_session, AuthGuardState};
use axum::routing::{get, post, put};
use axum::{middleware, Router};

use crate::inbound::http::billing::*;
use crate::inbound::http::booking::*;
use crate::inbound::http::review::*;
use crate::inbound::http::station::*;
use crate::inbound::state::MarketState;

pub fn create_router(state: MarketState, guard: AuthGuardState) -> Router {
    let protected_routes = Router::new()
        .route("/api/host/stations", get(list_stations).post(create_station))
        .route(
            "/api/host/stations/{station_id}",
            put(update_station).delete(delete_station),
        )
        .route("/api/bookings/{booking_id}/review", post(create_review))
        .route(
            "/api/reviews/{review_id}",
            get(get_review).put(update_review).delete(delete_review),
        )
        .route("/api/dashboard", get(dashboard))
        .route("/api/geolocation", get(geolocation))
        .route_layer(middleware::from_fn_with_state(guard, require_session));

    let public_routes = Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/", post(create_booking))
        .route("/api/nearby_stations", get(nearby_stations))
        .route("/api/stations/{station_id}/availability", get(station_availability))
        .route("/api/stations/{station_id}/reviews", get(station_reviews))
        .route("/api/payments/checkout", post(create_checkout_session));

    Router::new().merge(public_routes).merge(protected_routes).with_state(state)
}
