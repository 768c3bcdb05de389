use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::provider::MapsProvider;
use super::service::GeoService;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteParams {
    pub input: Option<String>,
    pub session_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsParams {
    pub place_id: Option<String>,
}

/// Coordinates stay textual so malformed values get the proxy's own 400 body.
#[derive(Debug, Default, Deserialize)]
pub struct ReverseParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Router exposing the browser-facing geocoding proxy.
pub fn geo_router<P>(service: Arc<GeoService<P>>) -> Router
where
    P: MapsProvider + 'static,
{
    Router::new()
        .route("/api/google/autocomplete", get(autocomplete_handler::<P>))
        .route("/api/google/details", get(details_handler::<P>))
        .route("/api/google/reverse", get(reverse_handler::<P>))
        .with_state(service)
}

pub(crate) async fn autocomplete_handler<P>(
    State(service): State<Arc<GeoService<P>>>,
    Query(params): Query<AutocompleteParams>,
) -> Response
where
    P: MapsProvider + 'static,
{
    match service
        .autocomplete(params.input.as_deref(), params.session_token.as_deref())
        .await
    {
        Ok(predictions) => Json(json!({ "predictions": predictions })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn details_handler<P>(
    State(service): State<Arc<GeoService<P>>>,
    Query(params): Query<DetailsParams>,
) -> Response
where
    P: MapsProvider + 'static,
{
    match service.place_details(params.place_id.as_deref()).await {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn reverse_handler<P>(
    State(service): State<Arc<GeoService<P>>>,
    Query(params): Query<ReverseParams>,
) -> Response
where
    P: MapsProvider + 'static,
{
    match service
        .reverse(params.lat.as_deref(), params.lng.as_deref())
        .await
    {
        Ok(address) => Json(address).into_response(),
        Err(err) => err.into_response(),
    }
}
