//! OSRM walking-route client
//!
//! Speaks the OSRM HTTP API with the `foot` profile. Requests are fired as
//! tokio tasks; completions land in a shared queue tagged with the request
//! generation and are drained by the frame loop, which lets the engine
//! discard stale responses.

use egui::Context;
use field_nav_core::{LatLng, RouteError, RouteRequest, RouteResult};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Route completions keyed by request generation
pub type RouteOutcomes = Arc<RwLock<Vec<(u64, Result<RouteResult, RouteError>)>>>;

pub struct OsrmClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    legs: Vec<OsrmLeg>,
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmLeg {
    distance: f64,
}

/// GeoJSON LineString; coordinates are [lon, lat]
#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl OsrmClient {
    pub fn new(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("HTTP client builder failed ({e}), using defaults");
                reqwest::Client::new()
            });
        Self { http, base_url }
    }

    fn route_url(&self, request: &RouteRequest) -> String {
        let mut coords = String::new();
        let mut push = |p: &LatLng| {
            if !coords.is_empty() {
                coords.push(';');
            }
            // OSRM wants lon,lat
            coords.push_str(&format!("{:.6},{:.6}", p.lng, p.lat));
        };
        push(&request.origin);
        for stop in &request.stopovers {
            push(stop);
        }
        push(&request.destination);

        format!(
            "{}/route/v1/foot/{coords}?overview=full&geometries=geojson&steps=false",
            self.base_url.trim_end_matches('/')
        )
    }

    pub async fn route(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let url = self.route_url(request);
        tracing::debug!("Requesting route generation {}", request.generation);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RouteError::Malformed(e.to_string()))?;

        if let Some(err) = map_http_status(response.status()) {
            return Err(err);
        }

        let body: OsrmResponse = response
            .json()
            .await
            .map_err(|e| RouteError::Malformed(e.to_string()))?;
        parse_response(body)
    }
}

fn map_http_status(status: reqwest::StatusCode) -> Option<RouteError> {
    match status.as_u16() {
        429 => Some(RouteError::QuotaExceeded),
        401 | 403 => Some(RouteError::PermissionDenied),
        _ if !status.is_success() => {
            Some(RouteError::Malformed(format!("unexpected HTTP status {status}")))
        }
        _ => None,
    }
}

fn parse_response(body: OsrmResponse) -> Result<RouteResult, RouteError> {
    match body.code.as_str() {
        "Ok" => {
            let route = body
                .routes
                .into_iter()
                .next()
                .ok_or_else(|| RouteError::Malformed("Ok response with no routes".into()))?;
            Ok(RouteResult {
                path: route
                    .geometry
                    .coordinates
                    .iter()
                    .map(|c| LatLng::new(c[1], c[0]))
                    .collect(),
                leg_meters: route.legs.iter().map(|l| l.distance).collect(),
                total_meters: route.distance,
            })
        }
        "NoRoute" | "NoSegment" => Err(RouteError::NoRoute),
        "InvalidQuery" | "InvalidUrl" | "InvalidValue" | "InvalidOptions" => {
            let detail = body.message.unwrap_or_else(|| body.code.clone());
            Err(RouteError::Malformed(detail))
        }
        other => Err(RouteError::Malformed(format!(
            "unexpected OSRM code {other}: {}",
            body.message.unwrap_or_default()
        ))),
    }
}

/// Dispatch one route request off the UI thread; the completion lands in
/// `outcomes` and the context is woken to pick it up.
pub fn spawn_route(
    runtime: &tokio::runtime::Handle,
    client: Arc<OsrmClient>,
    request: RouteRequest,
    outcomes: RouteOutcomes,
    ctx: Context,
) {
    runtime.spawn(async move {
        let generation = request.generation;
        let result = client.route(&request).await;
        outcomes.write().await.push((generation, result));
        ctx.request_repaint();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OsrmClient {
        OsrmClient::new("https://router.example.org/".into())
    }

    #[test]
    fn test_route_url_uses_foot_profile_and_lon_lat_order() {
        let request = RouteRequest {
            generation: 1,
            origin: LatLng::new(51.5, -0.09),
            stopovers: vec![LatLng::new(51.51, -0.08)],
            destination: LatLng::new(51.52, -0.07),
        };

        let url = client().route_url(&request);
        assert_eq!(
            url,
            "https://router.example.org/route/v1/foot/\
             -0.090000,51.500000;-0.080000,51.510000;-0.070000,51.520000\
             ?overview=full&geometries=geojson&steps=false"
        );
    }

    #[test]
    fn test_parse_ok_response() {
        let body: OsrmResponse = serde_json::from_value(serde_json::json!({
            "code": "Ok",
            "routes": [{
                "distance": 1234.5,
                "legs": [{ "distance": 700.0 }, { "distance": 534.5 }],
                "geometry": {
                    "coordinates": [[-0.09, 51.5], [-0.08, 51.51], [-0.07, 51.52]]
                }
            }]
        }))
        .unwrap();

        let result = parse_response(body).unwrap();
        assert_eq!(result.total_meters, 1234.5);
        assert_eq!(result.leg_meters, vec![700.0, 534.5]);
        assert_eq!(result.path.len(), 3);
        // lon,lat on the wire becomes lat,lng in memory
        assert_eq!(result.path[0], LatLng::new(51.5, -0.09));
    }

    #[test]
    fn test_parse_no_route_code() {
        let body: OsrmResponse = serde_json::from_value(serde_json::json!({
            "code": "NoRoute",
            "message": "Impossible route between points"
        }))
        .unwrap();
        assert!(matches!(parse_response(body), Err(RouteError::NoRoute)));
    }

    #[test]
    fn test_parse_invalid_query_carries_the_message() {
        let body: OsrmResponse = serde_json::from_value(serde_json::json!({
            "code": "InvalidQuery",
            "message": "Query string malformed close to position 12"
        }))
        .unwrap();
        match parse_response(body) {
            Err(RouteError::Malformed(msg)) => {
                assert!(msg.contains("position 12"));
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_http_status_mapping() {
        use reqwest::StatusCode;
        assert!(matches!(
            map_http_status(StatusCode::TOO_MANY_REQUESTS),
            Some(RouteError::QuotaExceeded)
        ));
        assert!(matches!(
            map_http_status(StatusCode::UNAUTHORIZED),
            Some(RouteError::PermissionDenied)
        ));
        assert!(matches!(
            map_http_status(StatusCode::FORBIDDEN),
            Some(RouteError::PermissionDenied)
        ));
        assert!(matches!(
            map_http_status(StatusCode::INTERNAL_SERVER_ERROR),
            Some(RouteError::Malformed(_))
        ));
        assert!(map_http_status(StatusCode::OK).is_none());
    }
}
