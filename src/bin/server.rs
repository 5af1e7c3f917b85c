use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cellfield::config::{Params, Variant};
use cellfield::history::History;
use cellfield::{Stroke, run};

/// Upper bounds per request.
const MAX_STEPS: usize = 5000;
const MAX_SIZE: usize = 1024;
const MAX_HISTORY: usize = 5000;
const MAX_RADIUS: u32 = 256;
const MAX_STROKES: usize = 1024;

#[derive(Deserialize)]
struct RunRequest {
    #[serde(default)]
    variant: Variant,
    seed: Option<u64>,
    #[serde(default)]
    steps: usize,
    #[serde(default)]
    strokes: Vec<Stroke>,
    #[serde(default)]
    params: Params,
}

#[derive(Serialize)]
struct RunResponse {
    variant: Variant,
    size: usize,
    generation: u64,
    live_cells: usize,
    image: String,
    history: History,
    rule_table: Option<String>,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

/// Reject requests whose cost is not bounded by the limits above.
fn check_limits(req: &RunRequest) -> Result<(), String> {
    let p = &req.params;
    if p.size.is_some_and(|n| n > MAX_SIZE) {
        return Err(format!("grid side above {MAX_SIZE}"));
    }
    if p.history_capacity > MAX_HISTORY {
        return Err(format!("history capacity above {MAX_HISTORY}"));
    }
    if p.species_radius > MAX_RADIUS || p.sum_radius > MAX_RADIUS {
        return Err(format!("stroke radius above {MAX_RADIUS}"));
    }
    if req.strokes.len() > MAX_STROKES {
        return Err(format!("more than {MAX_STROKES} strokes"));
    }
    Ok(())
}

async fn run_handler(Json(req): Json<RunRequest>) -> Result<Json<RunResponse>, (StatusCode, String)> {
    let seed = req.seed.unwrap_or(42);
    let steps = req.steps.min(MAX_STEPS);
    check_limits(&req).map_err(|msg| {
        warn!(%msg, "request over limits");
        (StatusCode::BAD_REQUEST, msg)
    })?;

    let response = tokio::task::spawn_blocking(move || -> Result<RunResponse, (StatusCode, String)> {
        let (sim, rgba, timings) = run(req.variant, seed, &req.params, &req.strokes, steps)
            .map_err(|err| {
                warn!(%err, "rejected run request");
                (StatusCode::BAD_REQUEST, err.to_string())
            })?;

        let size = sim.size();
        let image = encode_png(&rgba, size, size).map_err(|err| {
            error!(%err, "PNG encode failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        })?;

        Ok(RunResponse {
            variant: sim.variant(),
            size,
            generation: sim.generation(),
            live_cells: sim.live_count(),
            image,
            history: sim.history().clone(),
            rule_table: sim.rule_rows(),
            timings: timings
                .iter()
                .map(|t| TimingEntry {
                    name: t.name.to_string(),
                    ms: t.ms,
                })
                .collect(),
        })
    })
    .await
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))??;

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = Router::new()
        .route("/api/run", post(run_handler))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("cellfield server at http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, "failed to bind");
            return;
        }
    };
    if let Err(err) = axum::serve(listener, app).await {
        error!(%err, "server stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(body: &str) -> RunRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn default_request_is_within_limits() {
        assert_eq!(check_limits(&request("{}")), Ok(()));
        assert_eq!(check_limits(&request(r#"{"variant":"sum","params":{"size":1024}}"#)), Ok(()));
    }

    #[test]
    fn oversized_settings_are_rejected() {
        for body in [
            r#"{"params":{"size":1025}}"#,
            r#"{"params":{"history_capacity":1000000000000}}"#,
            r#"{"params":{"sum_radius":3000}}"#,
            r#"{"params":{"species_radius":4294967295}}"#,
        ] {
            assert!(check_limits(&request(body)).is_err(), "{body}");
        }
        let strokes = vec![Stroke { x: 0, y: 0, erase: false }; MAX_STROKES + 1];
        let req = RunRequest {
            variant: Variant::Species,
            seed: None,
            steps: 1,
            strokes,
            params: Params::default(),
        };
        assert!(check_limits(&req).is_err());
    }
}
