use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cellfield::Simulation;
use cellfield::clock::Ticker;
use cellfield::config::{Params, Variant};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let variant = args.get(1).and_then(|s| Variant::parse(s)).unwrap_or_default();
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);
    let size: Option<usize> = args.get(3).and_then(|s| s.parse().ok());
    let steps: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(300);
    let out_dir: PathBuf = args
        .get(5)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));
    let speed_ms: u64 = args.get(6).and_then(|s| s.parse().ok()).unwrap_or(0);
    let life_trail = args.get(7).is_some_and(|s| s == "trail");

    std::fs::create_dir_all(&out_dir).expect("failed to create output directory");

    let params = Params {
        size,
        speed_ms,
        life_trail,
        ..Params::default()
    };

    let t = Instant::now();
    let mut sim = match Simulation::build(variant, &params, seed) {
        Ok(sim) => sim,
        Err(err) => {
            error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };
    let seed_ms = t.elapsed().as_secs_f64() * 1000.0;

    info!(
        ?variant,
        size = sim.size(),
        seed,
        steps,
        speed_ms,
        "running simulation"
    );

    // Host-owned loop: the ticker decides when a step is due.
    let t = Instant::now();
    let mut ticker = Ticker::new(params.speed_ms);
    let mut trail = sim.trail(&params);
    while sim.generation() < steps {
        let now = Instant::now();
        if ticker.due(now) {
            sim.step();
            sim.update_trail(&mut trail);
        } else {
            std::thread::sleep(ticker.remaining(now));
        }
    }
    let step_ms = t.elapsed().as_secs_f64() * 1000.0;

    let t = Instant::now();
    let rgba = sim.render(&params, trail.as_ref());
    let render_ms = t.elapsed().as_secs_f64() * 1000.0;

    eprintln!("\nTimings:");
    for (name, ms) in [("seed", seed_ms), ("step", step_ms), ("render", render_ms)] {
        eprintln!("  {:20} {:8.1} ms", name, ms);
    }

    let n = sim.size();
    let path = out_dir.join("frame.png");
    image::save_buffer(&path, &rgba, n as u32, n as u32, image::ColorType::Rgba8)
        .expect("failed to save image");
    info!(path = %path.display(), "saved frame");

    let path = out_dir.join("history.json");
    let json = serde_json::to_string_pretty(sim.history()).expect("history serializes");
    std::fs::write(&path, json).expect("failed to write history");
    info!(path = %path.display(), samples = sim.history().len(), "saved history");

    if let Some(rows) = sim.rule_rows() {
        let path = out_dir.join("rule_table.txt");
        std::fs::write(&path, rows).expect("failed to write rule table");
    }

    info!(
        generation = sim.generation(),
        live = sim.live_count(),
        "done"
    );
}
