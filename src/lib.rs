pub mod boundary;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod history;
pub mod mask;
pub mod render;
pub mod rng;
pub mod rules;

use std::time::Instant;

use serde::Deserialize;

use config::{Params, Variant};
use engine::Engine;
use error::ConfigError;
use history::History;
use render::LifeTrail;
use rules::{Life, SumRule, ThreeSpecies};

/// One of the three automata, chosen at runtime.
#[derive(Clone, Debug)]
pub enum Simulation {
    Species(Engine<ThreeSpecies>),
    Life(Engine<Life>),
    Sum(Engine<SumRule>),
}

macro_rules! each {
    ($sim:expr, $engine:ident => $body:expr) => {
        match $sim {
            Simulation::Species($engine) => $body,
            Simulation::Life($engine) => $body,
            Simulation::Sum($engine) => $body,
        }
    };
}

/// A pointer stroke in grid coordinates. Blends a radius for the species and
/// summation variants; sets (or with `erase`, clears) one cell for Life.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Stroke {
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub erase: bool,
}

impl Simulation {
    pub fn build(variant: Variant, params: &Params, seed: u64) -> Result<Self, ConfigError> {
        let grid = params.grid(variant);
        Ok(match variant {
            Variant::Species => Simulation::Species(Engine::new(
                ThreeSpecies::new(params.alpha, params.beta, params.gamma),
                &grid,
                seed,
            )?),
            Variant::Life => Simulation::Life(Engine::new(Life::new(params.density), &grid, seed)?),
            Variant::Sum => Simulation::Sum(Engine::new(SumRule::new(&params.rule)?, &grid, seed)?),
        })
    }

    pub fn variant(&self) -> Variant {
        match self {
            Simulation::Species(_) => Variant::Species,
            Simulation::Life(_) => Variant::Life,
            Simulation::Sum(_) => Variant::Sum,
        }
    }

    pub fn size(&self) -> usize {
        each!(self, e => e.size())
    }

    pub fn generation(&self) -> u64 {
        each!(self, e => e.generation())
    }

    pub fn history(&self) -> &History {
        each!(self, e => e.history())
    }

    pub fn live_count(&self) -> usize {
        each!(self, e => e.live_count())
    }

    pub fn step(&mut self) {
        each!(self, e => e.step())
    }

    pub fn reseed(&mut self) {
        each!(self, e => e.reseed())
    }

    /// Hot-swap settings between steps. A new side length reallocates and
    /// reseeds. A rejected size or rule text leaves every setting unchanged.
    pub fn apply(&mut self, params: &Params) -> Result<(), ConfigError> {
        let grid = params.grid(self.variant());
        if grid.size == 0 {
            return Err(ConfigError::InvalidSize(grid.size));
        }
        match self {
            Simulation::Species(e) => e.rule_mut().set_coefficients(params.alpha, params.beta, params.gamma),
            Simulation::Life(e) => e.rule_mut().set_density(params.density),
            Simulation::Sum(e) => e.rule_mut().set_rule(&params.rule)?,
        }
        each!(self, e => {
            if grid.size != e.size() {
                e.resize(grid.size)?;
            }
            e.set_mask(grid.mask);
            e.set_boundary(grid.boundary);
        });
        Ok(())
    }

    pub fn stroke(&mut self, stroke: Stroke, params: &Params) {
        match self {
            Simulation::Species(e) => e.perturb(stroke.x, stroke.y, params.species_radius),
            Simulation::Sum(e) => e.perturb(stroke.x, stroke.y, params.sum_radius),
            Simulation::Life(e) => e.set(stroke.x, stroke.y, u8::from(!stroke.erase)),
        }
    }

    /// Current generation as RGBA8, row-major. A Life trail, when given,
    /// replaces the plain alive/dead rendering.
    pub fn render(&self, params: &Params, trail: Option<&LifeTrail>) -> Vec<u8> {
        match self {
            Simulation::Species(e) => render::render_species(e.grid(), params.species_palette),
            Simulation::Life(e) => match trail {
                Some(trail) => trail.render(),
                None => render::render_life(e.grid()),
            },
            Simulation::Sum(e) => render::render_states(e.grid(), params.sum_palette),
        }
    }

    /// A fade trail for Life runs with `life_trail` set.
    pub fn trail(&self, params: &Params) -> Option<LifeTrail> {
        match self {
            Simulation::Life(e) if params.life_trail => Some(LifeTrail::new(e.grid(), params.trail_rate)),
            _ => None,
        }
    }

    /// Fold the current Life generation into `trail`.
    pub fn update_trail(&self, trail: &mut Option<LifeTrail>) {
        if let (Simulation::Life(e), Some(trail)) = (self, trail) {
            trail.update(e.grid());
        }
    }

    /// Rule table listing for the summation variant.
    pub fn rule_rows(&self) -> Option<String> {
        match self {
            Simulation::Sum(e) => Some(e.rule().table().rows(12)),
            _ => None,
        }
    }
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Build a simulation, apply strokes, advance `steps` generations and
/// render the result.
pub fn run(
    variant: Variant,
    seed: u64,
    params: &Params,
    strokes: &[Stroke],
    steps: usize,
) -> Result<(Simulation, Vec<u8>, Vec<Timing>), ConfigError> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    let t = Instant::now();
    let mut sim = Simulation::build(variant, params, seed)?;
    for &stroke in strokes {
        sim.stroke(stroke, params);
    }
    let mut trail = sim.trail(params);
    timings.push(Timing {
        name: "seed",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let t = Instant::now();
    for _ in 0..steps {
        sim.step();
        sim.update_trail(&mut trail);
    }
    timings.push(Timing {
        name: "step",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let t = Instant::now();
    let rgba = sim.render(params, trail.as_ref());
    timings.push(Timing {
        name: "render",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    timings.push(Timing {
        name: "TOTAL",
        ms: total_start.elapsed().as_secs_f64() * 1000.0,
    });

    Ok((sim, rgba, timings))
}
