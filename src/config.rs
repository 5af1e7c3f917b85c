use serde::{Deserialize, Serialize};

pub const DEFAULT_RULE: &str = "1350851716507335422";
pub const HISTORY_CAPACITY: usize = 360;
/// Largest accepted history window.
pub const MAX_HISTORY: usize = 100_000;

/// Which automaton family a simulation runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Three-species reaction field.
    #[default]
    Species,
    /// Conway's Game of Life.
    Life,
    /// 20-state summation automaton driven by a base-20 rule table.
    Sum,
}

impl Variant {
    pub fn default_size(self) -> usize {
        match self {
            Variant::Species => 180,
            Variant::Life => 180,
            Variant::Sum => 220,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "species" | "bz" | "reaction" => Some(Variant::Species),
            "life" | "gol" => Some(Variant::Life),
            "sum" | "wolfram" => Some(Variant::Sum),
            _ => None,
        }
    }
}

/// Edge handling for neighbor lookups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Toroidal: coordinates taken modulo N.
    #[default]
    Wrap,
    /// Missing neighbors contribute nothing.
    Open,
    /// Missing neighbors contribute the center cell's own value.
    Fill,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    /// Every cell is simulated.
    #[default]
    Full,
    /// Only the inscribed disc is simulated.
    Round,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesPalette {
    #[default]
    Soft,
    /// Plasma-shaded height field with edge highlights.
    Relief,
    Triad,
    Turbo,
    Hue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SumPalette {
    #[default]
    Ember,
    Marine,
    Ice,
    Spectrum,
    Cyclic,
}

/// Grid-level settings shared by every engine.
#[derive(Clone, Debug, PartialEq)]
pub struct GridParams {
    pub size: usize,
    pub boundary: BoundaryMode,
    pub mask: MaskMode,
    pub history_capacity: usize,
}

impl GridParams {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            boundary: BoundaryMode::Wrap,
            mask: MaskMode::Full,
            history_capacity: HISTORY_CAPACITY,
        }
    }
}

/// All tunable parameters, exposed as controls by the hosts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // Grid
    /// Side length; `None` picks the variant's default.
    pub size: Option<usize>,
    pub boundary: BoundaryMode,
    pub mask: MaskMode,
    pub history_capacity: usize,

    // Cadence
    pub speed_ms: u64,

    // Three-species reaction
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub species_palette: SpeciesPalette,
    pub species_radius: u32,

    // Life
    pub density: f64,
    /// Fade dead cells out over several frames instead of blanking them.
    pub life_trail: bool,
    /// Alpha lost per generation by a dead cell's trail.
    pub trail_rate: f32,

    // Summation rule
    pub rule: String,
    pub sum_palette: SumPalette,
    pub sum_radius: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            size: None,
            boundary: BoundaryMode::Wrap,
            mask: MaskMode::Full,
            history_capacity: HISTORY_CAPACITY,
            speed_ms: 70,
            alpha: 1.0,
            beta: 1.0,
            gamma: 1.0,
            species_palette: SpeciesPalette::Soft,
            species_radius: 6,
            density: 0.18,
            life_trail: false,
            trail_rate: 0.1,
            rule: DEFAULT_RULE.to_string(),
            sum_palette: SumPalette::Ember,
            sum_radius: 7,
        }
    }
}

impl Params {
    pub fn grid(&self, variant: Variant) -> GridParams {
        GridParams {
            size: self.size.unwrap_or_else(|| variant.default_size()),
            boundary: self.boundary,
            mask: self.mask,
            history_capacity: self.history_capacity,
        }
    }
}
