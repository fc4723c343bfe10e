//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest grid, in cells, a model may allocate
pub const MAX_CELLS: u64 = 1 << 22;

/// Largest population a model may create
pub const MAX_AGENTS: usize = 1 << 20;

/// Order in which a scheduler activates its agents each round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationOrder {
    /// Registration order, reshuffled with the model RNG every round
    #[default]
    Shuffled,
    /// Registration order, unchanged between rounds
    Registration,
}

/// Model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of walkers created at initialization
    pub num_agents: usize,
    /// Width of the grid
    pub width: i32,
    /// Height of the grid
    pub height: i32,
    /// Wrap the grid edges
    pub torus: bool,
    /// Random seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Activation order policy
    pub activation: ActivationOrder,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            num_agents: 10,
            width: 10,
            height: 10,
            torus: true,
            seed: None,
            activation: ActivationOrder::Shuffled,
        }
    }
}

impl ModelConfig {
    pub fn new(num_agents: usize, width: i32, height: i32) -> Self {
        Self {
            num_agents,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_agents == 0 {
            return Err(Error::Validation("num_agents must be positive".to_string()));
        }
        if self.num_agents > MAX_AGENTS {
            return Err(Error::Validation(format!(
                "num_agents must be at most {}, got {}",
                MAX_AGENTS, self.num_agents
            )));
        }
        validate_dimensions(self.width, self.height)
    }

    /// Update one named parameter from a JSON value
    ///
    /// Accepts `num_agents`, `width`, `height` and `seed` (`null` clears the
    /// seed). The updated configuration is validated before it is kept.
    pub fn set_param(&mut self, name: &str, value: &serde_json::Value) -> Result<()> {
        let mut updated = self.clone();

        match name {
            "num_agents" => updated.num_agents = positive_int(name, value)? as usize,
            "width" => updated.width = dimension(name, value)?,
            "height" => updated.height = dimension(name, value)?,
            "seed" => {
                updated.seed = if value.is_null() {
                    None
                } else {
                    Some(value.as_u64().ok_or_else(|| {
                        Error::Validation(format!("seed must be an unsigned integer, got {}", value))
                    })?)
                };
            }
            other => return Err(Error::UnknownParameter(other.to_string())),
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Check that a `width` x `height` grid is non-empty and at most `MAX_CELLS`
pub fn validate_dimensions(width: i32, height: i32) -> Result<()> {
    if width <= 0 || height <= 0 {
        return Err(Error::Validation(format!(
            "grid dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    let cells = width as u64 * height as u64;
    if cells > MAX_CELLS {
        return Err(Error::Validation(format!(
            "grid of {}x{} has {} cells, at most {} allowed",
            width, height, cells, MAX_CELLS
        )));
    }
    Ok(())
}

fn positive_int(name: &str, value: &serde_json::Value) -> Result<u64> {
    match value.as_u64() {
        Some(v) if v > 0 => Ok(v),
        _ => Err(Error::Validation(format!(
            "{} must be a positive integer, got {}",
            name, value
        ))),
    }
}

fn dimension(name: &str, value: &serde_json::Value) -> Result<i32> {
    let v = positive_int(name, value)?;
    i32::try_from(v).map_err(|_| Error::Validation(format!("{} is too large: {}", name, v)))
}

/// Canvas element dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Grid columns drawn on the canvas
    pub grid_width: i32,
    /// Grid rows drawn on the canvas
    pub grid_height: i32,
    /// Canvas width in pixels
    pub canvas_width: u32,
    /// Canvas height in pixels
    pub canvas_height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 10,
            canvas_width: 500,
            canvas_height: 500,
        }
    }
}

/// Visualization server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Model name shown on the page
    pub name: String,
    /// Default playback rate of the page's run control
    pub fps: u32,
    /// OpenTelemetry endpoint
    pub otel_endpoint: Option<String>,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    /// Initial model parameters
    pub model: ModelConfig,
    /// Canvas element
    pub canvas: CanvasConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8521,
            name: "Random Walkers".to_string(),
            fps: 3,
            otel_endpoint: None,
            json_logs: false,
            model: ModelConfig::default(),
            canvas: CanvasConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = serde_json::from_str(&contents)?;
        config.model.validate()?;
        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
