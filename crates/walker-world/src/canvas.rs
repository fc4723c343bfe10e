//! Canvas grid element: turns a model into drawable portrayals.

use crate::agent::Agent;
use crate::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use walker_core::{CanvasConfig, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Rect,
}

/// How a single agent is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portrayal {
    #[serde(rename = "Shape")]
    pub shape: Shape,
    #[serde(rename = "Color")]
    pub color: String,
    #[serde(rename = "Filled")]
    pub filled: bool,
    #[serde(rename = "Layer")]
    pub layer: u32,
    /// Radius, in cells, for circles
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub r: Option<f64>,
    /// Width and height, in cells, for rects
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub y: Option<i32>,
}

impl Portrayal {
    pub fn circle(color: impl Into<String>, radius: f64) -> Self {
        Self {
            shape: Shape::Circle,
            color: color.into(),
            filled: true,
            layer: 0,
            r: Some(radius),
            w: None,
            h: None,
            x: None,
            y: None,
        }
    }

    pub fn rect(color: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            shape: Shape::Rect,
            color: color.into(),
            filled: true,
            layer: 0,
            r: None,
            w: Some(width),
            h: Some(height),
            x: None,
            y: None,
        }
    }
}

/// Maps an agent to its portrayal; `None` hides the agent
pub type PortrayalFn = fn(&dyn Agent) -> Option<Portrayal>;

/// Every agent is a filled blue circle of radius 0.5
pub fn agent_portrayal(_agent: &dyn Agent) -> Option<Portrayal> {
    Some(Portrayal::circle("blue", 0.5))
}

/// Portrayals grouped by layer
pub type GridFrame = BTreeMap<u32, Vec<Portrayal>>;

#[derive(Clone)]
pub struct CanvasGrid {
    portrayal: PortrayalFn,
    pub grid_width: i32,
    pub grid_height: i32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl fmt::Debug for CanvasGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasGrid")
            .field("grid_width", &self.grid_width)
            .field("grid_height", &self.grid_height)
            .field("canvas_width", &self.canvas_width)
            .field("canvas_height", &self.canvas_height)
            .finish()
    }
}

impl CanvasGrid {
    pub fn new(
        portrayal: PortrayalFn,
        grid_width: i32,
        grid_height: i32,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Self {
        Self {
            portrayal,
            grid_width,
            grid_height,
            canvas_width,
            canvas_height,
        }
    }

    pub fn from_config(portrayal: PortrayalFn, config: &CanvasConfig) -> Self {
        Self::new(
            portrayal,
            config.grid_width,
            config.grid_height,
            config.canvas_width,
            config.canvas_height,
        )
    }

    /// Portray every agent on the visible cells, column by column
    pub fn render(&self, model: &Model) -> GridFrame {
        let grid = model.grid();
        let mut frame = GridFrame::new();

        for x in 0..self.grid_width {
            for y in 0..self.grid_height {
                let pos = Position::new(x, y);
                if grid.out_of_bounds(pos) {
                    continue;
                }

                for id in grid.cell_contents(pos) {
                    let Some(agent) = model.agent(*id) else {
                        continue;
                    };
                    if let Some(mut portrayal) = (self.portrayal)(agent) {
                        portrayal.x = Some(x);
                        portrayal.y = Some(y);
                        frame.entry(portrayal.layer).or_default().push(portrayal);
                    }
                }
            }
        }

        frame
    }
}
