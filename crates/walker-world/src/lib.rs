//! World simulation engine.
//!
//! This module implements the 2D grid world where random walkers live: the
//! grid itself, activation scheduling, metric collection and the canvas
//! element used by the visualization server.

pub mod agent;
pub mod canvas;
pub mod datacollector;
pub mod grid;
pub mod model;
pub mod schedule;

pub use agent::{Agent, RandomWalker};
pub use canvas::{agent_portrayal, CanvasGrid, GridFrame, Portrayal, Shape};
pub use datacollector::{DataCollector, MetricValue, MetricsTable};
pub use grid::MultiGrid;
pub use model::{Model, AGENT_COUNT};
pub use schedule::Scheduler;
