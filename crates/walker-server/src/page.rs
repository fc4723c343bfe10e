//! The visualization page served at `/`.

use walker_core::ServerConfig;
use walker_world::CanvasGrid;

const TEMPLATE: &str = include_str!("../static/index.html");

/// Fill the page template with the model name, playback rate and canvas size
pub fn render_page(config: &ServerConfig, canvas: &CanvasGrid) -> String {
    TEMPLATE
        .replace("{{NAME}}", &escape_html(&config.name))
        .replace("{{FPS}}", &config.fps.max(1).to_string())
        .replace("{{GRID_WIDTH}}", &canvas.grid_width.to_string())
        .replace("{{GRID_HEIGHT}}", &canvas.grid_height.to_string())
        .replace("{{CANVAS_WIDTH}}", &canvas.canvas_width.to_string())
        .replace("{{CANVAS_HEIGHT}}", &canvas.canvas_height.to_string())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
