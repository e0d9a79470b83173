use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub block_width: f32,
    pub header_height: f32,
    pub port_row_height: f32,
    pub block_padding: f32,
    /// Vertical gap between blocks stacked in one sub-column.
    pub block_gap: f32,
    /// Horizontal gap between sub-columns inside a group.
    pub column_gap: f32,
    pub group_padding: f32,
    /// Extra top margin reserved for a group's label.
    pub group_label_height: f32,
    pub group_gap_x: f32,
    pub group_gap_y: f32,
    pub canvas_margin: f32,
    pub min_canvas_width: f32,
    pub min_canvas_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            block_width: 180.0,
            header_height: 28.0,
            port_row_height: 18.0,
            block_padding: 12.0,
            block_gap: 24.0,
            column_gap: 90.0,
            group_padding: 20.0,
            group_label_height: 26.0,
            group_gap_x: 60.0,
            group_gap_y: 40.0,
            canvas_margin: 40.0,
            min_canvas_width: 800.0,
            min_canvas_height: 600.0,
        }
    }
}

impl LayoutConfig {
    pub fn block_height(&self, inputs: usize, outputs: usize) -> f32 {
        let rows = inputs.max(outputs).max(1) as f32;
        self.header_height + rows * self.port_row_height + self.block_padding
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Length of the horizontal stub leaving an output or entering an input.
    pub exit_distance: f32,
    /// Clearance a vertical channel must keep from every block.
    pub channel_margin: f32,
    pub channel_step: f32,
    /// Number of left/right probe pairs tried before falling back.
    pub channel_probes: usize,
    /// Offset between parallel connections of one block pair.
    pub spread: f32,
    /// Distance of the backward-loop run from the outermost blocks.
    pub loop_margin: f32,
    /// Waypoint splits stay this far inside the segment they split.
    pub split_inset: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            exit_distance: 20.0,
            channel_margin: 10.0,
            channel_step: 12.0,
            channel_probes: 8,
            spread: 15.0,
            loop_margin: 30.0,
            split_inset: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Pointer travel, in screen pixels, that turns a click into a drag.
    pub drag_threshold: f32,
    pub node_hit_radius: f32,
    pub waypoint_remove_radius: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    pub wheel_zoom_sensitivity: f32,
    pub debounce_ms: u64,
    pub save_indicator_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
            node_hit_radius: 8.0,
            waypoint_remove_radius: 10.0,
            min_zoom: 0.2,
            max_zoom: 5.0,
            zoom_step: 1.2,
            wheel_zoom_sensitivity: 0.0015,
            debounce_ms: 800,
            save_indicator_ms: 2000,
        }
    }
}

impl InteractionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn save_indicator(&self) -> Duration {
        Duration::from_millis(self.save_indicator_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub layout: LayoutConfig,
    pub routing: RoutingConfig,
    pub interaction: InteractionConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
    routing: Option<RoutingConfigFile>,
    interaction: Option<InteractionConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    block_width: Option<f32>,
    header_height: Option<f32>,
    port_row_height: Option<f32>,
    block_padding: Option<f32>,
    block_gap: Option<f32>,
    column_gap: Option<f32>,
    group_padding: Option<f32>,
    group_label_height: Option<f32>,
    group_gap_x: Option<f32>,
    group_gap_y: Option<f32>,
    canvas_margin: Option<f32>,
    min_canvas_width: Option<f32>,
    min_canvas_height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    exit_distance: Option<f32>,
    channel_margin: Option<f32>,
    channel_step: Option<f32>,
    channel_probes: Option<usize>,
    spread: Option<f32>,
    loop_margin: Option<f32>,
    split_inset: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractionConfigFile {
    drag_threshold: Option<f32>,
    node_hit_radius: Option<f32>,
    waypoint_remove_radius: Option<f32>,
    min_zoom: Option<f32>,
    max_zoom: Option<f32>,
    zoom_step: Option<f32>,
    wheel_zoom_sensitivity: Option<f32>,
    debounce_ms: Option<u64>,
    save_indicator_ms: Option<u64>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if let Some(file) = parsed.layout {
        let layout = &mut config.layout;
        if let Some(v) = file.block_width {
            layout.block_width = v;
        }
        if let Some(v) = file.header_height {
            layout.header_height = v;
        }
        if let Some(v) = file.port_row_height {
            layout.port_row_height = v;
        }
        if let Some(v) = file.block_padding {
            layout.block_padding = v;
        }
        if let Some(v) = file.block_gap {
            layout.block_gap = v;
        }
        if let Some(v) = file.column_gap {
            layout.column_gap = v;
        }
        if let Some(v) = file.group_padding {
            layout.group_padding = v;
        }
        if let Some(v) = file.group_label_height {
            layout.group_label_height = v;
        }
        if let Some(v) = file.group_gap_x {
            layout.group_gap_x = v;
        }
        if let Some(v) = file.group_gap_y {
            layout.group_gap_y = v;
        }
        if let Some(v) = file.canvas_margin {
            layout.canvas_margin = v;
        }
        if let Some(v) = file.min_canvas_width {
            layout.min_canvas_width = v;
        }
        if let Some(v) = file.min_canvas_height {
            layout.min_canvas_height = v;
        }
    }

    if let Some(file) = parsed.routing {
        let routing = &mut config.routing;
        if let Some(v) = file.exit_distance {
            routing.exit_distance = v;
        }
        if let Some(v) = file.channel_margin {
            routing.channel_margin = v;
        }
        if let Some(v) = file.channel_step {
            routing.channel_step = v.max(1.0);
        }
        if let Some(v) = file.channel_probes {
            routing.channel_probes = v;
        }
        if let Some(v) = file.spread {
            routing.spread = v;
        }
        if let Some(v) = file.loop_margin {
            routing.loop_margin = v;
        }
        if let Some(v) = file.split_inset {
            routing.split_inset = v.max(0.0);
        }
    }

    if let Some(file) = parsed.interaction {
        let interaction = &mut config.interaction;
        if let Some(v) = file.drag_threshold {
            interaction.drag_threshold = v.max(0.0);
        }
        if let Some(v) = file.node_hit_radius {
            interaction.node_hit_radius = v;
        }
        if let Some(v) = file.waypoint_remove_radius {
            interaction.waypoint_remove_radius = v;
        }
        if let Some(v) = file.min_zoom {
            interaction.min_zoom = v;
        }
        if let Some(v) = file.max_zoom {
            interaction.max_zoom = v;
        }
        if let Some(v) = file.zoom_step {
            interaction.zoom_step = v;
        }
        if let Some(v) = file.wheel_zoom_sensitivity {
            interaction.wheel_zoom_sensitivity = v;
        }
        if let Some(v) = file.debounce_ms {
            interaction.debounce_ms = v;
        }
        if let Some(v) = file.save_indicator_ms {
            interaction.save_indicator_ms = v;
        }
        if interaction.min_zoom > interaction.max_zoom {
            std::mem::swap(&mut interaction.min_zoom, &mut interaction.max_zoom);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_height_counts_the_taller_port_side() {
        let config = LayoutConfig::default();
        assert_eq!(config.block_height(0, 0), 28.0 + 18.0 + 12.0);
        assert_eq!(config.block_height(3, 1), 28.0 + 3.0 * 18.0 + 12.0);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let config = parse_config(
            r#"{ "layout": { "blockWidth": 200 }, "interaction": { "debounceMs": 50 } }"#,
        )
        .unwrap();
        assert_eq!(config.layout.block_width, 200.0);
        assert_eq!(config.layout.header_height, 28.0);
        assert_eq!(config.interaction.debounce(), Duration::from_millis(50));
        assert_eq!(config.routing.spread, 15.0);
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.interaction.max_zoom, 5.0);
    }
}
