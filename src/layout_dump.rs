use crate::layout::{Diagram, RouteKind};
use crate::theme::Theme;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<BlockDump>,
    pub groups: Vec<GroupDump>,
    pub connections: Vec<ConnectionDump>,
    pub warnings: Vec<String>,
    /// Signal type -> stroke colour.
    pub palette: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct BlockDump {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub column: usize,
    pub host_hardware: Option<String>,
    pub pinned: bool,
    pub inputs: Vec<PortDump>,
    pub outputs: Vec<PortDump>,
}

#[derive(Debug, Serialize)]
pub struct PortDump {
    pub name: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct GroupDump {
    pub name: String,
    pub blocks: Vec<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct ConnectionDump {
    pub id: String,
    pub from: String,
    pub to: String,
    pub signal_name: String,
    pub signal_type: String,
    pub route: &'static str,
    pub stroke: String,
    pub points: Vec<[f32; 2]>,
    pub label: [f32; 2],
}

fn route_name(kind: RouteKind) -> &'static str {
    match kind {
        RouteKind::SameColumn => "same-column",
        RouteKind::Forward => "forward",
        RouteKind::Backward => "backward",
        RouteKind::SelfLoop => "self-loop",
    }
}

impl LayoutDump {
    pub fn from_diagram(diagram: &Diagram, theme: &Theme) -> Self {
        let blocks = diagram
            .blocks
            .values()
            .map(|block| BlockDump {
                id: block.id.clone(),
                name: block.name.clone(),
                kind: block.kind.clone(),
                x: block.x,
                y: block.y,
                width: block.width,
                height: block.height,
                column: block.column,
                host_hardware: block.host_hardware.clone(),
                pinned: block.pinned,
                inputs: block
                    .inputs
                    .iter()
                    .map(|port| PortDump {
                        name: port.name.clone(),
                        x: port.x,
                        y: port.y,
                    })
                    .collect(),
                outputs: block
                    .outputs
                    .iter()
                    .map(|port| PortDump {
                        name: port.name.clone(),
                        x: port.x,
                        y: port.y,
                    })
                    .collect(),
            })
            .collect();

        let groups = diagram
            .groups
            .iter()
            .map(|group| GroupDump {
                name: group.name.clone(),
                blocks: group.blocks.clone(),
                x: group.x,
                y: group.y,
                width: group.width,
                height: group.height,
            })
            .collect();

        let connections = diagram
            .paths
            .iter()
            .map(|path| ConnectionDump {
                id: path.id.to_string(),
                from: path.from.clone(),
                to: path.to.clone(),
                signal_name: path.signal_name.clone(),
                signal_type: path.signal_type.as_str().to_string(),
                route: route_name(path.kind),
                stroke: theme.stroke(path.signal_type).to_string(),
                points: path.points.iter().map(|(x, y)| [*x, *y]).collect(),
                label: [path.label_anchor.0, path.label_anchor.1],
            })
            .collect();

        let palette = crate::ir::SignalType::ALL
            .iter()
            .map(|signal| (signal.as_str().to_string(), theme.stroke(*signal).to_string()))
            .collect();

        LayoutDump {
            width: diagram.width,
            height: diagram.height,
            blocks,
            groups,
            connections,
            warnings: diagram.warnings.iter().map(ToString::to_string).collect(),
            palette,
        }
    }
}

pub fn write_layout_dump<W: Write>(
    writer: W,
    diagram: &Diagram,
    theme: &Theme,
    pretty: bool,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_diagram(diagram, theme);
    if pretty {
        serde_json::to_writer_pretty(writer, &dump)?;
    } else {
        serde_json::to_writer(writer, &dump)?;
    }
    Ok(())
}
