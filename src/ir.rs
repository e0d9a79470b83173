use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type Point = (f32, f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Power,
    Analog,
    Digital,
    Data,
    Control,
}

impl SignalType {
    pub const ALL: [SignalType; 5] = [
        SignalType::Power,
        SignalType::Analog,
        SignalType::Digital,
        SignalType::Data,
        SignalType::Control,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Analog => "analog",
            Self::Digital => "digital",
            Self::Data => "data",
            Self::Control => "control",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_hardware: Option<String>,
}

impl Block {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            host_hardware: None,
        }
    }

    pub fn with_inputs(mut self, ports: &[&str]) -> Self {
        self.inputs = ports.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_outputs(mut self, ports: &[&str]) -> Self {
        self.outputs = ports.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn on_host(mut self, host: &str) -> Self {
        self.host_hardware = Some(host.to_string());
        self
    }

    /// Host name when the block belongs to a hardware group.
    /// Blank host strings count as "no host".
    pub fn host(&self) -> Option<&str> {
        self.host_hardware
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from_block: String,
    pub to_block: String,
    pub signal_name: String,
    pub signal_type: SignalType,
}

impl Connection {
    pub fn new(from: &str, to: &str, signal: &str, signal_type: SignalType) -> Self {
        Self {
            from_block: from.to_string(),
            to_block: to.to_string(),
            signal_name: signal.to_string(),
            signal_type,
        }
    }
}

/// Stable identity of a connection, independent of its position in the
/// connection list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Design {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a design document. JSON5 is accepted so hand-written fixtures
    /// may carry comments and trailing commas.
    pub fn from_json(input: &str) -> anyhow::Result<Self> {
        let design = json5::from_str(input)?;
        Ok(design)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    /// One id per connection, in input order, shaped
    /// `{from}->{to}:{signal}#{n}`. Duplicated (from, to, signal) triples are
    /// told apart by the occurrence ordinal `n`. Separator characters inside
    /// the parts are backslash-escaped so distinct triples never share an id.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        let mut seen: HashMap<(&str, &str, &str), usize> = HashMap::new();
        self.connections
            .iter()
            .map(|conn| {
                let key = (
                    conn.from_block.as_str(),
                    conn.to_block.as_str(),
                    conn.signal_name.as_str(),
                );
                let ordinal = seen.entry(key).or_insert(0);
                let id = ConnectionId(format!(
                    "{}->{}:{}#{}",
                    escape_id_part(&conn.from_block),
                    escape_id_part(&conn.to_block),
                    escape_id_part(&conn.signal_name),
                    ordinal
                ));
                *ordinal += 1;
                id
            })
            .collect()
    }
}

fn escape_id_part(part: &str) -> Cow<'_, str> {
    if !part.contains(['\\', '>', ':', '#']) {
        return Cow::Borrowed(part);
    }
    let mut escaped = String::with_capacity(part.len() + 4);
    for ch in part.chars() {
        if matches!(ch, '\\' | '>' | ':' | '#') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    Cow::Owned(escaped)
}
