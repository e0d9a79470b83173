use serde::{Deserialize, Serialize};

use crate::ir::SignalType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub block_fill: String,
    pub block_border: String,
    pub block_text: String,
    pub group_fill: String,
    pub group_border: String,
    pub group_text: String,
    pub power: String,
    pub analog: String,
    pub digital: String,
    pub data: String,
    pub control: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            block_fill: "#ECECFF".to_string(),
            block_border: "#9370DB".to_string(),
            block_text: "#333333".to_string(),
            group_fill: "#FFFFDE".to_string(),
            group_border: "#AAAA33".to_string(),
            group_text: "#333333".to_string(),
            power: "#D64545".to_string(),
            analog: "#E08A1E".to_string(),
            digital: "#2F6FD6".to_string(),
            data: "#2E9E5B".to_string(),
            control: "#8A4FC7".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            block_fill: "#F8FAFF".to_string(),
            block_border: "#C7D2E5".to_string(),
            block_text: "#1C2430".to_string(),
            group_fill: "#F7FAFF".to_string(),
            group_border: "#D7E0F0".to_string(),
            group_text: "#4A5568".to_string(),
            power: "#E5484D".to_string(),
            analog: "#F76B15".to_string(),
            digital: "#0090FF".to_string(),
            data: "#30A46C".to_string(),
            control: "#8E4EC6".to_string(),
        }
    }

    /// Stroke colour for connections carrying `signal`.
    pub fn stroke(&self, signal: SignalType) -> &str {
        match signal {
            SignalType::Power => &self.power,
            SignalType::Analog => &self.analog,
            SignalType::Digital => &self.digital,
            SignalType::Data => &self.data,
            SignalType::Control => &self.control,
        }
    }
}
