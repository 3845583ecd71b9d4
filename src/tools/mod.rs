mod interaction;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::element::Fill;

pub use interaction::{DragState, InteractionController, PendingCrop};

/// Pointer tool. Only `Crop` changes what a drag over an image does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    #[default]
    Select,
    Crop,
}

impl ToolMode {
    pub fn label(&self) -> &'static str {
        match self {
            ToolMode::Select => "Select",
            ToolMode::Crop => "Crop",
        }
    }
}

/// Colors applied to newly created elements. Persisted with the app's UI
/// preferences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub shape_color: Color32,
    pub shape_fill: Fill,
    pub text_color: Color32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            shape_color: Color32::BLACK,
            shape_fill: Fill::Transparent,
            text_color: Color32::BLACK,
        }
    }
}

impl ToolSettings {
    /// Color shown in the fill picker. Transparent edits as white.
    pub fn fill_picker_color(&self) -> Color32 {
        self.shape_fill.color().unwrap_or(Color32::WHITE)
    }
}
