mod commands;

pub use commands::{Command, LayerDirection, move_layer, resize, rotate};
