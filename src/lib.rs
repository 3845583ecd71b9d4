#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod components;
pub mod config;
pub mod element;
pub mod error;
pub mod geometry;
pub mod input;
pub mod panels;
pub mod raster;
pub mod renderer;
pub mod search;
pub mod state;
pub mod tools;
pub mod util;

pub use app::DesignBoardApp;
pub use command::Command;
pub use config::BoardConfig;
pub use element::{DesignElement, ElementId, ElementType, ImageSource};
pub use error::{BoardError, BoardResult};
pub use state::EditorModel;
