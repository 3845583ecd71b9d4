mod history;
mod model;

pub use history::History;
pub use model::EditorModel;
