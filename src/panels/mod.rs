mod central_panel;
mod modals;
mod search_panel;
mod tools_panel;

pub use central_panel::central_panel;
pub use modals::{crop_modal, text_modal};
pub use search_panel::search_panel;
pub use tools_panel::tools_panel;
