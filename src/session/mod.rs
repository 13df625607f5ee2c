pub mod panel;
pub mod sequencer;
pub mod types;

pub use panel::TranslationPanel;
pub use types::{ClientMessage, ServerMessage};
