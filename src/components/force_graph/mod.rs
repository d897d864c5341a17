//! Canvas graph view: layout state, drawing and the component tying them
//! to the page.

mod component;
mod render;
mod state;

pub use component::ForceGraphCanvas;
pub(crate) use state::ForceGraphState;
