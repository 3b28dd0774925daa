mod component;
mod render;
mod state;

pub use component::GraphCanvas;
pub use render::export_png;
pub use state::{GraphSession, Legend, ViewCommand};
