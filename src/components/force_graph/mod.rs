mod component;
pub mod highlight;
pub mod interaction;
pub mod layout;
mod render;
pub mod scale;
pub mod state;
mod types;
pub mod viewport;

pub use component::{ForceGraphCanvas, GraphHandle};
pub use types::{GraphData, GraphLink, GraphNode};
