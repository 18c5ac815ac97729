pub mod area;
pub mod graph;
pub mod markers;
pub mod prefabs;
pub mod state;

pub use area::*;
pub use graph::*;
pub use markers::*;
pub use state::*;
