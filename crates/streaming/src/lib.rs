pub mod cache;
pub mod candidates;
pub mod request;
pub mod residency;
pub mod transition;

pub use cache::*;
pub use candidates::*;
pub use request::*;
pub use residency::*;
pub use transition::*;
