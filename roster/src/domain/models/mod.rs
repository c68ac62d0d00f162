mod identity;
mod ids;
mod programmer;
mod standby;
mod task;
pub mod wire;

pub use identity::*;
pub use ids::*;
pub use programmer::*;
pub use standby::*;
pub use task::*;
