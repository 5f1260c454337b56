// libnpscard/src/transport/mod.rs

//! Card channels: the reader abstraction and two in-memory implementations.

pub mod mock;
pub mod sim;
pub mod traits;

pub use mock::MockChannel;
pub use sim::SimulatedCard;
pub use traits::CardChannel;
