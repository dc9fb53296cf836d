pub mod arena;
mod debug;
pub mod futex;
pub mod queue;

pub use arena::Arena;
pub use queue::MessageQueue;
