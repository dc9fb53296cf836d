mod builder;
pub mod dispatcher;
pub mod relay;
pub mod runner;
mod service;
pub mod stats;

pub use builder::ServiceBuilder;
pub use dispatcher::{dispatch, Dispatched, PayloadBoundary};
pub use relay::Relay;
pub use runner::{spawn_relay, spawn_worker, RunnerHandle};
pub use service::DataService;
pub use stats::{Stats, StatsSnapshot};
