mod fake_supervisor;
mod scripted_client;

pub use fake_supervisor::*;
pub use scripted_client::*;
