pub mod heartbeat;
pub mod octopus;
