/// Matchmaking module: handles connection intake, queueing, and pairing.

pub mod server;
pub mod session;
pub mod queue;
pub mod types;
