/// Main configuration module.
/// 
/// Re-exports submodules for server, matchmaking and session configuration.
pub mod server;
pub mod matchmaking;
pub mod session;
