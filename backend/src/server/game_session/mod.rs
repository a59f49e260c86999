/// Game session module: owns matched pairs and relays their moves.

pub mod channel;
pub mod launch;
pub mod messages;
pub mod relay;

pub use relay::SessionConfig;
