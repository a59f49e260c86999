/// Session configuration constants.
/// 
/// Turn deadline and close codes used by the relay of timed (quickplay) games.
pub const MOVE_TIMEOUT_SECS: u64 = 60; // Per-turn deadline, reset after every relayed move.

/// Close code sent to the player who let their turn deadline expire.
pub const TIMED_OUT_CLOSE_CODE: u16 = 4000;

/// Close code sent to the opponent of the player who timed out.
pub const OPPONENT_TIMED_OUT_CLOSE_CODE: u16 = 4001;

/// Data frames a queued or playing socket may buffer ahead of its session.
/// A client that gets further ahead is disconnected.
pub const INBOUND_FRAME_LIMIT: usize = 32;
