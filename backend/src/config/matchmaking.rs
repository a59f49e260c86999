/// Matchmaking configuration constants.
/// 
/// This module defines the queue selectors clients send as their first message
/// and the text of the match announcement.
pub const QUICKPLAY_SELECTOR: &str = "quickplay"; // Timed queue, 60 second turns.

/// Selector for the untimed queue.
pub const NORMAL_SELECTOR: &str = "normal";

/// Prefix of the announcement sent to both players when a match is found.
/// The assigned color ("White" or "Black") is appended.
pub const MATCH_ANNOUNCEMENT_PREFIX: &str = "Match found! Your color is: ";
