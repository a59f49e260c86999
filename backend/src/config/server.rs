/// HTTP server configuration constants.
/// 
/// Listen address and transport-level timeouts. The in-session move deadline
/// lives in `config::session`.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Environment variable overriding `DEFAULT_BIND_ADDR`.
pub const BIND_ADDR_ENV: &str = "MATCHFINDER_BIND";

/// Time (in seconds) allowed for reading a request head and for a client to
/// acknowledge a connection shutdown.
pub const IO_TIMEOUT_SECS: u64 = 10;
