//! Shared networking constants and helpers used by client and server.

/// TCP port on which the mock remote source accepts commands.
pub const COMMAND_PORT: u16 = 8080;

/// Default host for a locally running mock remote source.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Helper to format an IPv4 address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}
