use std::io;
use thiserror::Error;

/// Failures while resolving or applying adapter configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration provided")]
    Missing,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures while establishing the shared connection.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("cannot reach redis at {addr}: {source}")]
    Unreachable {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("redis rejected authentication")]
    AuthFailed,

    #[error("redis refused database selection: {0}")]
    SelectFailed(String),
}

/// Failures while dispatching a single command.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("not connected to redis")]
    NotConnected,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("command timed out")]
    Timeout,

    #[error("io error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for ExecError {
    fn from(err: io::Error) -> Self {
        // Socket timeouts surface as WouldBlock on unix, TimedOut on windows.
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ExecError::Timeout,
            _ => ExecError::Io(err),
        }
    }
}

/// A write that did not take effect, surfaced to the caller.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("write failed: {0}")]
    Exec(#[from] ExecError),

    #[error("write rejected by server: {0}")]
    Rejected(String),
}

/// A publish that did not take effect, surfaced to the caller.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("publish failed: {0}")]
    Exec(#[from] ExecError),

    #[error("publish rejected by server: {0}")]
    Rejected(String),
}

/// Malformed caller arguments, rejected before any command is dispatched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UsageError {
    #[error("expected <key> or <key>,<field>, got {0} arguments")]
    Arity(usize),

    #[error("empty {0}")]
    EmptyArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, ExecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_kinds_map_to_timeout() {
        let err = io::Error::new(io::ErrorKind::WouldBlock, "read timed out");
        assert!(matches!(ExecError::from(err), ExecError::Timeout));
        let err = io::Error::new(io::ErrorKind::TimedOut, "read timed out");
        assert!(matches!(ExecError::from(err), ExecError::Timeout));
    }

    #[test]
    fn other_io_kinds_stay_io() {
        let err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(matches!(ExecError::from(err), ExecError::Io(_)));
    }
}
