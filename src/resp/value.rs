/// Decoded response to one command, tagged by kind.
///
/// A reply is per-call and owned; inspect it and let it drop. Null bulk
/// strings and null arrays both decode to `Nil`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Simple(String),
    Bulk(Vec<u8>),
    Integer(i64),
    Array(Vec<Reply>),
    Error(String),
}

impl Reply {
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    /// The server-reported error message, if this reply is an error.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Reply::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Extracts a textual payload from a simple or bulk string reply.
    ///
    /// Bulk payloads are decoded lossily; the adapter deals in opaque text,
    /// not arbitrary binary values.
    pub fn into_string(self) -> Option<String> {
        match self {
            Reply::Simple(text) => Some(text),
            Reply::Bulk(data) => Some(String::from_utf8_lossy(&data).into_owned()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the elements of an array reply.
    pub fn into_array(self) -> Option<Vec<Reply>> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }
}
