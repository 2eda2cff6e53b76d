use std::fmt;

use crate::error::UsageError;

/// What a read or write addresses: a flat key, or a field inside a hash.
///
/// Resolved once at the API boundary from the caller's positional
/// arguments; one argument means whole-key scalar semantics, two means
/// hash-field semantics. Any other arity is a usage error and nothing is
/// dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Scalar(String),
    HashField(String, String),
}

impl Target {
    /// Resolves positional arguments into a target.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Target, UsageError> {
        match args {
            [key] => {
                let key = key.as_ref();
                if key.is_empty() {
                    return Err(UsageError::EmptyArgument("key"));
                }
                Ok(Target::Scalar(key.to_string()))
            }
            [key, field] => {
                let (key, field) = (key.as_ref(), field.as_ref());
                if key.is_empty() {
                    return Err(UsageError::EmptyArgument("key"));
                }
                if field.is_empty() {
                    return Err(UsageError::EmptyArgument("field"));
                }
                Ok(Target::HashField(key.to_string(), field.to_string()))
            }
            other => Err(UsageError::Arity(other.len())),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Target::Scalar(key) => key,
            Target::HashField(key, _) => key,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Scalar(key) => write!(f, "{key}"),
            Target::HashField(key, field) => write!(f, "{key},{field}"),
        }
    }
}

/// The fixed set of commands the adapter issues.
///
/// Keeping the set closed and typed decouples dispatch from wire
/// formatting; [`Command::argv`] is the only place a command turns into
/// protocol arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get { key: String },
    Set { key: String, value: String },
    HGet { key: String, field: String },
    HSet { key: String, field: String, value: String },
    Exists { key: String },
    Del { key: String },
    Publish { channel: String, message: String },
    Keys { pattern: String },
    HKeys { key: String },
    Auth { password: String },
    Select { index: u32 },
    BgSave,
}

impl Command {
    /// Read command for a target: GET for scalars, HGET for hash fields.
    pub fn read(target: &Target) -> Command {
        match target {
            Target::Scalar(key) => Command::Get { key: key.clone() },
            Target::HashField(key, field) => Command::HGet {
                key: key.clone(),
                field: field.clone(),
            },
        }
    }

    /// Write command for a target: SET for scalars, HSET for hash fields.
    pub fn write(target: &Target, value: &str) -> Command {
        match target {
            Target::Scalar(key) => Command::Set {
                key: key.clone(),
                value: value.to_string(),
            },
            Target::HashField(key, field) => Command::HSet {
                key: key.clone(),
                field: field.clone(),
                value: value.to_string(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::HGet { .. } => "HGET",
            Command::HSet { .. } => "HSET",
            Command::Exists { .. } => "EXISTS",
            Command::Del { .. } => "DEL",
            Command::Publish { .. } => "PUBLISH",
            Command::Keys { .. } => "KEYS",
            Command::HKeys { .. } => "HKEYS",
            Command::Auth { .. } => "AUTH",
            Command::Select { .. } => "SELECT",
            Command::BgSave => "BGSAVE",
        }
    }

    /// Protocol argument vector, command name first.
    pub(crate) fn argv(&self) -> Vec<Vec<u8>> {
        fn arg(text: &str) -> Vec<u8> {
            text.as_bytes().to_vec()
        }

        match self {
            Command::Get { key } => vec![arg("GET"), arg(key)],
            Command::Set { key, value } => vec![arg("SET"), arg(key), arg(value)],
            Command::HGet { key, field } => vec![arg("HGET"), arg(key), arg(field)],
            Command::HSet { key, field, value } => {
                vec![arg("HSET"), arg(key), arg(field), arg(value)]
            }
            Command::Exists { key } => vec![arg("EXISTS"), arg(key)],
            Command::Del { key } => vec![arg("DEL"), arg(key)],
            Command::Publish { channel, message } => {
                vec![arg("PUBLISH"), arg(channel), arg(message)]
            }
            Command::Keys { pattern } => vec![arg("KEYS"), arg(pattern)],
            Command::HKeys { key } => vec![arg("HKEYS"), arg(key)],
            Command::Auth { password } => vec![arg("AUTH"), arg(password)],
            Command::Select { index } => vec![arg("SELECT"), arg(&index.to_string())],
            Command::BgSave => vec![arg("BGSAVE")],
        }
    }
}

/// Log rendering. Credentials are masked.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Command::Auth { .. } = self {
            return write!(f, "AUTH ******");
        }
        let argv = self.argv();
        let mut parts = argv
            .iter()
            .map(|a| String::from_utf8_lossy(a).into_owned());
        write!(f, "{}", parts.next().unwrap_or_default())?;
        for part in parts {
            write!(f, " {part}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_argument_is_scalar() {
        let target = Target::from_args(&["mykey"]).unwrap();
        assert_eq!(target, Target::Scalar("mykey".to_string()));
    }

    #[test]
    fn two_arguments_are_hash_field() {
        let target = Target::from_args(&["mykey", "field"]).unwrap();
        assert_eq!(
            target,
            Target::HashField("mykey".to_string(), "field".to_string())
        );
    }

    #[test]
    fn zero_and_three_arguments_are_usage_errors() {
        let none: &[&str] = &[];
        assert_eq!(Target::from_args(none), Err(UsageError::Arity(0)));
        assert_eq!(
            Target::from_args(&["a", "b", "c"]),
            Err(UsageError::Arity(3))
        );
    }

    #[test]
    fn empty_key_or_field_is_rejected() {
        assert_eq!(
            Target::from_args(&[""]),
            Err(UsageError::EmptyArgument("key"))
        );
        assert_eq!(
            Target::from_args(&["k", ""]),
            Err(UsageError::EmptyArgument("field"))
        );
    }

    #[test]
    fn read_and_write_follow_target_shape() {
        let scalar = Target::Scalar("k".to_string());
        let field = Target::HashField("k".to_string(), "f".to_string());

        assert_eq!(Command::read(&scalar).name(), "GET");
        assert_eq!(Command::read(&field).name(), "HGET");
        assert_eq!(Command::write(&scalar, "v").name(), "SET");
        assert_eq!(Command::write(&field, "v").name(), "HSET");
    }

    #[test]
    fn argv_renders_protocol_arguments() {
        let cmd = Command::HSet {
            key: "k".to_string(),
            field: "f".to_string(),
            value: "v".to_string(),
        };
        assert_eq!(
            cmd.argv(),
            vec![b"HSET".to_vec(), b"k".to_vec(), b"f".to_vec(), b"v".to_vec()]
        );

        let cmd = Command::Select { index: 3 };
        assert_eq!(cmd.argv(), vec![b"SELECT".to_vec(), b"3".to_vec()]);
    }

    #[test]
    fn display_masks_credentials() {
        let cmd = Command::Auth {
            password: "secret".to_string(),
        };
        assert_eq!(cmd.to_string(), "AUTH ******");

        let cmd = Command::Get {
            key: "k".to_string(),
        };
        assert_eq!(cmd.to_string(), "GET k");
    }
}
