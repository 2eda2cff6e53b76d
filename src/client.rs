use std::sync::Arc;

use crate::command::{Command, Target};
use crate::conn::ConnectionManager;
use crate::error::{ExecError, PublishError, WriteError};
use crate::exec::Executor;
use crate::resp::Reply;

/// Domain operations over the shared connection.
///
/// Read-style operations (`read`, `exists`, `delete`) degrade to a soft
/// negative when the store is unreachable — callers cannot distinguish
/// "key absent" from "store down" on those paths, matching the adapter's
/// contract. Write-style operations (`write`, `publish`) surface failures
/// as typed errors instead of silently succeeding.
///
/// Cheap to clone; all clones share the one connection.
#[derive(Clone)]
pub struct Client {
    manager: Arc<ConnectionManager>,
    exec: Executor,
}

impl Client {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        let exec = Executor::new(manager.clone());
        Client { manager, exec }
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Reads a scalar key or a hash field, depending on the target shape.
    ///
    /// Returns `None` when the key is absent — and also when the store is
    /// unreachable; failures are logged, never raised.
    pub fn read(&self, target: &Target) -> Option<String> {
        match self.exec.execute(&Command::read(target)) {
            Ok(Reply::Nil) => {
                tracing::debug!(key = target.key(), "key not found");
                None
            }
            Ok(Reply::Error(msg)) => {
                tracing::warn!(target = %target, reply = %msg, "read rejected");
                None
            }
            Ok(reply) => reply.into_string(),
            Err(err) => {
                tracing::warn!(target = %target, error = %err, "read failed");
                None
            }
        }
    }

    pub fn read_key(&self, key: &str) -> Option<String> {
        self.read(&Target::Scalar(key.to_string()))
    }

    pub fn read_hash(&self, key: &str, field: &str) -> Option<String> {
        self.read(&Target::HashField(key.to_string(), field.to_string()))
    }

    /// Writes a scalar key or a hash field, depending on the target shape.
    pub fn write(&self, target: &Target, value: &str) -> Result<(), WriteError> {
        match self.exec.execute(&Command::write(target, value)) {
            Ok(Reply::Error(msg)) => {
                tracing::error!(target = %target, reply = %msg, "write rejected");
                Err(WriteError::Rejected(msg))
            }
            // SET acknowledges with +OK, HSET with the created-field count.
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::error!(target = %target, error = %err, "write failed");
                Err(err.into())
            }
        }
    }

    pub fn write_key(&self, key: &str, value: &str) -> Result<(), WriteError> {
        self.write(&Target::Scalar(key.to_string()), value)
    }

    pub fn write_hash(&self, key: &str, field: &str, value: &str) -> Result<(), WriteError> {
        self.write(
            &Target::HashField(key.to_string(), field.to_string()),
            value,
        )
    }

    /// Whether a key exists. A connection failure reads as non-existence.
    pub fn exists(&self, key: &str) -> bool {
        match self.exec.execute(&Command::Exists {
            key: key.to_string(),
        }) {
            Ok(Reply::Integer(n)) => n > 0,
            Ok(reply) => {
                tracing::warn!(key, ?reply, "unexpected EXISTS reply");
                false
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "existence check failed");
                false
            }
        }
    }

    /// Returns the prior value if one was present, deleting the key
    /// regardless. Never fatal: a failed delete is logged and the key is
    /// simply reported as absent.
    pub fn delete(&self, key: &str) -> Option<String> {
        let prior = self.read_key(key);
        match self.exec.execute(&Command::Del {
            key: key.to_string(),
        }) {
            Ok(Reply::Error(msg)) => {
                tracing::debug!(key, reply = %msg, "delete rejected")
            }
            Ok(_) => {}
            Err(err) => tracing::debug!(key, error = %err, "key not deleted"),
        }
        prior
    }

    /// Publishes a message, returning the subscriber count. Zero
    /// subscribers is a successful publish, not an error.
    pub fn publish(&self, channel: &str, message: &str) -> Result<i64, PublishError> {
        match self.exec.execute(&Command::Publish {
            channel: channel.to_string(),
            message: message.to_string(),
        }) {
            Ok(Reply::Integer(count)) => Ok(count),
            Ok(Reply::Error(msg)) => {
                tracing::error!(channel, reply = %msg, "publish rejected");
                Err(PublishError::Rejected(msg))
            }
            Ok(reply) => {
                tracing::error!(channel, ?reply, "unexpected PUBLISH reply");
                Err(PublishError::Exec(ExecError::Protocol(
                    "unexpected PUBLISH reply".to_string(),
                )))
            }
            Err(err) => {
                tracing::error!(channel, error = %err, "publish failed");
                Err(err.into())
            }
        }
    }

    /// Lists keys matching a glob pattern with their current values.
    ///
    /// One listing command, then one fetch per key — not a snapshot.
    /// Writers racing this loop can change values between the listing and
    /// each fetch; keys that vanish or hold a non-string type surface with
    /// a `None` value.
    pub fn list_all(&self, pattern: &str) -> Result<Vec<(String, Option<String>)>, ExecError> {
        let pattern = if pattern.is_empty() { "*" } else { pattern };
        let keys = self.listing(&Command::Keys {
            pattern: pattern.to_string(),
        })?;

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self.read_key(&key);
            entries.push((key, value));
        }
        Ok(entries)
    }

    /// Lists the fields of a hash with their current values.
    ///
    /// Same per-element fetch pattern as [`Client::list_all`], with the
    /// same consistency caveat.
    pub fn list_hash(&self, key: &str) -> Result<Vec<(String, Option<String>)>, ExecError> {
        let fields = self.listing(&Command::HKeys {
            key: key.to_string(),
        })?;

        let mut entries = Vec::with_capacity(fields.len());
        for field in fields {
            let value = self.read_hash(key, &field);
            entries.push((field, value));
        }
        Ok(entries)
    }

    fn listing(&self, cmd: &Command) -> Result<Vec<String>, ExecError> {
        let reply = self.exec.execute(cmd).map_err(|err| {
            tracing::warn!(command = cmd.name(), error = %err, "listing failed");
            err
        })?;

        let items = match reply {
            Reply::Array(items) => items,
            Reply::Nil => Vec::new(),
            Reply::Error(msg) => return Err(ExecError::Protocol(msg)),
            other => {
                return Err(ExecError::Protocol(format!(
                    "unexpected {} reply: {other:?}",
                    cmd.name()
                )))
            }
        };

        Ok(items.into_iter().filter_map(Reply::into_string).collect())
    }
}
