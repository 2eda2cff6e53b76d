use std::sync::Arc;

use crate::command::Command;
use crate::conn::ConnectionManager;
use crate::error::ExecError;
use crate::resp::Reply;

/// Issues typed commands against the shared connection.
///
/// Every dispatch is mirrored to the debug log before it goes out; logging
/// never affects control flow. Server-reported errors come back as
/// `Reply::Error` values — deciding whether they are fatal is the
/// adapter's job, not the executor's.
#[derive(Clone)]
pub struct Executor {
    manager: Arc<ConnectionManager>,
}

impl Executor {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Executor { manager }
    }

    pub fn execute(&self, cmd: &Command) -> Result<Reply, ExecError> {
        tracing::debug!(command = %cmd, "dispatch");
        self.manager.with_conn(|conn| conn.exec(cmd))
    }
}
