use std::io::{self, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{Mutex, MutexGuard};

use bytes::BytesMut;

use crate::command::Command;
use crate::config::Config;
use crate::error::{ConfigError, ConnectionError, ExecError};
use crate::resp::{self, Reply};

/// Transport seam under a connection.
///
/// `TcpStream` in production; unit tests inject an in-memory fake.
pub trait Transport: Read + Write + Send {}

impl<T: Read + Write + Send> Transport for T {}

/// One live connection to the server: stream plus reusable buffers.
pub struct Connection {
    // Buffered reader for reply framing; writes go through get_mut().
    reader: BufReader<Box<dyn Transport>>,
    write_buf: BytesMut,
}

impl Connection {
    pub fn new(stream: Box<dyn Transport>) -> Self {
        Connection {
            reader: BufReader::new(stream),
            write_buf: BytesMut::with_capacity(256),
        }
    }

    fn open(config: &Config) -> Result<Self, ConnectionError> {
        let addr = config.addr();
        let timeout = config.timeout();
        let unreachable = |source: io::Error| ConnectionError::Unreachable {
            addr: addr.clone(),
            source,
        };

        let socket_addr = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| unreachable(e))?
            .next()
            .ok_or_else(|| {
                unreachable(io::Error::new(
                    io::ErrorKind::NotFound,
                    "hostname did not resolve",
                ))
            })?;

        let stream = TcpStream::connect_timeout(&socket_addr, timeout).map_err(|e| unreachable(e))?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(|e| unreachable(e))?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(|e| unreachable(e))?;
        stream.set_nodelay(true).map_err(|e| unreachable(e))?;

        Ok(Connection::new(Box::new(stream)))
    }

    /// Sends one command and blocks for its reply.
    pub fn exec(&mut self, cmd: &Command) -> Result<Reply, ExecError> {
        self.write_buf.clear();
        resp::encode_command(&cmd.argv(), &mut self.write_buf);

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buf)?;
        stream.flush()?;

        resp::read_reply(&mut self.reader)
    }
}

struct State {
    config: Config,
    conn: Option<Connection>,
}

/// Owner of the single shared connection.
///
/// One mutex serializes reconfiguration, reconnection and every command
/// dispatch, so concurrent callers can never interleave request/response
/// pairs on the shared stream.
pub struct ConnectionManager {
    state: Mutex<State>,
}

impl ConnectionManager {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(ConnectionManager {
            state: Mutex::new(State { config, conn: None }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the stored configuration wholesale.
    ///
    /// Pass `None` when the host's configuration source turned out to be
    /// absent. Takes effect on the next connect; the live connection, if
    /// any, keeps its old settings until then.
    pub fn apply_config(&self, config: Option<Config>) -> Result<(), ConfigError> {
        let config = config.ok_or(ConfigError::Missing)?;
        config.validate()?;
        let mut state = self.lock();
        state.config = config;
        Ok(())
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Config {
        self.lock().config.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.lock().conn.is_some()
    }

    /// Drops any existing connection and establishes a fresh one.
    ///
    /// Issues AUTH when a password is configured and SELECT when the
    /// database index is nonzero. On any failure no usable connection is
    /// left behind.
    pub fn connect(&self) -> Result<(), ConnectionError> {
        let mut state = self.lock();
        state.conn = None;
        let config = state.config.clone();

        let mut conn = Connection::open(&config)?;

        if let Some(password) = config.auth_password() {
            let cmd = Command::Auth {
                password: password.to_string(),
            };
            tracing::debug!(command = %cmd, "authenticating");
            match conn.exec(&cmd) {
                Ok(Reply::Error(msg)) => {
                    tracing::error!(reply = %msg, "authentication rejected");
                    return Err(ConnectionError::AuthFailed);
                }
                Ok(_) => tracing::debug!("authenticated"),
                Err(err) => return Err(handshake_failure(&config.addr(), err)),
            }
        }

        if config.database != 0 {
            let cmd = Command::Select {
                index: config.database,
            };
            tracing::debug!(command = %cmd, "selecting database");
            match conn.exec(&cmd) {
                Ok(Reply::Error(msg)) => {
                    tracing::error!(index = config.database, reply = %msg, "database selection refused");
                    return Err(ConnectionError::SelectFailed(msg));
                }
                Ok(_) => {}
                Err(err) => return Err(handshake_failure(&config.addr(), err)),
            }
        }

        state.conn = Some(conn);
        tracing::info!(addr = %config.addr(), "connected");
        Ok(())
    }

    /// Re-establishes the connection on demand.
    ///
    /// Never invoked automatically on a failed command; a host that wants
    /// recovery calls this explicitly (e.g. from its reload hook).
    pub fn reconnect(&self) -> Result<(), ConnectionError> {
        self.connect()
    }

    /// Requests a background save, then releases the connection.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        if let Some(conn) = state.conn.as_mut() {
            match conn.exec(&Command::BgSave) {
                Ok(Reply::Error(msg)) => tracing::warn!(reply = %msg, "background save refused"),
                Ok(_) => tracing::debug!("background save requested"),
                Err(err) => tracing::warn!(error = %err, "background save failed"),
            }
        }
        state.conn = None;
    }

    /// Runs one dispatch against the live connection under the guard.
    ///
    /// A failed dispatch leaves the stream at an unknown position, so the
    /// handle is dropped; later calls report `NotConnected` until an
    /// explicit reconnect.
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, ExecError>,
    ) -> Result<T, ExecError> {
        let mut state = self.lock();
        let conn = state.conn.as_mut().ok_or(ExecError::NotConnected)?;
        match f(conn) {
            Ok(value) => Ok(value),
            Err(err) => {
                state.conn = None;
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn install(&self, conn: Connection) {
        self.lock().conn = Some(conn);
    }
}

fn handshake_failure(addr: &str, err: ExecError) -> ConnectionError {
    let source = match err {
        ExecError::Io(e) => e,
        ExecError::Timeout => io::Error::new(io::ErrorKind::TimedOut, "handshake timed out"),
        ExecError::Protocol(msg) => io::Error::new(io::ErrorKind::InvalidData, msg),
        ExecError::NotConnected => io::Error::new(io::ErrorKind::NotConnected, "not connected"),
    };
    ConnectionError::Unreachable {
        addr: addr.to_string(),
        source,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    /// In-memory transport: scripted reply bytes in, written bytes captured.
    pub(crate) struct FakeStream {
        input: Cursor<Vec<u8>>,
        written: Arc<Mutex<Vec<u8>>>,
    }

    impl FakeStream {
        pub(crate) fn scripted(replies: &[u8]) -> (FakeStream, Arc<Mutex<Vec<u8>>>) {
            let written = Arc::new(Mutex::new(Vec::new()));
            let stream = FakeStream {
                input: Cursor::new(replies.to_vec()),
                written: written.clone(),
            };
            (stream, written)
        }
    }

    impl Read for FakeStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for FakeStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Manager with a fake connection already installed.
    pub(crate) fn manager_with_fake(replies: &[u8]) -> (ConnectionManager, Arc<Mutex<Vec<u8>>>) {
        let (stream, written) = FakeStream::scripted(replies);
        let manager = ConnectionManager::new(Config::default()).unwrap();
        manager.install(Connection::new(Box::new(stream)));
        (manager, written)
    }

    pub(crate) fn written_text(written: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&written.lock().unwrap_or_else(|e| e.into_inner())).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{manager_with_fake, written_text, FakeStream};
    use super::*;

    #[test]
    fn exec_encodes_command_and_decodes_reply() {
        let (stream, written) = FakeStream::scripted(b"$5\r\nhello\r\n");
        let mut conn = Connection::new(Box::new(stream));

        let reply = conn
            .exec(&Command::Get {
                key: "greeting".to_string(),
            })
            .unwrap();

        assert_eq!(reply, Reply::Bulk(b"hello".to_vec()));
        assert_eq!(written_text(&written), "*2\r\n$3\r\nGET\r\n$8\r\ngreeting\r\n");
    }

    #[test]
    fn dispatch_without_connection_reports_not_connected() {
        let manager = ConnectionManager::new(Config::default()).unwrap();
        let result = manager.with_conn(|conn| {
            conn.exec(&Command::Exists {
                key: "k".to_string(),
            })
        });
        assert!(matches!(result, Err(ExecError::NotConnected)));
    }

    #[test]
    fn failed_dispatch_poisons_the_connection() {
        // Garbage framing: the first dispatch fails, the second sees no
        // connection at all.
        let (manager, _) = manager_with_fake(b"!bogus\r\n");

        let first = manager.with_conn(|conn| {
            conn.exec(&Command::Get {
                key: "k".to_string(),
            })
        });
        assert!(matches!(first, Err(ExecError::Protocol(_))));
        assert!(!manager.is_connected());

        let second = manager.with_conn(|conn| {
            conn.exec(&Command::Get {
                key: "k".to_string(),
            })
        });
        assert!(matches!(second, Err(ExecError::NotConnected)));
    }

    #[test]
    fn apply_config_requires_a_source() {
        let manager = ConnectionManager::new(Config::default()).unwrap();
        assert!(matches!(
            manager.apply_config(None),
            Err(ConfigError::Missing)
        ));
    }

    #[test]
    fn apply_config_rejects_invalid_values() {
        let manager = ConnectionManager::new(Config::default()).unwrap();
        let bad = Config {
            host: String::new(),
            ..Config::default()
        };
        assert!(matches!(
            manager.apply_config(Some(bad)),
            Err(ConfigError::Invalid(_))
        ));
        // The stored config is untouched.
        assert_eq!(manager.config(), Config::default());
    }

    #[test]
    fn apply_config_replaces_wholesale() {
        let manager = ConnectionManager::new(Config::default()).unwrap();
        let next = Config {
            host: "10.0.0.2".to_string(),
            database: 3,
            ..Config::default()
        };
        manager.apply_config(Some(next.clone())).unwrap();
        assert_eq!(manager.config(), next);
    }

    #[test]
    fn shutdown_requests_background_save_and_releases() {
        let (manager, written) = manager_with_fake(b"+Background saving started\r\n");
        manager.shutdown();
        assert!(!manager.is_connected());
        assert_eq!(written_text(&written), "*1\r\n$6\r\nBGSAVE\r\n");
    }

    #[test]
    fn shutdown_without_connection_is_a_noop() {
        let manager = ConnectionManager::new(Config::default()).unwrap();
        manager.shutdown();
        assert!(!manager.is_connected());
    }
}
