use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use msgs::philosopher::{Philosopher, PhilosopherState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const LOGS_DIR: &str = "logs";

/// Routing key for a log record: the server-wide state log, or the log
/// file belonging to one connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKey {
    Server,
    Client(u32),
}

#[derive(Debug)]
pub struct LogRecord {
    pub key: LogKey,
    pub text: String,
}

/// Sender half of the log channel. Emission is fire-and-forget: it never
/// blocks the caller, and a full or closed channel silently drops the
/// record.
#[derive(Clone)]
pub struct Logs {
    tx: mpsc::Sender<LogRecord>,
}

impl Logs {
    pub fn channel() -> (Logs, mpsc::Receiver<LogRecord>) {
        let (tx, rx) = mpsc::channel(100);
        (Logs { tx }, rx)
    }

    pub fn server(&self, text: impl Into<String>) {
        let _ = self.tx.try_send(LogRecord {
            key: LogKey::Server,
            text: text.into(),
        });
    }

    pub fn client(&self, session_id: u32, text: impl Into<String>) {
        let _ = self.tx.try_send(LogRecord {
            key: LogKey::Client(session_id),
            text: text.into(),
        });
    }

    /// The per-client line for the states a philosopher dwells in. Hungry
    /// is not an action, it is a wait, and gets reported by the engine
    /// through the wait records instead.
    pub fn client_action(&self, session_id: u32, philosopher: &Philosopher) {
        let action = match philosopher.state {
            PhilosopherState::Thinking => "thinking",
            PhilosopherState::Eating => "eating",
            PhilosopherState::Hungry => return,
        };
        self.client(
            session_id,
            format!(
                "Philosopher {} is {action}: {} seconds left",
                philosopher.id, philosopher.state_timer
            ),
        );
    }
}

pub fn server_log_path() -> PathBuf {
    Path::new(LOGS_DIR).join("server.log")
}

pub fn client_log_path(session_id: u32) -> PathBuf {
    Path::new(LOGS_DIR).join(format!("client_{session_id}.log"))
}

/// Drains the log channel into one append-only file per routing key.
/// Files are opened on first use and unbuffered, so `tail -f` sees every
/// line as it lands. The task ends once every sender is gone.
pub fn spawn_log_writer(mut rx: mpsc::Receiver<LogRecord>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut files: HashMap<LogKey, File> = HashMap::new();

        while let Some(record) = rx.recv().await {
            let file = match files.entry(record.key) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let path = match record.key {
                        LogKey::Server => server_log_path(),
                        LogKey::Client(session_id) => client_log_path(session_id),
                    };
                    match OpenOptions::new().create(true).append(true).open(&path) {
                        Ok(file) => entry.insert(file),
                        Err(e) => {
                            println!("error while opening log file {}: {e}", path.display());
                            continue;
                        }
                    }
                }
            };

            let timestamp = Local::now().format("%H:%M:%S");
            if let Err(e) = writeln!(file, "[{timestamp}] {}", record.text) {
                println!("error while writing a log record: {e}");
            }
        }
    })
}
