use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

/// Connection status as reported to the host.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl Display for ConnectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Error => write!(f, "unknown error"),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Session {
    status: ConnectionStatus,
    last_status: Option<ConnectionStatus>,
    connected_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            status: ConnectionStatus::Disconnected,
            last_status: None,
            connected_at: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        self.connected_at
    }

    /// Records `status` and returns whether it has to be emitted, which is only the case
    /// when it differs from the last emitted status.
    pub fn transition(&mut self, status: ConnectionStatus) -> bool {
        self.status = status;
        match status {
            ConnectionStatus::Connected => self.connected_at = Some(Utc::now()),
            ConnectionStatus::Disconnected => self.connected_at = None,
            _ => {}
        }

        if self.last_status == Some(status) {
            return false;
        }
        self.last_status = Some(status);
        true
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}
