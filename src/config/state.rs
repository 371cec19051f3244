// Application state module
// Per-run state shared by every request handler

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::http::MediaTypes;
use crate::logger::EventSink;

/// Addresses of every client seen since the server started
#[derive(Debug, Default)]
pub struct ClientRecord {
    clients: Mutex<BTreeSet<IpAddr>>,
}

impl ClientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a client, returns true the first time it is seen
    pub fn insert(&self, client: IpAddr) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients.insert(client)
    }

    pub fn snapshot(&self) -> Vec<IpAddr> {
        let clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Application state, immutable for the lifetime of one server run
pub struct AppState {
    /// Canonical shared directory
    pub root: PathBuf,
    pub media: MediaTypes,
    pub clients: Arc<ClientRecord>,
    pub events: EventSink,
    pub access_log: bool,
    pub access_log_format: String,
}

impl AppState {
    pub fn new(root: PathBuf, media: MediaTypes, events: EventSink) -> Self {
        Self {
            root,
            media,
            clients: Arc::new(ClientRecord::new()),
            events,
            access_log: false,
            access_log_format: "short".to_string(),
        }
    }

    /// Enable per-response access logging in the given format
    #[must_use]
    pub fn with_access_log(mut self, format: &str) -> Self {
        self.access_log = true;
        self.access_log_format = format.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_record_deduplicates() {
        let record = ClientRecord::new();
        let a: IpAddr = "192.168.1.10".parse().unwrap();
        let b: IpAddr = "192.168.1.11".parse().unwrap();
        assert!(record.insert(a));
        assert!(!record.insert(a));
        assert!(record.insert(b));
        assert_eq!(record.snapshot(), vec![a, b]);
    }

    #[test]
    fn test_client_record_concurrent_inserts() {
        let record = Arc::new(ClientRecord::new());
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let record = Arc::clone(&record);
                std::thread::spawn(move || {
                    for j in 0..50u8 {
                        record.insert(IpAddr::from([10, 0, i, j]));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(record.len(), 400);
    }
}
