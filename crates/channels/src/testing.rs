//! Test doubles shared by the channel tests.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use crate::{Channel, Error, Result};

/// Channel owning every address with a given prefix, recording sends.
pub(crate) struct MockChannel {
    name: String,
    prefix: String,
    connected: AtomicBool,
    reject_with: Option<String>,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockChannel {
    pub(crate) fn new(name: &str, prefix: &str) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            connected: AtomicBool::new(true),
            reject_with: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn disconnected(self) -> Self {
        self.connected.store(false, Ordering::SeqCst);
        self
    }

    pub(crate) fn rejecting(mut self, reason: &str) -> Self {
        self.reject_with = Some(reason.into());
        self
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn owns_jid(&self, jid: &str) -> bool {
        jid.starts_with(&self.prefix)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send_message(&self, jid: &str, text: &str) -> Result<()> {
        if let Some(reason) = &self.reject_with {
            return Err(Error::delivery(&self.name, reason));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((jid.to_string(), text.to_string()));
        Ok(())
    }
}
