//! Single-use probe request.

use tokio::sync::oneshot;

/// One probe to run: the virtual host to send, and where to send the verdict.
///
/// The reply channel belongs to the submitter. A request is answered exactly
/// once and then dropped.
#[derive(Debug)]
pub struct ProbeRequest {
    host: String,
    reply: oneshot::Sender<bool>,
}

impl ProbeRequest {
    /// Create a request and the receiver its verdict will arrive on.
    pub fn new(host: impl Into<String>) -> (Self, oneshot::Receiver<bool>) {
        let (reply, rx) = oneshot::channel();
        (
            Self {
                host: host.into(),
                reply,
            },
            rx,
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Deliver the verdict. A submitter that stopped waiting is not an error.
    pub fn respond(self, available: bool) {
        let _ = self.reply.send(available);
    }
}
