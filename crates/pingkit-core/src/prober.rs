use crate::error::{Error, Result};
use crate::net::Network;
use crate::probe::{EchoProbe, ProbeOutcome};
use crate::types::{ProbeId, Sequence};
use std::time::{Duration, Instant, SystemTime};
use tracing::instrument;

/// Sends a single probe and resolves it within a fixed time budget.
#[derive(Debug, Clone, Copy)]
pub struct Prober {
    identifier: ProbeId,
    timeout: Duration,
}

impl Prober {
    #[must_use]
    pub const fn new(identifier: ProbeId, timeout: Duration) -> Self {
        Self {
            identifier,
            timeout,
        }
    }

    /// Send one probe and wait for its outcome.
    ///
    /// The timeout is a budget shared across every datagram seen while the
    /// probe is outstanding.  A stray reply belonging to another session, or
    /// a datagram too short to decode, consumes the time spent waiting for it
    /// but does not resolve the probe, so the wait resumes with whatever
    /// budget remains.
    #[instrument(skip(self, network), level = "trace")]
    pub fn probe<N: Network>(&self, network: &mut N, sequence: Sequence) -> Result<ProbeOutcome> {
        let probe = EchoProbe::new(self.identifier, sequence, SystemTime::now());
        network.send_probe(probe)?;
        let mut remaining = self.timeout;
        loop {
            if remaining.is_zero() {
                return Ok(ProbeOutcome::Timeout);
            }
            let wait_started = Instant::now();
            match network.recv_reply(remaining) {
                Ok(None) => return Ok(ProbeOutcome::Timeout),
                Ok(Some(ProbeOutcome::IdentifierMismatch(reply))) => {
                    tracing::debug!(?reply, "discarded stray reply");
                }
                Ok(Some(outcome)) => return Ok(outcome),
                Err(Error::MalformedDatagram(err)) => {
                    tracing::debug!(%err, "discarded malformed datagram");
                }
                Err(err) => return Err(err),
            }
            remaining = remaining.saturating_sub(wait_started.elapsed());
        }
    }
}
