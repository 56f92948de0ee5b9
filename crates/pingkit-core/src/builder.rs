use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::types::{MaxProbes, ProbeId, Sequence};
use crate::Pinger;
use std::net::Ipv4Addr;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Build a pinger.
///
/// This is a convenience builder to simplify the creation and execution of a
/// probing session.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use pingkit_core::Builder;
/// use std::time::Duration;
///
/// let addr = std::net::Ipv4Addr::from([1, 2, 3, 4]);
/// let pinger = Builder::new(addr)
///     .max_probes(5)?
///     .probe_timeout(Duration::from_millis(500))
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`Pinger`] - An ICMP Echo probing session.
#[derive(Debug)]
pub struct Builder {
    target_addr: Ipv4Addr,
    identifier: ProbeId,
    initial_sequence: Sequence,
    max_probes: MaxProbes,
    probe_timeout: Duration,
    probe_interval: Duration,
}

impl Builder {
    /// Build a pinger builder for a given target.
    ///
    /// The session identifier defaults to the lower 16 bits of the process
    /// id, which distinguishes this session's replies from those of other
    /// processes probing from the same host.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use pingkit_core::Builder;
    ///
    /// let addr = std::net::Ipv4Addr::from([1, 1, 1, 1]);
    /// let pinger = Builder::new(addr).build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn new(target_addr: Ipv4Addr) -> Self {
        let config = SessionConfig::default();
        Self {
            target_addr,
            identifier: ProbeId((std::process::id() & 0xFFFF) as u16),
            initial_sequence: config.initial_sequence,
            max_probes: config.max_probes,
            probe_timeout: config.probe_timeout,
            probe_interval: config.probe_interval,
        }
    }

    /// Set the session identifier.
    #[must_use]
    pub const fn identifier(self, identifier: u16) -> Self {
        Self {
            identifier: ProbeId(identifier),
            ..self
        }
    }

    /// Set the sequence number of the first probe.
    #[must_use]
    pub const fn initial_sequence(self, initial_sequence: u16) -> Self {
        Self {
            initial_sequence: Sequence(initial_sequence),
            ..self
        }
    }

    /// Set the number of probes to send.
    ///
    /// # Errors
    ///
    /// Returns `Error::BadConfig` if `max_probes` is zero.
    pub fn max_probes(self, max_probes: usize) -> Result<Self> {
        let max_probes = NonZeroUsize::new(max_probes)
            .ok_or_else(|| Error::BadConfig(String::from("max_probes may not be zero")))?;
        Ok(Self {
            max_probes: MaxProbes(max_probes),
            ..self
        })
    }

    /// Set the reply wait budget for each probe.
    #[must_use]
    pub const fn probe_timeout(self, probe_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            ..self
        }
    }

    /// Set the pause between consecutive probes.
    #[must_use]
    pub const fn probe_interval(self, probe_interval: Duration) -> Self {
        Self {
            probe_interval,
            ..self
        }
    }

    /// Build the pinger.
    ///
    /// # Errors
    ///
    /// This function will return `Error::BadConfig` if the configuration is
    /// invalid.
    pub fn build(self) -> Result<Pinger> {
        let last_sequence =
            usize::from(self.initial_sequence.0) + (self.max_probes.0.get() - 1);
        if last_sequence > usize::from(u16::MAX) {
            return Err(Error::BadConfig(format!(
                "sequence would wrap: {} + {} > {}",
                self.initial_sequence.0,
                self.max_probes.0.get() - 1,
                u16::MAX
            )));
        }
        Ok(Pinger::new(SessionConfig {
            target_addr: self.target_addr,
            identifier: self.identifier,
            initial_sequence: self.initial_sequence,
            max_probes: self.max_probes,
            probe_timeout: self.probe_timeout,
            probe_interval: self.probe_interval,
        }))
    }
}
