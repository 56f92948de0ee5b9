use crate::types::{MaxProbes, ProbeId, Sequence};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use std::num::NonZeroUsize;
    use std::time::Duration;

    /// The default value for `probe-timeout`.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

    /// The default value for `probe-interval`.
    pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);

    /// The default value for `max-probes`.
    pub const DEFAULT_MAX_PROBES: NonZeroUsize = match NonZeroUsize::new(10) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// The default value for `initial-sequence`.
    pub const DEFAULT_INITIAL_SEQUENCE: u16 = 1;
}

/// Probing session configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SessionConfig {
    /// The host to probe.
    pub target_addr: Ipv4Addr,
    /// The session identifier stamped into every Echo Request.
    pub identifier: ProbeId,
    /// The sequence number of the first probe.
    pub initial_sequence: Sequence,
    /// The number of probes to send.
    pub max_probes: MaxProbes,
    /// The reply wait budget for each probe.
    pub probe_timeout: Duration,
    /// The pause between consecutive probes.
    pub probe_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_addr: Ipv4Addr::UNSPECIFIED,
            identifier: ProbeId::default(),
            initial_sequence: Sequence(defaults::DEFAULT_INITIAL_SEQUENCE),
            max_probes: MaxProbes(defaults::DEFAULT_MAX_PROBES),
            probe_timeout: defaults::DEFAULT_PROBE_TIMEOUT,
            probe_interval: defaults::DEFAULT_PROBE_INTERVAL,
        }
    }
}
