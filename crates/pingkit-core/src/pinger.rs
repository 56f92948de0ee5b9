use crate::error::Result;
use crate::probe::ProbeOutcome;
use crate::stats::SessionState;
use crate::types::{MaxProbes, ProbeId, Sequence};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

/// A report for a single completed probe, passed to the probe handler.
#[derive(Debug, Clone, Copy)]
pub struct ProbeReport<'a> {
    /// The sequence of the probe.
    pub sequence: Sequence,
    /// The outcome the probe resolved to.
    pub outcome: &'a ProbeOutcome,
}

/// An ICMP Echo probing session.
///
/// See the [`crate`] documentation for more information.
///
/// Note that this type is cheaply cloneable.
#[derive(Debug, Clone)]
pub struct Pinger {
    inner: Arc<inner::PingerInner>,
}

impl Pinger {
    /// Create a `Pinger`.
    ///
    /// Use the [`crate::Builder`] type to create a [`Pinger`].
    pub(crate) fn new(config: crate::config::SessionConfig) -> Self {
        Self {
            inner: Arc::new(inner::PingerInner::new(config)),
        }
    }

    /// Run the [`Pinger`].
    ///
    /// This method will block until the session has sent all probes or fails.
    /// At the completion of the session, the state can be retrieved using the
    /// [`Pinger::snapshot`] method.
    ///
    /// # Example
    ///
    /// The following will run a session to completion and print the summary:
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// # use std::net::Ipv4Addr;
    /// # use std::str::FromStr;
    /// use pingkit_core::Builder;
    ///
    /// let addr = Ipv4Addr::from_str("1.1.1.1")?;
    /// let pinger = Builder::new(addr).build()?;
    /// pinger.run()?;
    /// println!("{:?}", pinger.snapshot().summary());
    /// # Ok(())
    /// # }
    /// ```
    pub fn run(&self) -> Result<()> {
        self.inner.run()
    }

    /// Run the [`Pinger`] with a custom probe handler.
    ///
    /// This method will additionally call the provided function for each
    /// probe as it completes, which is useful for reporting progress while
    /// the session is still running.
    ///
    /// # Example
    ///
    /// The following will print every probe outcome as it resolves:
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// # use std::net::Ipv4Addr;
    /// # use std::str::FromStr;
    /// use pingkit_core::Builder;
    ///
    /// let addr = Ipv4Addr::from_str("1.1.1.1")?;
    /// let pinger = Builder::new(addr).build()?;
    /// pinger.run_with(|report| println!("{report:?}"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn run_with<F: Fn(&ProbeReport<'_>)>(&self, func: F) -> Result<()> {
        self.inner.run_with(func)
    }

    /// Take a snapshot of the session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.snapshot()
    }

    /// Clear the session state.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// The target address of the session.
    #[must_use]
    pub fn target_addr(&self) -> Ipv4Addr {
        self.inner.target_addr()
    }

    /// The session identifier.
    #[must_use]
    pub fn identifier(&self) -> ProbeId {
        self.inner.identifier()
    }

    /// The sequence number of the first probe.
    #[must_use]
    pub fn initial_sequence(&self) -> Sequence {
        self.inner.initial_sequence()
    }

    /// The number of probes the session will send.
    #[must_use]
    pub fn max_probes(&self) -> MaxProbes {
        self.inner.max_probes()
    }

    /// The reply wait budget for each probe.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        self.inner.probe_timeout()
    }

    /// The pause between consecutive probes.
    #[must_use]
    pub fn probe_interval(&self) -> Duration {
        self.inner.probe_interval()
    }
}

mod inner {
    use crate::config::SessionConfig;
    use crate::error::{Error, Result};
    use crate::net::channel::Channel;
    use crate::net::{Network, SocketImpl};
    use crate::pinger::ProbeReport;
    use crate::prober::Prober;
    use crate::stats::SessionState;
    use crate::types::{MaxProbes, ProbeId, Sequence};
    use parking_lot::RwLock;
    use std::net::Ipv4Addr;
    use std::thread;
    use std::time::Duration;
    use tracing::instrument;

    #[derive(Debug)]
    pub(super) struct PingerInner {
        config: SessionConfig,
        state: RwLock<SessionState>,
    }

    impl PingerInner {
        pub(super) fn new(config: SessionConfig) -> Self {
            Self {
                config,
                state: RwLock::new(SessionState::default()),
            }
        }

        #[instrument(skip_all, level = "trace")]
        pub(super) fn run(&self) -> Result<()> {
            self.run_internal(|_| ())
                .map_err(|err| self.handle_error(err))
        }

        #[instrument(skip_all, level = "trace")]
        pub(super) fn run_with<F: Fn(&ProbeReport<'_>)>(&self, func: F) -> Result<()> {
            self.run_internal(func)
                .map_err(|err| self.handle_error(err))
        }

        pub(super) fn snapshot(&self) -> SessionState {
            self.state.read().clone()
        }

        pub(super) fn clear(&self) {
            *self.state.write() = SessionState::default();
        }

        pub(super) const fn target_addr(&self) -> Ipv4Addr {
            self.config.target_addr
        }

        pub(super) const fn identifier(&self) -> ProbeId {
            self.config.identifier
        }

        pub(super) const fn initial_sequence(&self) -> Sequence {
            self.config.initial_sequence
        }

        pub(super) const fn max_probes(&self) -> MaxProbes {
            self.config.max_probes
        }

        pub(super) const fn probe_timeout(&self) -> Duration {
            self.config.probe_timeout
        }

        pub(super) const fn probe_interval(&self) -> Duration {
            self.config.probe_interval
        }

        #[instrument(skip_all, level = "trace")]
        fn run_internal<F: Fn(&ProbeReport<'_>)>(&self, func: F) -> Result<()> {
            let channel =
                Channel::<SocketImpl>::connect(self.config.target_addr, self.config.identifier)?;
            self.session(channel, func)
        }

        /// Run the probe loop over an arbitrary `Network`.
        pub(super) fn session<N: Network, F: Fn(&ProbeReport<'_>)>(
            &self,
            mut network: N,
            func: F,
        ) -> Result<()> {
            let prober = Prober::new(self.config.identifier, self.config.probe_timeout);
            let mut sequence = self.config.initial_sequence;
            for i in 0..self.config.max_probes.0.get() {
                if i > 0 {
                    thread::sleep(self.config.probe_interval);
                }
                let outcome = prober.probe(&mut network, sequence)?;
                self.state.write().record(outcome.sample());
                func(&ProbeReport {
                    sequence,
                    outcome: &outcome,
                });
                sequence += Sequence(1);
            }
            Ok(())
        }

        fn handle_error(&self, err: Error) -> Error {
            self.state.write().set_error(Some(err.to_string()));
            err
        }
    }
}
