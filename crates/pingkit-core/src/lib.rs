//! Pingkit - an ICMP Echo probing library.
//!
//! This crate provides a blocking ICMP Echo ("ping") probing engine.  A
//! session sends a fixed number of Echo Request probes to a single IPv4
//! target over a raw socket, correlates the replies by session identifier,
//! translates ICMP error messages into human readable descriptions and
//! aggregates the round-trip times into summary statistics.
//!
//! Each probe carries its send timestamp in the packet payload, so the
//! round-trip time is computed from the echoed payload alone without any
//! state held for in-flight probes.
//!
//! Raw sockets require elevated privileges on most platforms, for example
//! the `CAP_NET_RAW` capability on Linux.
//!
//! # Example
//!
//! The following example builds and runs a session with default
//! configuration and prints each probe outcome followed by the session
//! summary:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::Ipv4Addr;
//! # use std::str::FromStr;
//! use pingkit_core::Builder;
//!
//! let addr = Ipv4Addr::from_str("1.1.1.1")?;
//! let pinger = Builder::new(addr).build()?;
//! pinger.run_with(|report| println!("{report:?}"))?;
//! println!("{:?}", pinger.snapshot().summary());
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Pinger`].
//! - [`Pinger::run`] - Run the session on the current thread.
//! - [`Pinger::run_with`] - Run the session with a custom probe handler.
#![deny(unsafe_code)]

mod builder;
mod catalog;
mod config;
mod error;
mod net;
mod pinger;
mod probe;
mod prober;
mod stats;
mod types;

pub use builder::Builder;
pub use catalog::{describe, UNKNOWN_ERROR};
pub use config::{defaults, SessionConfig};
pub use error::{Error, Result};
pub use net::{channel::Channel, Network, Socket};
pub use pinger::{Pinger, ProbeReport};
pub use probe::{EchoProbe, ProbeOutcome, Reply};
pub use prober::Prober;
pub use stats::{summarize, RttSummary, SessionState};
pub use types::{MaxProbes, ProbeId, Sequence};

#[cfg(unix)]
pub use net::SocketImpl;
