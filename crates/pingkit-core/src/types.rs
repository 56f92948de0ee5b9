use derive_more::{Add, AddAssign};
use std::num::NonZeroUsize;

/// `ProbeId` newtype.
///
/// The 16-bit identifier embedded in Echo messages which distinguishes
/// probing sessions sharing a raw socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct ProbeId(pub u16);

/// `Sequence` number newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Add, AddAssign)]
pub struct Sequence(pub u16);

/// `MaxProbes` newtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd)]
pub struct MaxProbes(pub NonZeroUsize);

impl From<Sequence> for usize {
    fn from(sequence: Sequence) -> Self {
        sequence.0 as Self
    }
}
