use serde::{Deserialize, Serialize};
use std::fmt;

/// Device-reported graphics API version, encoded the way the host reports it:
/// major version in the upper 16 bits, minor version in the lower 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityLevel(u32);

impl CapabilityLevel {
    /// OpenGL ES 3.0; the engine cannot render below this.
    pub const MINIMUM: CapabilityLevel = CapabilityLevel(0x30000);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn major(self) -> u32 {
        self.0 >> 16
    }

    pub const fn minor(self) -> u32 {
        self.0 & 0xffff
    }

    pub fn meets_minimum(self) -> bool {
        self >= Self::MINIMUM
    }
}

impl fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Reports the host's graphics capability. Must be side-effect free.
pub trait CapabilityProbe {
    fn current_level(&self) -> CapabilityLevel;
}
