use serde_derive::{Deserialize, Serialize};

/// Coarse fix quality reported over the info channel. The integer codes are
/// part of the channel contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixQuality {
    NoFix = 0,
    GpsFix = 1,
}

impl FixQuality {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// One row of the platform's visible-satellite snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatelliteInfo {
    pub svid: i32,
    pub used_in_fix: bool,
}

/// Last known location as reported by the provider.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    /// Unix epoch milliseconds.
    pub timestamp_ms: u64,
    pub accuracy_m: f32,
}

/// Semantic GNSS status events. Both registration strategies emit these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GnssEvent {
    Started,
    Stopped,
    FirstFix,
    SatelliteStatusChanged,
}
