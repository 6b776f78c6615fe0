use crate::{location::LocationService, types::GnssEvent};
use arc_swap::ArcSwapOption;
use log::debug;
use std::sync::Arc;

/// Tracks the latest satellites-used-in-fix count. The count is a single
/// last-writer-wins cell: the status handler overwrites it, queries read it.
pub struct SatelliteTracker {
    used_in_fix: ArcSwapOption<u32>,
}

impl SatelliteTracker {
    pub fn new() -> SatelliteTracker {
        SatelliteTracker {
            used_in_fix: ArcSwapOption::empty(),
        }
    }

    pub fn handle_event(&self, event: GnssEvent, service: &dyn LocationService) {
        match event {
            GnssEvent::Started => {}
            GnssEvent::Stopped => self.used_in_fix.store(None),
            GnssEvent::FirstFix | GnssEvent::SatelliteStatusChanged => self.recount(service),
        }
    }

    fn recount(&self, service: &dyn LocationService) {
        match service.gnss_snapshot() {
            Ok(satellites) => {
                let count = satellites.iter().filter(|sat| sat.used_in_fix).count() as u32;
                self.used_in_fix.store(Some(Arc::new(count)));
            }
            Err(e) => debug!("GNSS snapshot unavailable, keeping previous count: {e}"),
        }
    }

    /// Cached count, verbatim. `None` until the first recount and after a
    /// `Stopped` event.
    pub fn satellite_count(&self) -> Option<u32> {
        self.used_in_fix.load_full().map(|count| *count)
    }
}

impl Default for SatelliteTracker {
    fn default() -> Self {
        Self::new()
    }
}
