use crate::{
    error::Result,
    location::{LocationService, StatusHandler, StatusSubscription},
    tracker::SatelliteTracker,
    types::FixQuality,
    utils,
};
use log::{debug, info, warn};
use std::sync::Arc;

/// Age under which a last known location still counts as a live fix.
pub const FIX_FRESHNESS_MS: u64 = 5000;

/// Owns the tracker and its status subscription for the lifetime of the
/// bridge, and answers the two channel queries.
pub struct GpsBridge {
    service: Arc<dyn LocationService>,
    tracker: Arc<SatelliteTracker>,
    _subscription: Option<StatusSubscription>,
}

impl GpsBridge {
    /// Subscribes to the service's status events, picking the registration
    /// strategy by capability. A failed registration is not fatal: the bridge
    /// still serves queries, with the satellite count perpetually unknown.
    pub fn new(service: Arc<dyn LocationService>) -> GpsBridge {
        let tracker = Arc::new(SatelliteTracker::new());
        let subscription = register_status_source(&service, &tracker);
        GpsBridge {
            service,
            tracker,
            _subscription: subscription,
        }
    }

    /// Cached satellites-used-in-fix count, verbatim.
    pub fn satellite_count(&self) -> Option<u32> {
        self.tracker.satellite_count()
    }

    /// Derived fix quality, evaluated fresh on every call. `None` means the
    /// quality could not be determined, which is distinct from `NoFix`.
    pub fn fix_quality(&self) -> Option<FixQuality> {
        match self.evaluate_fix_quality() {
            Ok(quality) => Some(quality),
            Err(e) => {
                debug!("Fix quality evaluation failed: {e}");
                None
            }
        }
    }

    fn evaluate_fix_quality(&self) -> Result<FixQuality> {
        if !self.service.is_provider_enabled()? {
            return Ok(FixQuality::NoFix);
        }

        if let Some(fix) = self.service.last_known_location()? {
            if age_ms(fix.timestamp_ms) < FIX_FRESHNESS_MS {
                // Accuracy bands reserved for finer quality tiers; today they
                // all resolve to a plain fix.
                return Ok(match fix.accuracy_m {
                    accuracy if accuracy < 1.0 => FixQuality::GpsFix,
                    accuracy if accuracy < 5.0 => FixQuality::GpsFix,
                    _ => FixQuality::GpsFix,
                });
            }
        }

        // A positive in-fix count implies a live signal even without a fresh
        // location.
        match self.tracker.satellite_count() {
            Some(count) if count > 0 => Ok(FixQuality::GpsFix),
            _ => Ok(FixQuality::NoFix),
        }
    }
}

fn register_status_source(
    service: &Arc<dyn LocationService>,
    tracker: &Arc<SatelliteTracker>,
) -> Option<StatusSubscription> {
    let handler: StatusHandler = {
        let service = Arc::clone(service);
        let tracker = Arc::clone(tracker);
        Arc::new(move |event| tracker.handle_event(event, service.as_ref()))
    };

    let registered = if service.supports_gnss_callback() {
        info!("Registering through the GNSS status callback API");
        service.register_gnss_callback(handler)
    } else {
        info!("Registering through the legacy status listener API");
        service.register_status_listener(handler)
    };

    match registered {
        Ok(id) => Some(StatusSubscription::new(Arc::clone(service), id)),
        Err(e) => {
            warn!("GNSS status source unavailable, satellite count stays unknown: {e}");
            None
        }
    }
}

fn age_ms(timestamp_ms: u64) -> u64 {
    utils::now_unix_ms().saturating_sub(timestamp_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SimulatedLocationService;
    use crate::types::{GnssEvent, LocationFix, SatelliteInfo};
    use rstest::rstest;

    fn service() -> Arc<SimulatedLocationService> {
        Arc::new(SimulatedLocationService::new(true))
    }

    fn used_satellites(count: usize) -> Vec<SatelliteInfo> {
        (0..count)
            .map(|i| SatelliteInfo {
                svid: i as i32 + 1,
                used_in_fix: true,
            })
            .collect()
    }

    fn fresh_fix(accuracy_m: f32) -> LocationFix {
        LocationFix {
            timestamp_ms: utils::now_unix_ms(),
            accuracy_m,
        }
    }

    fn stale_fix() -> LocationFix {
        LocationFix {
            timestamp_ms: utils::now_unix_ms().saturating_sub(60_000),
            accuracy_m: 3.0,
        }
    }

    #[test]
    fn provider_disabled_means_no_fix() {
        let service = service();
        service.set_provider_enabled(false);
        service.set_last_fix(Some(fresh_fix(1.0)));
        let bridge = GpsBridge::new(service.clone());
        service.set_satellites(used_satellites(4));
        service.emit(GnssEvent::SatelliteStatusChanged);
        assert_eq!(bridge.fix_quality(), Some(FixQuality::NoFix));
    }

    #[rstest]
    #[case(0.5)]
    #[case(3.0)]
    #[case(50.0)]
    fn fresh_fix_is_a_gps_fix_in_every_accuracy_band(#[case] accuracy_m: f32) {
        let service = service();
        service.set_last_fix(Some(fresh_fix(accuracy_m)));
        let bridge = GpsBridge::new(service);
        assert_eq!(bridge.fix_quality(), Some(FixQuality::GpsFix));
    }

    #[test]
    fn positive_count_stands_in_for_a_stale_fix() {
        let service = service();
        service.set_last_fix(Some(stale_fix()));
        let bridge = GpsBridge::new(service.clone());
        service.set_satellites(used_satellites(3));
        service.emit(GnssEvent::SatelliteStatusChanged);
        assert_eq!(bridge.satellite_count(), Some(3));
        assert_eq!(bridge.fix_quality(), Some(FixQuality::GpsFix));
    }

    #[test]
    fn zero_count_and_stale_fix_is_no_fix() {
        let service = service();
        service.set_last_fix(Some(stale_fix()));
        let bridge = GpsBridge::new(service.clone());
        service.set_satellites(used_satellites(0));
        service.emit(GnssEvent::SatelliteStatusChanged);
        assert_eq!(bridge.satellite_count(), Some(0));
        assert_eq!(bridge.fix_quality(), Some(FixQuality::NoFix));
    }

    #[test]
    fn unset_count_and_no_fix_history_is_no_fix() {
        let bridge = GpsBridge::new(service());
        assert_eq!(bridge.satellite_count(), None);
        assert_eq!(bridge.fix_quality(), Some(FixQuality::NoFix));
    }

    #[test]
    fn platform_failure_yields_unknown_not_a_fault() {
        let service = service();
        let bridge = GpsBridge::new(service.clone());
        service.set_satellites(used_satellites(5));
        service.emit(GnssEvent::SatelliteStatusChanged);
        service.set_fail_queries(true);
        assert_eq!(bridge.fix_quality(), None);
        // The cached count is unaffected by the failing quality query.
        assert_eq!(bridge.satellite_count(), Some(5));
    }

    #[test]
    fn modern_platform_registers_a_gnss_callback() {
        let service = service();
        let _bridge = GpsBridge::new(service.clone());
        assert_eq!(service.gnss_callback_count(), 1);
        assert_eq!(service.status_listener_count(), 0);
    }

    #[test]
    fn legacy_platform_registers_a_status_listener() {
        let service = Arc::new(SimulatedLocationService::new(false));
        let _bridge = GpsBridge::new(service.clone());
        assert_eq!(service.gnss_callback_count(), 0);
        assert_eq!(service.status_listener_count(), 1);
    }

    #[test]
    fn subscription_is_released_on_teardown() {
        let service = service();
        let bridge = GpsBridge::new(service.clone());
        assert_eq!(service.gnss_callback_count(), 1);
        drop(bridge);
        assert_eq!(service.gnss_callback_count(), 0);
    }

    #[test]
    fn denied_registration_leaves_the_bridge_operational() {
        let service = service();
        service.set_registration_denied(true);
        service.set_last_fix(Some(fresh_fix(2.0)));
        let bridge = GpsBridge::new(service.clone());
        assert_eq!(service.gnss_callback_count(), 0);
        // Events go nowhere; the count stays unknown but queries still work.
        service.set_satellites(used_satellites(6));
        service.emit(GnssEvent::SatelliteStatusChanged);
        assert_eq!(bridge.satellite_count(), None);
        assert_eq!(bridge.fix_quality(), Some(FixQuality::GpsFix));
    }
}
