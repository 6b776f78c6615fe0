use crate::{
    error::Result,
    types::{GnssEvent, LocationFix, SatelliteInfo},
};
use log::warn;
use std::sync::Arc;

/// Shared handler fed by whichever registration strategy is active.
pub type StatusHandler = Arc<dyn Fn(GnssEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Platform location service the bridge observes. On Android this is backed
/// by the location manager; in tests and the demo binary it is backed by
/// `SimulatedLocationService`.
pub trait LocationService: Send + Sync {
    /// Whether the platform offers the newer GNSS status callback API.
    /// Checked once at subscription time to pick a registration strategy.
    fn supports_gnss_callback(&self) -> bool;

    fn is_provider_enabled(&self) -> Result<bool>;

    fn last_known_location(&self) -> Result<Option<LocationFix>>;

    /// Currently visible satellites with their used-in-fix flags.
    fn gnss_snapshot(&self) -> Result<Vec<SatelliteInfo>>;

    /// Register through the newer GNSS status callback API.
    fn register_gnss_callback(&self, handler: StatusHandler) -> Result<SubscriptionId>;

    /// Register through the legacy status listener API.
    fn register_status_listener(&self, handler: StatusHandler) -> Result<SubscriptionId>;

    fn unregister(&self, id: SubscriptionId) -> Result<()>;
}

/// Guard over an active status subscription. Unregisters on drop so the
/// listener is released on every teardown path of its owner.
pub struct StatusSubscription {
    service: Arc<dyn LocationService>,
    id: SubscriptionId,
}

impl StatusSubscription {
    pub fn new(service: Arc<dyn LocationService>, id: SubscriptionId) -> StatusSubscription {
        StatusSubscription { service, id }
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        if let Err(e) = self.service.unregister(self.id) {
            warn!("Failed to unregister GNSS status subscription: {e}");
        }
    }
}
