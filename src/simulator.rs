use crate::{
    error::{Error, Result},
    location::{LocationService, StatusHandler, SubscriptionId},
    types::{GnssEvent, LocationFix, SatelliteInfo},
    utils,
};
use log::debug;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    thread,
    time::Duration,
};

struct SimState {
    provider_enabled: bool,
    registration_denied: bool,
    fail_queries: bool,
    satellites: Vec<SatelliteInfo>,
    last_fix: Option<LocationFix>,
}

type HandlerList = Mutex<Vec<(SubscriptionId, StatusHandler)>>;

/// In-memory `LocationService`. Backs the demo binary and the tests; a real
/// deployment supplies a platform-specific implementation instead.
pub struct SimulatedLocationService {
    modern_api: bool,
    state: Mutex<SimState>,
    gnss_callbacks: HandlerList,
    status_listeners: HandlerList,
    next_id: AtomicU64,
}

impl SimulatedLocationService {
    /// `modern_api` toggles the capability check, so both registration
    /// strategies can be exercised.
    pub fn new(modern_api: bool) -> SimulatedLocationService {
        SimulatedLocationService {
            modern_api,
            state: Mutex::new(SimState {
                provider_enabled: true,
                registration_denied: false,
                fail_queries: false,
                satellites: Vec::new(),
                last_fix: None,
            }),
            gnss_callbacks: Mutex::new(Vec::new()),
            status_listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn set_provider_enabled(&self, enabled: bool) {
        self.state.lock().unwrap().provider_enabled = enabled;
    }

    pub fn set_registration_denied(&self, denied: bool) {
        self.state.lock().unwrap().registration_denied = denied;
    }

    /// When set, every provider query fails, as under a revoked permission.
    pub fn set_fail_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_queries = fail;
    }

    pub fn set_satellites(&self, satellites: Vec<SatelliteInfo>) {
        self.state.lock().unwrap().satellites = satellites;
    }

    pub fn set_last_fix(&self, fix: Option<LocationFix>) {
        self.state.lock().unwrap().last_fix = fix;
    }

    /// Deliver an event to every registered handler, whichever API it came
    /// in through. Handlers run outside the handler-list locks so they may
    /// query this service freely.
    pub fn emit(&self, event: GnssEvent) {
        let handlers: Vec<StatusHandler> = self
            .gnss_callbacks
            .lock()
            .unwrap()
            .iter()
            .chain(self.status_listeners.lock().unwrap().iter())
            .map(|(_, handler)| handler.clone())
            .collect();
        debug!("GNSS event {event:?} delivered to {} handlers", handlers.len());
        for handler in handlers {
            handler(event);
        }
    }

    pub fn gnss_callback_count(&self) -> usize {
        self.gnss_callbacks.lock().unwrap().len()
    }

    pub fn status_listener_count(&self) -> usize {
        self.status_listeners.lock().unwrap().len()
    }

    fn check_registration_allowed(&self) -> Result<()> {
        if self.state.lock().unwrap().registration_denied {
            return Err(Error::Unavailable("location permission denied"));
        }
        Ok(())
    }

    fn insert(&self, handlers: &HandlerList, handler: StatusHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        handlers.lock().unwrap().push((id, handler));
        id
    }
}

impl LocationService for SimulatedLocationService {
    fn supports_gnss_callback(&self) -> bool {
        self.modern_api
    }

    fn is_provider_enabled(&self) -> Result<bool> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(Error::Provider("simulated provider failure"));
        }
        Ok(state.provider_enabled)
    }

    fn last_known_location(&self) -> Result<Option<LocationFix>> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(Error::Provider("simulated provider failure"));
        }
        Ok(state.last_fix)
    }

    fn gnss_snapshot(&self) -> Result<Vec<SatelliteInfo>> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(Error::Provider("simulated provider failure"));
        }
        Ok(state.satellites.clone())
    }

    fn register_gnss_callback(&self, handler: StatusHandler) -> Result<SubscriptionId> {
        if !self.modern_api {
            return Err(Error::Unavailable(
                "GNSS status callbacks need a newer platform",
            ));
        }
        self.check_registration_allowed()?;
        Ok(self.insert(&self.gnss_callbacks, handler))
    }

    fn register_status_listener(&self, handler: StatusHandler) -> Result<SubscriptionId> {
        self.check_registration_allowed()?;
        Ok(self.insert(&self.status_listeners, handler))
    }

    fn unregister(&self, id: SubscriptionId) -> Result<()> {
        for handlers in [&self.gnss_callbacks, &self.status_listeners] {
            let mut handlers = handlers.lock().unwrap();
            if let Some(pos) = handlers.iter().position(|(hid, _)| *hid == id) {
                handlers.remove(pos);
                return Ok(());
            }
        }
        Err(Error::Provider("unknown subscription id"))
    }
}

/// Scripted GNSS session for the demo binary: start, first fix, then periodic
/// satellite status updates with a wandering in-fix count.
pub fn run_demo_script(service: &SimulatedLocationService, tick: Duration) {
    service.emit(GnssEvent::Started);
    service.set_satellites(visible_constellation(4));
    service.set_last_fix(Some(LocationFix {
        timestamp_ms: utils::now_unix_ms(),
        accuracy_m: 4.0,
    }));
    service.emit(GnssEvent::FirstFix);

    let mut step = 0u64;
    loop {
        thread::sleep(tick);
        step += 1;
        service.set_satellites(visible_constellation(3 + (step % 6) as usize));
        service.set_last_fix(Some(LocationFix {
            timestamp_ms: utils::now_unix_ms(),
            accuracy_m: 1.5 + (step % 4) as f32 * 2.0,
        }));
        service.emit(GnssEvent::SatelliteStatusChanged);
    }
}

fn visible_constellation(used: usize) -> Vec<SatelliteInfo> {
    (0..10)
        .map(|i| SatelliteInfo {
            svid: i + 1,
            used_in_fix: (i as usize) < used,
        })
        .collect()
}
