//! Shared state behind the web routes

use std::path::PathBuf;
use std::sync::Arc;

use heos_api::HeosDevice;
use parking_lot::{Mutex, RwLock};
use preset_store::PresetStore;

use crate::config::DashboardConfig;

pub type SharedState = Arc<AppState>;

/// Configuration, device facade and presets for one dashboard process.
///
/// The facade is replaced wholesale when the device address changes;
/// requests already holding the previous `Arc` finish against it.
pub struct AppState {
    config_path: PathBuf,
    config: RwLock<DashboardConfig>,
    device: RwLock<Arc<HeosDevice>>,
    presets: Mutex<PresetStore>,
}

impl AppState {
    pub fn new(config_path: PathBuf, config: DashboardConfig, presets: PresetStore) -> Self {
        let device = HeosDevice::new(config.device.ip.clone(), config.device.port);

        Self {
            config_path,
            config: RwLock::new(config),
            device: RwLock::new(Arc::new(device)),
            presets: Mutex::new(presets),
        }
    }

    pub fn config(&self) -> DashboardConfig {
        self.config.read().clone()
    }

    /// Applies `update` to a copy of the configuration and persists it.
    ///
    /// The in-memory configuration only changes when the result validates
    /// and the save succeeds.
    pub fn update_config<F>(&self, update: F) -> anyhow::Result<DashboardConfig>
    where
        F: FnOnce(&mut DashboardConfig) -> anyhow::Result<()>,
    {
        let mut guard = self.config.write();
        let mut next = guard.clone();
        update(&mut next)?;
        next.validate()?;
        next.save(&self.config_path)?;
        *guard = next.clone();
        Ok(next)
    }

    pub fn device(&self) -> Arc<HeosDevice> {
        Arc::clone(&self.device.read())
    }

    /// Swaps in a facade for a new endpoint
    pub fn replace_device(&self, host: &str, port: u16) {
        tracing::info!(host, port, "device endpoint changed");
        *self.device.write() = Arc::new(HeosDevice::new(host, port));
    }

    pub fn presets(&self) -> parking_lot::MutexGuard<'_, PresetStore> {
        self.presets.lock()
    }
}
