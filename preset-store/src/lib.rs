//! Radio station presets for the HEOS dashboard
//!
//! Presets are kept in insertion order and keyed by name. The backing file
//! is a JSON array of `{"name": ..., "uri": ...}` objects, which is also the
//! format used for import and export.
//!
//! ```no_run
//! use preset_store::PresetStore;
//!
//! let mut store = PresetStore::open("stations.json");
//! store.add("KEXP", "https://kexp.streamguys1.com/kexp160.aac")?;
//! for preset in store.presets() {
//!     println!("{} -> {}", preset.name, preset.uri);
//! }
//! # Ok::<(), preset_store::PresetError>(())
//! ```

mod error;
mod preset;
mod store;

pub use error::{PresetError, Result};
pub use preset::{default_presets, parse_presets, Preset};
pub use store::PresetStore;
