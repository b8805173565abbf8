use serde::{Deserialize, Serialize};

use crate::error::{PresetError, Result};

/// A named stream the dashboard can start with one click
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub uri: String,
}

impl Preset {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }
}

/// The presets a fresh installation starts with
pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset::new("NPR", "https://npr-ice.streamguys1.com/live.mp3"),
        Preset::new(
            "Classic FM",
            "http://media-ice.musicradio.com/ClassicFMMP3.m3u",
        ),
    ]
}

#[derive(Deserialize)]
struct LoosePreset {
    name: Option<String>,
    uri: Option<String>,
}

/// Parse a JSON array of `{name, uri}` objects.
///
/// Every entry must carry both fields, otherwise the whole document is
/// rejected with [`PresetError::InvalidFormat`].
pub fn parse_presets(text: &str) -> Result<Vec<Preset>> {
    let entries: Vec<LoosePreset> = serde_json::from_str(text)?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match (entry.name, entry.uri) {
            (Some(name), Some(uri)) => Ok(Preset { name, uri }),
            _ => Err(PresetError::InvalidFormat(format!(
                "entry {} is missing `name` or `uri`",
                index
            ))),
        })
        .collect()
}
