//! Rebuild the in-memory windows from storage after a restart.

use anyhow::Result;
use tracing::info;

use crate::engine::AlertEngine;
use crate::models::Reading;
use crate::store::{ReadingQuery, ReadingStore};

// ---

/// Replay the newest stored readings of each sensor into `engine`, oldest
/// first, then run one evaluation pass so the registry reflects them.
///
/// Fetches `window + 1` readings per sensor: a full history plus the
/// candidate. Returns how many readings were replayed.
pub async fn reseed(engine: &AlertEngine, store: &dyn ReadingStore) -> Result<usize> {
    // ---
    let config = engine.config();
    let light_limit = u32::try_from(config.light_window + 1)?;
    let audio_limit = u32::try_from(config.audio_window + 1)?;

    let mut light = store.light_readings(&ReadingQuery::latest(light_limit)).await?;
    let mut audio = store.audio_readings(&ReadingQuery::latest(audio_limit)).await?;
    light.reverse();
    audio.reverse();

    let replayed = light.len() + audio.len();
    for reading in light {
        engine.seed(&Reading::Light(reading))?;
    }
    for reading in audio {
        engine.seed(&Reading::Audio(reading))?;
    }

    let alerts = engine.run_pass()?;
    info!(
        "Re-seeded windows with {} stored reading(s); {} alert(s) active",
        replayed,
        alerts.len()
    );
    Ok(replayed)
}
