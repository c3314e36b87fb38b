use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{debug, info};

use domain_radar_core::catalogue::DEFAULT_PLATFORMS;
use domain_radar_storage::{Database, PlatformError};

/// Inserts each default registrar whose name is not stored yet.
///
/// Returns the number of platforms inserted. Running it again is a no-op.
pub async fn seed_default_platforms(
    database: &Database,
    now: DateTime<Utc>,
) -> Result<usize, PlatformError> {
    let repo = database.platforms();
    let mut inserted = 0;

    for entry in DEFAULT_PLATFORMS {
        let outcome = repo.insert_if_name_absent(&entry.to_platform(now)).await?;
        if outcome.is_inserted() {
            inserted += 1;
            counter!("platform_seed_inserted_total").increment(1);
            debug!(stage = "seed", name = entry.name, "default platform inserted");
        }
    }

    info!(stage = "seed", inserted, total = DEFAULT_PLATFORMS.len(), "default platforms seeded");
    Ok(inserted)
}
