use tracing::info;

use crate::{domain::ArchivedMemento, ports::ArchiveLookup, Result};

/// Most recent snapshot of `url`, or `None` when the service has never archived it.
///
/// Service failures propagate; the caller owns retry.
pub async fn get_latest_archived_url(
    lookup: &dyn ArchiveLookup,
    url: &str,
) -> Result<Option<ArchivedMemento>> {
    // The service returns snapshots oldest first.
    let latest = lookup.timemap(url).await?.pop();
    if let Some(m) = &latest {
        info!(url, archived_url = %m.url, timestamp = %m.timestamp, "Retrieved archived link");
    }
    Ok(latest)
}
