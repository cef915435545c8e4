//! Crisis path: emergency resources instead of normal content selection.

use crate::error::AppError;
use crate::store::ContentStore;
use tracing::warn;

use super::response::{BotResponse, ResourceSummary};

/// Maximum number of emergency resources attached to a crisis reply.
pub const EMERGENCY_RESOURCE_LIMIT: usize = 3;

/// Builds the crisis reply. Finding fewer resources than the limit, or none, is not an error.
pub async fn crisis_response<S>(store: &S) -> Result<BotResponse, AppError>
where
    S: ContentStore + ?Sized,
{
    let resources: Vec<ResourceSummary> = store
        .find_active_emergency_resources(EMERGENCY_RESOURCE_LIMIT)
        .await?
        .iter()
        .filter_map(ResourceSummary::from_item)
        .collect();

    if resources.is_empty() {
        warn!("Crisis message received but no emergency resources are configured");
    }

    Ok(BotResponse::crisis(resources))
}
