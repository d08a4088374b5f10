use async_trait::async_trait;
use chrono::{DateTime, Utc};
use movies_etl_shared::{EntityType, SourceRow};

use crate::errors::SourceError;

/// Read access to the relational source of record.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Fetch up to `limit` rows of `entity_type` modified strictly after
    /// `since`, in ascending `modified` order.
    ///
    /// Implementations acquire a connection for the duration of the call and
    /// release it before returning.
    async fn fetch_changed(
        &self,
        entity_type: EntityType,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SourceRow>, SourceError>;
}
