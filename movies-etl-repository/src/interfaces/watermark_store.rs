use async_trait::async_trait;
use chrono::{DateTime, Utc};
use movies_etl_shared::EntityType;

use crate::errors::WatermarkError;

/// Seconds from the Unix epoch back to `0001-01-01T00:00:00Z`.
const FIRST_DAY_OF_COMMON_ERA: i64 = -62_135_596_800;

/// The watermark of an entity type that has never been synchronized.
///
/// `0001-01-01T00:00:00Z` is the earliest instant both chrono and the
/// PostgreSQL `timestamptz` type can represent, so every real row is newer.
pub fn initial_watermark() -> DateTime<Utc> {
    DateTime::from_timestamp(FIRST_DAY_OF_COMMON_ERA, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Durable per-entity storage of the last processed `modified` timestamp.
///
/// Implementations never let a stored value move backwards: setting an older
/// timestamp than the one stored is a no-op.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// The last persisted watermark, or [`initial_watermark`] when absent.
    async fn get_last_state(&self, entity_type: EntityType)
        -> Result<DateTime<Utc>, WatermarkError>;

    /// Persist a new watermark for `entity_type`.
    async fn set_last_state(
        &self,
        entity_type: EntityType,
        modified: DateTime<Utc>,
    ) -> Result<(), WatermarkError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_initial_watermark_is_first_day_of_common_era() {
        let watermark = initial_watermark();
        assert_eq!(watermark.year(), 1);
        assert_eq!(watermark.month(), 1);
        assert_eq!(watermark.day(), 1);
        assert_eq!(watermark.hour(), 0);
        assert_eq!(watermark.to_rfc3339(), "0001-01-01T00:00:00+00:00");
    }
}
