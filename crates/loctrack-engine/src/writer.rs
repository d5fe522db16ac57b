//! Write seam between the ingestion service and persistence

use loctrack_core::errors::Result;
use loctrack_core::model::NewSample;
use loctrack_store::LocationStore;

/// Append-only sink for captured samples
///
/// Implementations must be safe to call from several threads at once; the
/// service issues inserts from the blocking pool and they may overlap.
pub trait SampleWriter: Send + Sync {
    /// Persist a sample and return its assigned id
    fn insert(&self, sample: &NewSample) -> Result<i64>;
}

impl SampleWriter for LocationStore {
    fn insert(&self, sample: &NewSample) -> Result<i64> {
        LocationStore::insert(self, sample)
    }
}
