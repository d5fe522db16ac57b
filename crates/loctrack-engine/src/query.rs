//! Read side for consumers of the tracked data
//!
//! A thin pass-through over the store's live queries. No caching,
//! filtering or transformation happens here.

use loctrack_core::errors::Result;
use loctrack_core::model::LocationSample;
use loctrack_store::{LiveQuery, LocationStore};

#[derive(Clone)]
pub struct LocationQueries {
    store: LocationStore,
}

impl LocationQueries {
    pub fn new(store: LocationStore) -> Self {
        Self { store }
    }

    /// All samples, newest first, re-emitted after every write
    ///
    /// # Errors
    ///
    /// `ERR_PERSISTENCE` when the store has to reload the table and cannot.
    pub fn all_locations(&self) -> Result<LiveQuery<Vec<LocationSample>>> {
        self.store.stream_all()
    }

    /// Most recent sample, `None` while the store is empty
    pub fn latest_location(&self) -> LiveQuery<Option<LocationSample>> {
        self.store.stream_latest()
    }
}
