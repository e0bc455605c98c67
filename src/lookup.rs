use crate::config::LookupPath;
use crate::directory::RangeDirectory;
use crate::error::Result;
use crate::pan;
use crate::types::CardRangeData;
use tracing::debug;

/// Read path: (index →) cache → store, populating the cache on a store hit.
pub struct Lookups<'d>(&'d RangeDirectory);

impl<'d> Lookups<'d> {
    pub(crate) fn new(dir: &'d RangeDirectory) -> Self {
        Self(dir)
    }

    /// Range containing `pan`, as a wire DTO.
    ///
    /// A missing or negative PAN is "not found" and touches nothing. Cache
    /// faults degrade to a miss; a store fault is returned to the caller.
    pub fn by_pan(&self, pan: Option<i64>) -> Result<Option<CardRangeData>> {
        let Some(pan) = pan else {
            debug!("Lookup without PAN");
            return Ok(None);
        };
        let Ok(pan) = u64::try_from(pan) else {
            debug!(pan, "Lookup with negative PAN");
            return Ok(None);
        };
        self.by_canonical_pan(pan)
    }

    /// Same as [`by_pan`](Self::by_pan) for a PAN that is already known to
    /// be non-negative.
    pub fn by_canonical_pan(&self, pan: u64) -> Result<Option<CardRangeData>> {
        if self.0.lookup_config().path == LookupPath::IndexFirst {
            if let Some(range) = self.0.index().lookup(pan) {
                return Ok(Some(range.to_data()));
            }
        }

        let key = pan::lookup_key(pan);
        let cache = self.0.cache();
        if let Some(hit) = cache.find_one::<CardRangeData>(&key) {
            debug!(pan, "Card range served from cache");
            return Ok(Some(hit));
        }

        let Some(range) = self.0.store().find_containing(pan)? else {
            debug!(pan, "No card range contains PAN");
            return Ok(None);
        };
        let data = range.to_data();
        cache.write_one(&key, &data);
        debug!(pan, start = range.start_range, end = range.end_range, "Card range served from store");
        Ok(Some(data))
    }

    /// Lookup through the lossy 16-digit coercion (pad right with zeros,
    /// keep the leading 16 digits).
    pub fn by_pan_str(&self, raw: &str) -> Result<Option<CardRangeData>> {
        match pan::coerce(raw) {
            Some(pan) => self.by_canonical_pan(pan),
            None => {
                debug!(raw, "PAN is not a digit string");
                Ok(None)
            }
        }
    }
}
