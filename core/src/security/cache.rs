use super::{descriptor::SecurityDescriptor, error::SecurityError};
use log::debug;
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

/**
 * Parsed security descriptors keyed by the SHA256 of their raw bytes.
 * Most directory objects carry byte identical inherited descriptors, so each distinct blob is parsed
 * and stored once. Filled during the build phase only
 */
#[derive(Debug, Default)]
pub struct DescriptorCache {
    descriptors: Mutex<HashMap<[u8; 32], Arc<SecurityDescriptor>>>,
    hits: AtomicUsize,
}

impl DescriptorCache {
    pub fn new() -> DescriptorCache {
        DescriptorCache::default()
    }

    /// Return the shared descriptor for `data`, parsing it on first sight
    pub fn get_or_parse(&self, data: &[u8]) -> Result<Arc<SecurityDescriptor>, SecurityError> {
        let digest = Sha256::digest(data);
        let mut key = [0; 32];
        key.copy_from_slice(&digest);

        let mut descriptors = match self.descriptors.lock() {
            Ok(result) => result,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = descriptors.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(existing.clone());
        }

        let descriptor = Arc::new(SecurityDescriptor::from_bytes(data)?);
        descriptors.insert(key, descriptor.clone());
        debug!(
            "[security] Cached new security descriptor, {} unique so far",
            descriptors.len()
        );
        Ok(descriptor)
    }

    /// Number of unique descriptors
    pub fn len(&self) -> usize {
        match self.descriptors.lock() {
            Ok(result) => result.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lookups served from the cache
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }
}
