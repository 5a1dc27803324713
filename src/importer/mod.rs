//! Batch import: decoder chain plus store merge
//!
//! The importer ties the two-tier payload decoder to the store's
//! append/replace merge. A decode failure (both tiers empty) is
//! reported as an error distinct from a merge that persisted zero
//! entries because everything was a duplicate.

use std::sync::Arc;
use thiserror::Error;

use crate::decoder::{DecodeError, DecoderChain};
use crate::models::ImportMode;
use crate::store::ServerStore;

/// Errors raised by batch and single-entry imports
#[derive(Error, Debug)]
pub enum ImportError {
    /// Payload or link could not be decoded
    #[error("Decode failure: {0}")]
    Decode(#[from] DecodeError),

    /// Store merge failed
    #[error("Store failure: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Merges decoded payloads into the persistent store
pub struct Importer {
    store: Arc<ServerStore>,
    chain: DecoderChain,
}

impl Importer {
    pub fn new(store: Arc<ServerStore>) -> Self {
        Self {
            store,
            chain: DecoderChain::new(),
        }
    }

    /// Decode a raw payload and merge it under `subscription_id`.
    ///
    /// Returns the number of entries actually persisted post-dedup.
    /// A payload that yields zero entries from both decode tiers is a
    /// [`DecodeError::NothingDecoded`] failure; a well-decoded batch
    /// that persists zero entries (all duplicates) returns `Ok(0)`.
    pub fn import_batch(
        &self,
        raw: &str,
        subscription_id: &str,
        mode: ImportMode,
    ) -> Result<usize, ImportError> {
        let configs = self.chain.decode_batch(raw);
        if configs.is_empty() {
            return Err(DecodeError::NothingDecoded.into());
        }

        let inserted = self.store.upsert(subscription_id, &configs, mode)?;

        tracing::info!(
            subscription_id,
            mode = mode.as_str(),
            decoded = configs.len(),
            inserted,
            "imported batch"
        );
        Ok(inserted)
    }

    /// Import one manually supplied share link (clipboard, file, QR).
    ///
    /// Bypasses the batch decoder; malformed input surfaces the decode
    /// cause to the caller instead of degrading into an empty batch.
    pub fn import_single(&self, text: &str, subscription_id: &str) -> Result<usize, ImportError> {
        let config = self.chain.decode_single(text)?;
        let inserted = self
            .store
            .upsert(subscription_id, &[config], ImportMode::Append)?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn importer() -> (Importer, Arc<ServerStore>) {
        let store = Arc::new(ServerStore::in_memory().unwrap());
        (Importer::new(Arc::clone(&store)), store)
    }

    #[test]
    fn test_import_batch_plain() {
        let (importer, store) = importer();
        let payload = "vless://u1@a.example.com:443#n1\nvless://u2@b.example.com:443#n2";

        let count = importer
            .import_batch(payload, "sub-1", ImportMode::Replace)
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.count_servers().unwrap(), 2);
    }

    #[test]
    fn test_import_batch_transport_encoded() {
        let (importer, _store) = importer();
        let payload = STANDARD.encode("trojan://pw@c.example.com:443#n3");

        let count = importer
            .import_batch(&payload, "sub-1", ImportMode::Replace)
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_import_batch_decode_failure_is_distinct() {
        let (importer, _store) = importer();
        let err = importer
            .import_batch("<html>oops</html>", "sub-1", ImportMode::Replace)
            .unwrap_err();
        assert!(matches!(err, ImportError::Decode(DecodeError::NothingDecoded)));
    }

    #[test]
    fn test_import_batch_all_duplicates_is_ok_zero() {
        let (importer, _store) = importer();
        let payload = "vless://u1@a.example.com:443#n1";

        importer.import_batch(payload, "", ImportMode::Append).unwrap();
        let second = importer.import_batch(payload, "", ImportMode::Append).unwrap();
        assert_eq!(second, 0);
    }

    #[test]
    fn test_import_single_malformed_raises() {
        let (importer, store) = importer();
        let err = importer.import_single("not a link", "").unwrap_err();
        assert!(matches!(err, ImportError::Decode(_)));
        assert_eq!(store.count_servers().unwrap(), 0);
    }

    #[test]
    fn test_import_single_ok() {
        let (importer, store) = importer();
        let count = importer
            .import_single("vless://u9@z.example.com:443#manual", "")
            .unwrap();
        assert_eq!(count, 1);

        let servers = store.servers().unwrap();
        assert_eq!(servers[0].config.subscription_id, "");
    }
}
