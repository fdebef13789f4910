//! LMDB-backed preference store.
//!
//! Uses the heed crate (Rust bindings for LMDB) for the durable key-value
//! namespace holding initializer state. Each put runs in its own write
//! transaction and is committed before returning, which gives the durable
//! commit the preference contract requires.

use std::path::Path;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use crate::PreferenceStore;
use oti_core::{StorageError, PREFS_NAMESPACE};

/// Size of the memory map. Preferences hold a handful of small integers.
const MAP_SIZE_BYTES: usize = 1024 * 1024;

fn backend_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Backend {
        reason: e.to_string(),
    }
}

/// Durable preference store backed by LMDB, named database `"oti"`.
///
/// Opened once at component startup and shared for the component's lifetime.
pub struct LmdbPreferenceStore {
    env: Env,
    db: Database<Str, Bytes>,
}

impl LmdbPreferenceStore {
    /// Open (creating if needed) the preference environment at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&path).map_err(backend_err)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(MAP_SIZE_BYTES)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(backend_err)?;

        let mut wtxn = env.write_txn().map_err(backend_err)?;
        let db: Database<Str, Bytes> = env
            .create_database(&mut wtxn, Some(PREFS_NAMESPACE))
            .map_err(backend_err)?;
        wtxn.commit().map_err(backend_err)?;

        Ok(Self { env, db })
    }
}

impl PreferenceStore for LmdbPreferenceStore {
    fn get_u32(&self, key: &str) -> Result<Option<u32>, StorageError> {
        let rtxn = self.env.read_txn().map_err(backend_err)?;
        let raw = self.db.get(&rtxn, key).map_err(backend_err)?;
        match raw {
            None => Ok(None),
            Some(bytes) => {
                let bytes: [u8; 4] =
                    bytes
                        .try_into()
                        .map_err(|_| StorageError::InvalidValue {
                            key: key.to_string(),
                            reason: "expected 4 little-endian bytes".to_string(),
                        })?;
                Ok(Some(u32::from_le_bytes(bytes)))
            }
        }
    }

    fn put_u32(&self, key: &str, value: u32) -> Result<(), StorageError> {
        let mut wtxn = self.env.write_txn().map_err(backend_err)?;
        self.db
            .put(&mut wtxn, key, &value.to_le_bytes())
            .map_err(backend_err)?;
        wtxn.commit().map_err(backend_err)
    }
}
