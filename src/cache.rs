//! Persisted TTL cache for remote responses
//!
//! Serves previously fetched values until their expiry timestamp so repeated
//! searches do not hit the network. Entries survive process restarts when
//! backed by a [`FileStore`].

mod store;
mod ttl_cache;

pub use store::{CacheStore, FileStore, MemoryStore};
pub use ttl_cache::{CacheEntry, CacheError, TtlCache};
