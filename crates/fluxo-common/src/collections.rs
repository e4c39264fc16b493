//! Hash-collection aliases used throughout fluxo.
//!
//! Id-keyed maps and sets dominate the engine's hot paths (layer
//! deduplication, relabeling, flow construction), so everything hashes with
//! FxHash instead of the DoS-resistant default.

use rustc_hash::FxBuildHasher;

/// Hash map with FxHash (fast, non-cryptographic).
pub type FxHashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Hash set with FxHash.
pub type FxHashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;
