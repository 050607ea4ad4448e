//! # Discretization Cache
//!
//! Maps node identity to the last produced explicit model. Only named nodes
//! are stored; values are shared `Arc`s and must be treated as immutable by
//! every holder.

use std::collections::HashMap;
use std::sync::Arc;

use sylva_scene::{ExplicitModel, NodeId};

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Total entries stored.
    pub stored: u64,
}

impl CacheStats {
    /// Computes the hit rate (0.0 to 1.0), or 0.0 without accesses.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Identity-keyed model cache.
///
/// The key is the node id, not structural content: correct as long as nodes
/// stay immutable during traversals. Invalidation is explicit via
/// [`ModelCache::clear`].
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: HashMap<NodeId, Arc<ExplicitModel>>,
    stats: CacheStats,
}

impl ModelCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a model by node id.
    ///
    /// A stored entry that is unexpectedly empty is reported and treated as
    /// a miss, so the caller falls through to recomputation.
    pub fn lookup(&mut self, id: NodeId) -> Option<Arc<ExplicitModel>> {
        match self.entries.get(&id) {
            Some(model) if model.is_empty() => {
                log::warn!("cache entry for node {} is empty, recomputing", id.value());
                self.stats.misses += 1;
                None
            }
            Some(model) => {
                self.stats.hits += 1;
                Some(Arc::clone(model))
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Looks up a model that must already carry texture coordinates.
    ///
    /// Used when UV synthesis is enabled: an entry computed without UVs is
    /// rejected so the kernel re-runs.
    pub fn lookup_with_tex(&mut self, id: NodeId) -> Option<Arc<ExplicitModel>> {
        let has_tex = self
            .entries
            .get(&id)
            .is_some_and(|model| model.has_tex_coords());
        if has_tex {
            self.lookup(id)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Stores a model under a node id.
    pub fn store(&mut self, id: NodeId, model: Arc<ExplicitModel>) {
        self.stats.stored += 1;
        self.entries.insert(id, model);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec2, DVec3};
    use sylva_scene::{NodeKind, SceneNode, Topology};

    fn test_model() -> Arc<ExplicitModel> {
        Arc::new(ExplicitModel::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::Y],
            Topology::Triangles(vec![[0, 1, 2]]),
        ))
    }

    fn fresh_id() -> NodeId {
        SceneNode::new(NodeKind::Material).id()
    }

    #[test]
    fn test_lookup_miss_then_hit() {
        let mut cache = ModelCache::new();
        let id = fresh_id();
        assert!(cache.lookup(id).is_none());
        cache.store(id, test_model());
        let hit = cache.lookup(id).unwrap();
        assert_eq!(hit.point_count(), 3);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_lookup_returns_same_reference() {
        let mut cache = ModelCache::new();
        let id = fresh_id();
        let model = test_model();
        cache.store(id, Arc::clone(&model));
        let hit = cache.lookup(id).unwrap();
        assert!(Arc::ptr_eq(&hit, &model));
    }

    #[test]
    fn test_empty_entry_is_treated_as_miss() {
        let mut cache = ModelCache::new();
        let id = fresh_id();
        cache.store(id, Arc::new(ExplicitModel::empty()));
        assert!(cache.lookup(id).is_none());
    }

    #[test]
    fn test_lookup_with_tex_rejects_plain_entry() {
        let mut cache = ModelCache::new();
        let id = fresh_id();
        cache.store(id, test_model());
        assert!(cache.lookup_with_tex(id).is_none());

        let mut textured = (*test_model()).clone();
        textured.tex_coords = Some(vec![DVec2::ZERO; 3]);
        cache.store(id, Arc::new(textured));
        assert!(cache.lookup_with_tex(id).is_some());
    }

    #[test]
    fn test_clear() {
        let mut cache = ModelCache::new();
        let id = fresh_id();
        cache.store(id, test_model());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
