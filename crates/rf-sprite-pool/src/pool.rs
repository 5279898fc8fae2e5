//! Named pools of reusable render handles
//!
//! Each pool owns its handles outright and hands out [`HandleId`]s. A handle
//! is in exactly one of the pool's `available` or `active` sets until it is
//! destroyed, so `available + active == total_created` at all times.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};
use crate::handle::RenderHandle;
use crate::policy::{CapacityPolicy, ceiling_for};

/// Identifier of a pooled handle, unique within one [`ResourcePool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandleId(u64);

impl HandleId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a `get_sprite` call was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquireSource {
    /// Popped from the available set
    Reused,
    /// Freshly created below the ceiling (or in an unbounded pool)
    Created,
    /// Created past the ceiling under `SoftCapWithWarning`
    OverCeiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    pub id: HandleId,
    pub source: AcquireSource,
}

/// Snapshot of one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub name: String,
    pub available: usize,
    pub active: usize,
    pub total_created: usize,
    pub max_size: usize,
}

/// Lifetime counters across every pool
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoolStats {
    /// Handles created on demand by `get_sprite` (eager fills excluded)
    pub created: u64,
    pub reused: u64,
    pub returned: u64,
    /// Acquisitions served past a soft ceiling
    pub ceiling_warnings: u64,
}

impl PoolStats {
    /// Share of acquisitions served by reuse, in percent
    pub fn efficiency(&self) -> f64 {
        let acquisitions = self.created + self.reused;
        if acquisitions == 0 {
            return 0.0;
        }
        self.reused as f64 / acquisitions as f64 * 100.0
    }
}

type Factory<T> = Box<dyn FnMut() -> T>;

struct Pool<T> {
    handles: HashMap<HandleId, T>,
    available: Vec<HandleId>,
    active: BTreeSet<HandleId>,
    factory: Factory<T>,
    total_created: usize,
    max_size: usize,
    policy: CapacityPolicy,
}

impl<T: RenderHandle> Pool<T> {
    fn spawn(&mut self, next_id: &mut u64) -> HandleId {
        let id = HandleId(*next_id);
        *next_id += 1;
        let mut handle = (self.factory)();
        handle.set_visible(false);
        self.handles.insert(id, handle);
        self.total_created += 1;
        id
    }

    fn destroy(&mut self, id: HandleId) {
        if let Some(mut handle) = self.handles.remove(&id) {
            handle.destroy();
        }
    }
}

/// Registry of named render-handle pools
pub struct ResourcePool<T: RenderHandle> {
    pools: BTreeMap<String, Pool<T>>,
    next_id: u64,
    stats: PoolStats,
}

impl<T: RenderHandle> ResourcePool<T> {
    pub fn new() -> Self {
        Self {
            pools: BTreeMap::new(),
            next_id: 0,
            stats: PoolStats::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POOL LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Create a soft-capped pool, filled eagerly with `initial_size` hidden handles
    ///
    /// Returns `false` (and leaves the existing pool untouched) if `name`
    /// is already taken.
    pub fn create_pool(
        &mut self,
        name: &str,
        factory: impl FnMut() -> T + 'static,
        initial_size: usize,
    ) -> bool {
        self.create_pool_with_policy(name, factory, initial_size, CapacityPolicy::default())
    }

    pub fn create_pool_with_policy(
        &mut self,
        name: &str,
        factory: impl FnMut() -> T + 'static,
        initial_size: usize,
        policy: CapacityPolicy,
    ) -> bool {
        if self.pools.contains_key(name) {
            log::warn!("Pool '{name}' already exists");
            return false;
        }

        let mut pool = Pool {
            handles: HashMap::with_capacity(initial_size),
            available: Vec::with_capacity(initial_size),
            active: BTreeSet::new(),
            factory: Box::new(factory),
            total_created: 0,
            max_size: ceiling_for(initial_size),
            policy,
        };

        for _ in 0..initial_size {
            let id = pool.spawn(&mut self.next_id);
            pool.available.push(id);
        }

        self.pools.insert(name.to_string(), pool);
        log::info!("Created sprite pool '{name}' with {initial_size} sprites");
        true
    }

    /// Return every active handle, destroy all handles, drop the pool
    pub fn clear_pool(&mut self, name: &str) -> Result<()> {
        self.return_all_sprites(name)?;

        let mut pool = self
            .pools
            .remove(name)
            .ok_or_else(|| PoolError::UnknownPool(name.to_string()))?;
        for id in std::mem::take(&mut pool.available) {
            pool.destroy(id);
        }

        log::info!("Cleared sprite pool '{name}'");
        Ok(())
    }

    pub fn clear_all_pools(&mut self) {
        let names: Vec<String> = self.pools.keys().cloned().collect();
        for name in names {
            // Names come from the map itself
            let _ = self.clear_pool(&name);
        }
    }

    /// Shrink the available set to `max(5, ceil(1.5 × active))`
    ///
    /// Returns how many handles were destroyed.
    pub fn optimize_pool(&mut self, name: &str) -> Result<usize> {
        let pool = self.pool_mut(name)?;
        let target = 5.max((pool.active.len() as f64 * 1.5).ceil() as usize);

        if pool.available.len() <= target {
            return Ok(0);
        }

        let surplus = pool.available.split_off(target);
        for &id in &surplus {
            pool.destroy(id);
        }
        pool.total_created -= surplus.len();

        log::info!(
            "Optimized pool '{name}': removed {} unused sprites",
            surplus.len()
        );
        Ok(surplus.len())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACQUIRE / RELEASE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Take a handle, reusing before creating; the handle comes back visible
    pub fn get_sprite(&mut self, name: &str) -> Result<Acquired> {
        let pool = self
            .pools
            .get_mut(name)
            .ok_or_else(|| PoolError::UnknownPool(name.to_string()))?;

        let (id, source) = if let Some(id) = pool.available.pop() {
            self.stats.reused += 1;
            (id, AcquireSource::Reused)
        } else if pool.total_created < pool.max_size {
            self.stats.created += 1;
            (pool.spawn(&mut self.next_id), AcquireSource::Created)
        } else {
            match pool.policy {
                CapacityPolicy::HardCap => {
                    return Err(PoolError::Exhausted {
                        pool: name.to_string(),
                        max_size: pool.max_size,
                    });
                }
                CapacityPolicy::SoftCapWithWarning => {
                    log::warn!(
                        "Pool '{name}' has reached maximum size ({})",
                        pool.max_size
                    );
                    self.stats.created += 1;
                    self.stats.ceiling_warnings += 1;
                    (pool.spawn(&mut self.next_id), AcquireSource::OverCeiling)
                }
                CapacityPolicy::Unbounded => {
                    self.stats.created += 1;
                    (pool.spawn(&mut self.next_id), AcquireSource::Created)
                }
            }
        };

        if let Some(handle) = pool.handles.get_mut(&id) {
            handle.set_visible(true);
        }
        pool.active.insert(id);

        Ok(Acquired { id, source })
    }

    /// Reset a handle and move it back to the available set
    ///
    /// Returns `false` with a warning if the handle is not active in this pool.
    pub fn return_sprite(&mut self, name: &str, id: HandleId) -> Result<bool> {
        let pool = self
            .pools
            .get_mut(name)
            .ok_or_else(|| PoolError::UnknownPool(name.to_string()))?;

        if !pool.active.remove(&id) {
            log::warn!("Sprite {id} not found in active set for pool '{name}'");
            return Ok(false);
        }

        if let Some(handle) = pool.handles.get_mut(&id) {
            handle.reset_visual_state();
            handle.set_visible(false);
        }
        pool.available.push(id);
        self.stats.returned += 1;
        Ok(true)
    }

    /// Return every active handle of a pool; yields how many were returned
    pub fn return_all_sprites(&mut self, name: &str) -> Result<usize> {
        let active: Vec<HandleId> = self.pool(name)?.active.iter().copied().collect();
        for &id in &active {
            self.return_sprite(name, id)?;
        }
        Ok(active.len())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn handle(&self, name: &str, id: HandleId) -> Option<&T> {
        self.pools.get(name)?.handles.get(&id)
    }

    pub fn handle_mut(&mut self, name: &str, id: HandleId) -> Option<&mut T> {
        self.pools.get_mut(name)?.handles.get_mut(&id)
    }

    /// Look a handle up without knowing its pool
    pub fn find_handle_mut(&mut self, id: HandleId) -> Option<&mut T> {
        self.pools
            .values_mut()
            .find_map(|pool| pool.handles.get_mut(&id))
    }

    pub fn is_active(&self, name: &str, id: HandleId) -> bool {
        self.pools
            .get(name)
            .is_some_and(|pool| pool.active.contains(&id))
    }

    /// Active in any pool
    pub fn is_active_anywhere(&self, id: HandleId) -> bool {
        self.pools.values().any(|pool| pool.active.contains(&id))
    }

    pub fn active_handles(&self, name: &str) -> Result<Vec<HandleId>> {
        Ok(self.pool(name)?.active.iter().copied().collect())
    }

    pub fn has_pool(&self, name: &str) -> bool {
        self.pools.contains_key(name)
    }

    pub fn pool_names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATISTICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn pool_info(&self, name: &str) -> Result<PoolInfo> {
        let pool = self.pool(name)?;
        Ok(PoolInfo {
            name: name.to_string(),
            available: pool.available.len(),
            active: pool.active.len(),
            total_created: pool.total_created,
            max_size: pool.max_size,
        })
    }

    /// Info for every pool, ordered by name
    pub fn all_pools_info(&self) -> Vec<PoolInfo> {
        self.pools
            .iter()
            .map(|(name, pool)| PoolInfo {
                name: name.clone(),
                available: pool.available.len(),
                active: pool.active.len(),
                total_created: pool.total_created,
                max_size: pool.max_size,
            })
            .collect()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    fn pool(&self, name: &str) -> Result<&Pool<T>> {
        self.pools
            .get(name)
            .ok_or_else(|| PoolError::UnknownPool(name.to_string()))
    }

    fn pool_mut(&mut self, name: &str) -> Result<&mut Pool<T>> {
        self.pools
            .get_mut(name)
            .ok_or_else(|| PoolError::UnknownPool(name.to_string()))
    }
}

impl<T: RenderHandle> Default for ResourcePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::handle::{Bounds, Sprite};

    fn sprite_pool(size: usize) -> ResourcePool<Sprite> {
        let mut pool = ResourcePool::new();
        assert!(pool.create_pool("symbols", || Sprite::new(100.0, 100.0), size));
        pool
    }

    /// Counts destroy calls
    struct Tracked {
        visible: bool,
        destroyed: Rc<Cell<usize>>,
    }

    impl RenderHandle for Tracked {
        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }
        fn is_visible(&self) -> bool {
            self.visible
        }
        fn reset_visual_state(&mut self) {
            self.visible = false;
        }
        fn compute_bounds(&self) -> Option<Bounds> {
            None
        }
        fn destroy(&mut self) {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }

    #[test]
    fn test_create_fills_hidden() {
        let pool = sprite_pool(15);
        let info = pool.pool_info("symbols").unwrap();
        assert_eq!(info.available, 15);
        assert_eq!(info.active, 0);
        assert_eq!(info.total_created, 15);
        assert_eq!(info.max_size, 30);
        assert_eq!(pool.stats(), PoolStats::default());
    }

    #[test]
    fn test_duplicate_create_is_noop() {
        let mut pool = sprite_pool(3);
        assert!(!pool.create_pool("symbols", || Sprite::new(1.0, 1.0), 10));
        let info = pool.pool_info("symbols").unwrap();
        assert_eq!(info.total_created, 3);
        assert_eq!(info.max_size, 6);
    }

    #[test]
    fn test_get_marks_visible_and_active() {
        let mut pool = sprite_pool(2);
        let acquired = pool.get_sprite("symbols").unwrap();
        assert_eq!(acquired.source, AcquireSource::Reused);
        assert!(pool.is_active("symbols", acquired.id));
        assert!(pool.handle("symbols", acquired.id).unwrap().is_visible());
    }

    #[test]
    fn test_return_resets_state() {
        let mut pool = sprite_pool(1);
        let id = pool.get_sprite("symbols").unwrap().id;
        {
            let sprite = pool.handle_mut("symbols", id).unwrap();
            sprite.set_position(50.0, 60.0);
            sprite.set_texture("hv2_symbol");
            sprite.state.alpha = 0.5;
        }

        assert!(pool.return_sprite("symbols", id).unwrap());
        let sprite = pool.handle("symbols", id).unwrap();
        assert!(!sprite.is_visible());
        assert_eq!(sprite.state.x, 0.0);
        assert!(sprite.state.texture.is_none());
        assert_eq!(sprite.state.alpha, 1.0);
        assert_eq!(pool.stats().returned, 1);
    }

    #[test]
    fn test_return_inactive_warns_only() {
        let mut pool = sprite_pool(1);
        let id = pool.get_sprite("symbols").unwrap().id;
        assert!(pool.return_sprite("symbols", id).unwrap());
        assert!(!pool.return_sprite("symbols", id).unwrap());
        assert_eq!(pool.stats().returned, 1);
        assert_eq!(pool.pool_info("symbols").unwrap().available, 1);
    }

    #[test]
    fn test_unknown_pool() {
        let mut pool = sprite_pool(1);
        let id = pool.get_sprite("symbols").unwrap().id;
        let unknown = PoolError::UnknownPool("effects".to_string());

        assert_eq!(pool.get_sprite("effects").unwrap_err(), unknown);
        assert_eq!(pool.return_sprite("effects", id).unwrap_err(), unknown);
        assert_eq!(pool.return_all_sprites("effects").unwrap_err(), unknown);
        assert_eq!(pool.pool_info("effects").unwrap_err(), unknown);
        assert_eq!(pool.clear_pool("effects").unwrap_err(), unknown);
        assert_eq!(pool.optimize_pool("effects").unwrap_err(), unknown);
    }

    #[test]
    fn test_clear_destroys_everything() {
        let destroyed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&destroyed);
        let mut pool = ResourcePool::new();
        pool.create_pool(
            "effects",
            move || Tracked {
                visible: true,
                destroyed: Rc::clone(&counter),
            },
            4,
        );
        pool.get_sprite("effects").unwrap();
        pool.get_sprite("effects").unwrap();

        pool.clear_pool("effects").unwrap();
        assert_eq!(destroyed.get(), 4);
        assert!(!pool.has_pool("effects"));
        assert_eq!(pool.stats().returned, 2);
    }

    #[test]
    fn test_optimize_trims_to_target() {
        let mut pool = sprite_pool(20);
        let held: Vec<_> = (0..4).map(|_| pool.get_sprite("symbols").unwrap().id).collect();

        // 4 active → target max(5, 6) = 6; 16 available → 10 removed
        assert_eq!(pool.optimize_pool("symbols").unwrap(), 10);
        let info = pool.pool_info("symbols").unwrap();
        assert_eq!(info.available, 6);
        assert_eq!(info.active, 4);
        assert_eq!(info.total_created, 10);
        assert!(held.iter().all(|&id| pool.is_active("symbols", id)));

        assert_eq!(pool.optimize_pool("symbols").unwrap(), 0);
    }

    #[test]
    fn test_optimize_keeps_minimum_of_five() {
        let mut pool = sprite_pool(8);
        assert_eq!(pool.optimize_pool("symbols").unwrap(), 3);
        assert_eq!(pool.pool_info("symbols").unwrap().available, 5);
    }

    #[test]
    fn test_efficiency() {
        let mut pool = sprite_pool(1);
        assert_eq!(pool.stats().efficiency(), 0.0);

        let a = pool.get_sprite("symbols").unwrap().id; // reused
        pool.get_sprite("symbols").unwrap(); // created
        pool.return_sprite("symbols", a).unwrap();
        pool.get_sprite("symbols").unwrap(); // reused
        pool.get_sprite("symbols").unwrap(); // soft ceiling, created

        let stats = pool.stats();
        assert_eq!(stats.reused, 2);
        assert_eq!(stats.created, 2);
        assert_eq!(stats.efficiency(), 50.0);
    }

    #[test]
    fn test_handle_ids_unique_across_pools() {
        let mut pool = sprite_pool(2);
        pool.create_pool("effects", || Sprite::new(10.0, 10.0), 2);
        let a = pool.get_sprite("symbols").unwrap().id;
        let b = pool.get_sprite("effects").unwrap().id;
        assert_ne!(a, b);

        // Returning to the wrong pool is a warning, not a transfer
        assert!(!pool.return_sprite("effects", a).unwrap());
        assert!(pool.is_active("symbols", a));
        assert!(pool.is_active_anywhere(b));
        assert!(pool.find_handle_mut(b).is_some());
    }

    #[test]
    fn test_all_pools_info_sorted() {
        let mut pool = sprite_pool(15);
        pool.create_pool("effects", || Sprite::new(10.0, 10.0), 10);
        let names: Vec<String> = pool.all_pools_info().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["effects", "symbols"]);

        pool.clear_all_pools();
        assert!(pool.all_pools_info().is_empty());
    }
}
