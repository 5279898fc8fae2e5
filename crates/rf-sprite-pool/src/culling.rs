//! Render groups with viewport culling
//!
//! Groups track pooled handles by id. A tick walks the dirty groups that
//! are due and toggles visibility through [`RenderHandle`], so handles stay
//! plain data and carry no per-frame hooks of their own.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};
use crate::handle::{Bounds, RenderHandle};
use crate::pool::{HandleId, ResourcePool};

/// Padding added around the viewport on every side
pub const CULLING_PADDING: f32 = 100.0;

/// Frames between sweeps of inactive group members
pub const GC_INTERVAL_FRAMES: u64 = 300;

const FPS_SMOOTHING: f64 = 0.9;
const INITIAL_FPS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOptions {
    /// Process every n-th frame (0 is treated as 1)
    pub update_frequency: u32,
    pub enable_culling: bool,
    /// Processed whenever dirty, regardless of frequency
    pub static_content: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            update_frequency: 1,
            enable_culling: true,
            static_content: false,
        }
    }
}

#[derive(Debug)]
struct RenderGroup {
    options: GroupOptions,
    members: BTreeSet<HandleId>,
    dirty: bool,
}

impl RenderGroup {
    fn is_due(&self, frame: u64) -> bool {
        let frequency = u64::from(self.options.update_frequency.max(1));
        self.options.static_content || frame % frequency == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderMetrics {
    /// Handles hidden by culling since creation
    pub culled: u64,
    pub frame_count: u64,
    pub render_groups: usize,
    /// Members across all groups
    pub tracked_handles: usize,
    pub average_fps: f64,
}

pub struct RenderOptimizer {
    region: Bounds,
    groups: BTreeMap<String, RenderGroup>,
    frame_count: u64,
    culled: u64,
    average_fps: f64,
}

impl RenderOptimizer {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let mut optimizer = Self {
            region: Bounds::default(),
            groups: BTreeMap::new(),
            frame_count: 0,
            culled: 0,
            average_fps: INITIAL_FPS,
        };
        optimizer.set_viewport(viewport_width, viewport_height);
        optimizer
    }

    /// Recompute the culling region after a resize
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.region = Bounds::new(0.0, 0.0, width, height).padded(CULLING_PADDING);
        for group in self.groups.values_mut() {
            group.dirty = true;
        }
        log::debug!("Culling region set to {:?}", self.region);
    }

    pub fn culling_region(&self) -> Bounds {
        self.region
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // GROUPS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Register a group; an existing group of the same name is replaced
    pub fn create_render_group(&mut self, name: &str, options: GroupOptions) {
        self.groups.insert(
            name.to_string(),
            RenderGroup {
                options,
                members: BTreeSet::new(),
                dirty: true,
            },
        );
        log::info!("Created render group '{name}'");
    }

    pub fn add_to_group(&mut self, name: &str, id: HandleId) -> Result<()> {
        let group = self.group_mut(name)?;
        group.members.insert(id);
        group.dirty = true;
        Ok(())
    }

    /// Returns whether the handle was a member
    pub fn remove_from_group(&mut self, name: &str, id: HandleId) -> Result<bool> {
        let group = self.group_mut(name)?;
        let removed = group.members.remove(&id);
        group.dirty = true;
        Ok(removed)
    }

    pub fn mark_group_dirty(&mut self, name: &str) -> Result<()> {
        self.group_mut(name)?.dirty = true;
        Ok(())
    }

    pub fn group_members(&self, name: &str) -> Result<Vec<HandleId>> {
        self.groups
            .get(name)
            .map(|group| group.members.iter().copied().collect())
            .ok_or_else(|| PoolError::UnknownGroup(name.to_string()))
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut RenderGroup> {
        self.groups
            .get_mut(name)
            .ok_or_else(|| PoolError::UnknownGroup(name.to_string()))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FRAME
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance one frame: cull due dirty groups, sweep periodically
    pub fn tick<T: RenderHandle>(&mut self, pool: &mut ResourcePool<T>) {
        self.frame_count += 1;
        let frame = self.frame_count;

        for group in self.groups.values_mut() {
            if !group.dirty || !group.is_due(frame) {
                continue;
            }
            if group.options.enable_culling {
                self.culled += cull_group(&self.region, group, pool);
            }
            group.dirty = false;
        }

        if frame % GC_INTERVAL_FRAMES == 0 {
            self.collect_inactive(pool);
        }
    }

    /// Drop group members that are no longer active in any pool
    pub fn collect_inactive<T: RenderHandle>(&mut self, pool: &ResourcePool<T>) -> usize {
        let mut dropped = 0;
        for group in self.groups.values_mut() {
            let before = group.members.len();
            group.members.retain(|&id| pool.is_active_anywhere(id));
            dropped += before - group.members.len();
        }
        if dropped > 0 {
            log::debug!("Dropped {dropped} inactive handles from render groups");
        }
        dropped
    }

    /// Fold one frame duration into the smoothed FPS
    pub fn record_frame_time(&mut self, delta: Duration) {
        let seconds = delta.as_secs_f64();
        if seconds > 0.0 {
            let fps = 1.0 / seconds;
            self.average_fps = self.average_fps * FPS_SMOOTHING + fps * (1.0 - FPS_SMOOTHING);
        }
    }

    pub fn metrics(&self) -> RenderMetrics {
        RenderMetrics {
            culled: self.culled,
            frame_count: self.frame_count,
            render_groups: self.groups.len(),
            tracked_handles: self.groups.values().map(|g| g.members.len()).sum(),
            average_fps: self.average_fps,
        }
    }
}

/// Returns how many handles went from visible to hidden
fn cull_group<T: RenderHandle>(
    region: &Bounds,
    group: &RenderGroup,
    pool: &mut ResourcePool<T>,
) -> u64 {
    let mut culled = 0;
    for &id in &group.members {
        if !pool.is_active_anywhere(id) {
            continue;
        }
        let Some(handle) = pool.find_handle_mut(id) else {
            continue;
        };

        let visible = handle
            .compute_bounds()
            .is_none_or(|bounds| region.intersects(&bounds));
        if handle.is_visible() != visible {
            handle.set_visible(visible);
            if !visible {
                culled += 1;
            }
        }
    }
    culled
}
