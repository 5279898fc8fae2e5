//! # rf-sprite-pool — Render-handle reuse and culling
//!
//! Named pools of reusable draw objects. A pool is filled eagerly with
//! hidden handles, hands them out by [`HandleId`] and takes them back after
//! resetting their visual state. Past its ceiling (twice the initial size)
//! a pool follows its [`CapacityPolicy`].
//!
//! ```text
//! ResourcePool<T: RenderHandle>
//!     ├── "symbols" ── available ⇄ active
//!     └── "effects" ── available ⇄ active
//!
//! RenderOptimizer ── groups of HandleId ──► set_visible(region ∩ bounds)
//! ```

pub mod culling;
pub mod error;
pub mod handle;
pub mod policy;
pub mod pool;

pub use culling::{
    CULLING_PADDING, GC_INTERVAL_FRAMES, GroupOptions, RenderMetrics, RenderOptimizer,
};
pub use error::{PoolError, Result};
pub use handle::{Bounds, NO_TINT, RenderHandle, Sprite, VisualState};
pub use policy::{CapacityPolicy, ceiling_for};
pub use pool::{AcquireSource, Acquired, HandleId, PoolInfo, PoolStats, ResourcePool};
