//! # rf-slot-core — Reel engine and payline evaluation
//!
//! The gameplay core of the ReelForge slot mini-game. Reel bands are
//! rings; a spin picks one offset per ring; the visible grid is a window of
//! `rows` consecutive stops per column; paylines are walked left to right
//! and priced from a pay table.
//!
//! ## Architecture
//!
//! ```text
//! SlotConfig (bands, pay table, paylines, grid)
//!     │
//!     ├── ReelEngine ──► SymbolGrid
//!     │                     │
//!     └── PayoutEvaluator ◄─┘──► WinResult ──► format_win_display
//!
//! SlotMachine = ReelEngine + PayoutEvaluator + EventSink
//! PerformanceMonitor: EventSink + frame/rendering metrics
//! ```
//!
//! Rendering, asset decoding and sprite pooling live outside this crate;
//! see `rf-sprite-pool` for render-handle reuse.

pub mod assets;
pub mod config;
pub mod error;
pub mod events;
pub mod machine;
pub mod monitor;
pub mod paytable;
pub mod reels;
pub mod symbols;

pub use assets::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use machine::*;
pub use monitor::*;
pub use paytable::*;
pub use reels::*;
pub use symbols::*;
