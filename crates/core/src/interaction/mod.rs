//! Keeps the timeline highlight and the gallery strip in sync.
//!
//! ```text
//!   host (DOM / terminal)
//!     │ measured card geometry ──▶ GeometryRegistry
//!     │ scroll / frame / click ──▶ SelectionCoordinator ──▶ SelectionState
//!     ◀──────────────────────────────── ScrollCommand      (highlight, expansion)
//! ```
//!
//! The coordinator never looks at a real scroll container. Programmatic
//! scrolls are told apart from user gestures by the [`SettleDetector`]
//! guard, which the host drives once per animation frame.

pub mod coordinator;
pub mod geometry;
pub mod settle;

pub use coordinator::{Reaction, SelectionCoordinator};
pub use geometry::{GeometryRegistry, ItemGeometry};
pub use settle::{SettleDetector, SettleStatus};
