//! folio-slash: the `/` command subsystem.
//!
//! This crate provides:
//! - `can_trigger` / `trigger_query` - the trigger grammar as a pure
//!   predicate over a state snapshot
//! - `SlashItem` and the built-in palette
//! - `SlashMenu` - the open/filter/commit state machine
//! - `anchor_menu` - viewport-aware menu placement

pub mod item;
pub mod menu;
pub mod position;
pub mod trigger;

pub use item::{DEFAULT_ITEMS, SlashItem};
pub use menu::{DEFAULT_SCORE_THRESHOLD, SlashMenu};
pub use position::{Point, Rect, Size, anchor_menu};
pub use trigger::{TriggerRange, can_trigger, trigger_query};
