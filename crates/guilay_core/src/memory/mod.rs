//! # Memory Management
//!
//! Owning, growable storage with a strong failure guarantee.
//!
//! ## Design Philosophy
//!
//! A failed growth never leaves a list half-updated:
//! - Capacity is reserved fallibly before anything is touched
//! - The slot count only changes once the reservation succeeded
//! - Shrinking hands the dropped entries back to the caller for teardown

mod slot_list;

pub use slot_list::{SlotList, SlotListError};
