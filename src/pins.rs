//! GPIO pin assignments for the greenhouse node board.
//!
//! Single source of truth — configuration defaults reference this module
//! rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Irrigation pump (relay / MOSFET gate)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = pump energised.
pub const PUMP0_GPIO: i32 = 2;
/// Logical index of the pump on this board.
pub const PUMP0_INDEX: u8 = 0;
