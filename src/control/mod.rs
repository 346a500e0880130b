//! Control policy: rule evaluation, duty cycling and change debouncing.
//!
//! Everything here is pure and clock-agnostic; callers pass `now_ms`.

pub mod cycling;
pub mod debounce;
pub mod rules;
