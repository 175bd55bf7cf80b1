#![forbid(unsafe_code)]

//! Widgets for popkit.

pub mod popover;
