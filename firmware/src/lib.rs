//! Reference firmware: a small flight HUD on top of the overlay driver.
//!
//! The composer is hardware-independent; on the host, `sim` runs it through
//! the real timing controller with a software scanline peripheral.

#![cfg_attr(target_os = "none", no_std)]

pub mod hud;

#[cfg(not(target_os = "none"))]
pub mod sim;
