//! Application core: pure domain logic, zero I/O.
//!
//! Sensing, location simulation, publishing and display decisions live
//! here.  All interaction with hardware and the network happens through
//! the **port traits** in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod context;
pub mod events;
pub mod ports;
pub mod service;
