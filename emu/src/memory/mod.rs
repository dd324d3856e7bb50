//! # Memory
//!
//! A single flat, byte addressable array starting at address 0. There are no
//! memory mapped devices, mirrors or wait states: every address below the
//! capacity is plain RAM and everything above it faults.

pub mod internal_memory;
