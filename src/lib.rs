// FFI functions perform null checks before dereferencing raw pointers.
// Clippy cannot verify this statically, so we allow it at crate level.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

pub mod dict;
pub mod error;
mod ffi;
pub mod kmp;
pub mod lattice;
#[cfg(test)]
mod scenario_tests;
pub mod trace_init;

pub use ffi::*;
