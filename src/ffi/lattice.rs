//! Lattice size, serialization and capacity queries.

use std::ptr;

use crate::lattice::{self, Lattice};

use super::{ffi_close, owned_new, write_capacity_checked};

ffi_close!(lattice_close, Lattice);

/// Total node count, 0 if `lattice` is null.
#[no_mangle]
pub extern "C" fn lattice_size(lattice: *const Lattice) -> u64 {
    if lattice.is_null() {
        return 0;
    }
    unsafe { &*lattice }.size() as u64
}

/// Total edge count — the capacity a caller must provide to the
/// search-index or KMP-result getters in this module's sibling modules.
#[no_mangle]
pub extern "C" fn lattice_required_capacity(lattice: *const Lattice) -> u64 {
    if lattice.is_null() {
        return 0;
    }
    unsafe { &*lattice }.required_capacity() as u64
}

/// Bytes `lattice_to_bytes` needs to write the full encoding.
#[no_mangle]
pub extern "C" fn lattice_encoded_size(lattice: *const Lattice) -> u64 {
    if lattice.is_null() {
        return 0;
    }
    lattice::serialize::encoded_size(unsafe { &*lattice }) as u64
}

/// Encode `lattice` into `out` (capacity `capacity` bytes). Always returns
/// the number of bytes the encoding needs; writes nothing if `capacity` is
/// too small, so callers query-then-fill exactly like every other
/// variable-length result in this ABI.
#[no_mangle]
pub extern "C" fn lattice_to_bytes(lattice: *const Lattice, out: *mut u8, capacity: u64) -> u64 {
    if lattice.is_null() {
        return 0;
    }
    let bytes = lattice::serialize::to_bytes(unsafe { &*lattice });
    unsafe { write_capacity_checked(&bytes, out, capacity) }
}

/// Decode a buffer produced by `lattice_to_bytes`. Null on a malformed or
/// invariant-violating buffer.
#[no_mangle]
pub extern "C" fn lattice_from_bytes(buf: *const u8, len: u64) -> *mut Lattice {
    if buf.is_null() {
        return ptr::null_mut();
    }
    let slice = unsafe { std::slice::from_raw_parts(buf, len as usize) };
    match lattice::serialize::from_bytes(slice) {
        Ok(lat) => owned_new(lat),
        Err(_) => ptr::null_mut(),
    }
}
