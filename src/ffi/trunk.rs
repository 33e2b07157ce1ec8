//! Trunk-span queries.
//!
//! Like `ffi::kmp`'s match list, a rewritten path crosses the boundary as
//! an opaque handle with capacity-checked per-field getters rather than a
//! `repr(C)` struct array — its only variable-length field is the edge
//! label text. The input path crosses as JSON (`[["", 1], ["stem", 4]]`,
//! an empty label for the start step), the same convention `ffi::parattice`
//! and `ffi::kmp` use for dictionary and pattern input.

use std::ffi::c_char;
use std::ptr;

use crate::lattice::{self, Lattice, NodeId, PathStep};

use super::{cptr_to_str, ffi_close, owned_new, write_capacity_checked};

pub struct TrunkSpanPath(Vec<PathStep>);

fn parse_path(json: &str) -> Option<Vec<PathStep>> {
    let raw: Vec<(String, u32)> = serde_json::from_str(json).ok()?;
    Some(
        raw.into_iter()
            .map(|(label, node)| PathStep::new(label.into_bytes(), NodeId(node)))
            .collect(),
    )
}

/// Rewrite `path_json` (a JSON array of `[label, node_id]` steps, first
/// label empty) into the trunk-projected canonical path spanning it (§4.3).
/// Null if `lattice` is null, `path_json` doesn't parse, or the path is not
/// a connected walk through `lattice`.
#[no_mangle]
pub extern "C" fn lattice_get_trunk_span(
    lattice: *const Lattice,
    path_json: *const c_char,
) -> *mut TrunkSpanPath {
    if lattice.is_null() {
        return ptr::null_mut();
    }
    let Some(json) = (unsafe { cptr_to_str(path_json) }) else {
        return ptr::null_mut();
    };
    let Some(path) = parse_path(json) else {
        return ptr::null_mut();
    };
    match lattice::trunk::get_trunk_span(unsafe { &*lattice }, &path) {
        Ok(rewritten) => owned_new(TrunkSpanPath(rewritten)),
        Err(_) => ptr::null_mut(),
    }
}

ffi_close!(trunk_span_path_close, TrunkSpanPath);

#[no_mangle]
pub extern "C" fn trunk_span_path_len(path: *const TrunkSpanPath) -> u32 {
    if path.is_null() {
        return 0;
    }
    unsafe { &*path }.0.len() as u32
}

fn step<'a>(path: *const TrunkSpanPath, index: u32) -> Option<&'a PathStep> {
    if path.is_null() {
        return None;
    }
    unsafe { &*path }.0.get(index as usize)
}

#[no_mangle]
pub extern "C" fn trunk_span_path_node(path: *const TrunkSpanPath, index: u32) -> u32 {
    step(path, index).map_or(0, |s| s.node.0)
}

#[no_mangle]
pub extern "C" fn trunk_span_path_label_len(path: *const TrunkSpanPath, index: u32) -> u32 {
    step(path, index).map_or(0, |s| s.label.len() as u32)
}

#[no_mangle]
pub extern "C" fn trunk_span_path_label(
    path: *const TrunkSpanPath,
    index: u32,
    out: *mut u8,
    capacity: u32,
) -> u32 {
    match step(path, index) {
        Some(s) => unsafe { write_capacity_checked(&s.label, out, capacity as u64) as u32 },
        None => 0,
    }
}

/// Write every node's trunk span into `out_l`/`out_r` (parallel arrays,
/// capacity `capacity` entries each, indexed by node id). Always returns
/// `lattice.size()`; writes nothing if `capacity` is too small.
#[no_mangle]
pub extern "C" fn lattice_get_trunk_spans(
    lattice: *const Lattice,
    out_l: *mut u32,
    out_r: *mut u32,
    capacity: u64,
) -> u64 {
    if lattice.is_null() {
        return 0;
    }
    let lat = unsafe { &*lattice };
    let spans = lattice::trunk_spans(lat);
    let needed = spans.len() as u64;
    if !out_l.is_null() && !out_r.is_null() && capacity >= needed {
        for (i, (l, r)) in spans.into_iter().enumerate() {
            unsafe {
                *out_l.add(i) = l.0;
                *out_r.add(i) = r.0;
            }
        }
    }
    needed
}
