//! Multigraph KMP search.

use std::ffi::c_char;
use std::ptr;

use crate::kmp::{KmpMatch, LatticeKmp};
use crate::lattice::Lattice;

use super::{cptr_to_str, ffi_close, owned_new, write_capacity_checked};

pub struct KmpResultList(Vec<KmpMatch>);

/// Compile a pattern search from a JSON array of token strings, e.g.
/// `["big","cat"]`. Null on malformed JSON or an empty pattern.
#[no_mangle]
pub extern "C" fn kmp_new(pattern_json: *const c_char) -> *mut LatticeKmp {
    let Some(json) = (unsafe { cptr_to_str(pattern_json) }) else {
        return ptr::null_mut();
    };
    let Ok(tokens) = serde_json::from_str::<Vec<String>>(json) else {
        return ptr::null_mut();
    };
    let pattern = tokens.into_iter().map(String::into_bytes).collect();
    match LatticeKmp::new(pattern) {
        Ok(kmp) => owned_new(kmp),
        Err(_) => ptr::null_mut(),
    }
}

ffi_close!(kmp_close, LatticeKmp);

/// Search `lattice` for every walk spelling `kmp`'s pattern. Null if
/// either argument is null.
#[no_mangle]
pub extern "C" fn kmp_search(kmp: *const LatticeKmp, lattice: *const Lattice) -> *mut KmpResultList {
    if kmp.is_null() || lattice.is_null() {
        return ptr::null_mut();
    }
    let matches = unsafe { &*kmp }.search(unsafe { &*lattice });
    owned_new(KmpResultList(matches))
}

ffi_close!(kmp_result_list_close, KmpResultList);

#[no_mangle]
pub extern "C" fn kmp_result_count(list: *const KmpResultList) -> u32 {
    if list.is_null() {
        return 0;
    }
    unsafe { &*list }.0.len() as u32
}

fn find<'a>(list: *const KmpResultList, index: u32) -> Option<&'a KmpMatch> {
    if list.is_null() {
        return None;
    }
    unsafe { &*list }.0.get(index as usize)
}

/// Number of nodes in match `index` (one more than its edge count). 0 if
/// out of range.
#[no_mangle]
pub extern "C" fn kmp_result_length(list: *const KmpResultList, index: u32) -> u32 {
    find(list, index).map_or(0, |m| m.nodes.len() as u32)
}

/// Write the node ids of match `index` into `out` (capacity `capacity`
/// entries). Always returns the needed count.
#[no_mangle]
pub extern "C" fn kmp_result_nodes(
    list: *const KmpResultList,
    index: u32,
    out: *mut u32,
    capacity: u32,
) -> u32 {
    let Some(m) = find(list, index) else {
        return 0;
    };
    let needed = m.nodes.len() as u32;
    if !out.is_null() && capacity >= needed {
        for (i, node) in m.nodes.iter().enumerate() {
            unsafe { *out.add(i) = node.0 };
        }
    }
    needed
}

#[no_mangle]
pub extern "C" fn kmp_result_edge_label_len(
    list: *const KmpResultList,
    index: u32,
    edge_index: u32,
) -> u32 {
    find(list, index)
        .and_then(|m| m.edge_labels.get(edge_index as usize))
        .map_or(0, |label| label.len() as u32)
}

#[no_mangle]
pub extern "C" fn kmp_result_edge_label(
    list: *const KmpResultList,
    index: u32,
    edge_index: u32,
    out: *mut u8,
    capacity: u32,
) -> u32 {
    match find(list, index).and_then(|m| m.edge_labels.get(edge_index as usize)) {
        Some(label) => unsafe { write_capacity_checked(label, out, capacity as u64) as u32 },
        None => 0,
    }
}
