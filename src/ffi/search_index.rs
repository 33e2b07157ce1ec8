//! Search-index projection.
//!
//! Returned as an opaque handle rather than a C struct array: callers
//! query the record count, then pull each field of each record through a
//! capacity-checked getter. This avoids ever describing a repr(C) layout
//! for a type (`SearchIndexRecord`) whose only variable-length field is
//! the token text.

use std::ptr;

use crate::lattice::{self, Lattice, SearchIndexRecord};

use super::{ffi_close, owned_new, write_capacity_checked};

pub struct SearchIndexList(Vec<SearchIndexRecord>);

ffi_close!(search_index_list_close, SearchIndexList);

/// Project every edge of `lattice` into a search-index record list. Null
/// if `lattice` is null.
#[no_mangle]
pub extern "C" fn lattice_dump_for_search_index(lattice: *const Lattice) -> *mut SearchIndexList {
    if lattice.is_null() {
        return ptr::null_mut();
    }
    let records = lattice::search_index::dump(unsafe { &*lattice });
    owned_new(SearchIndexList(records))
}

#[no_mangle]
pub extern "C" fn search_index_list_len(list: *const SearchIndexList) -> u32 {
    if list.is_null() {
        return 0;
    }
    unsafe { &*list }.0.len() as u32
}

fn record<'a>(list: *const SearchIndexList, index: u32) -> Option<&'a SearchIndexRecord> {
    if list.is_null() {
        return None;
    }
    unsafe { &*list }.0.get(index as usize)
}

#[no_mangle]
pub extern "C" fn search_index_text_len(list: *const SearchIndexList, index: u32) -> u32 {
    record(list, index).map_or(0, |r| r.text.len() as u32)
}

#[no_mangle]
pub extern "C" fn search_index_text(
    list: *const SearchIndexList,
    index: u32,
    out: *mut u8,
    capacity: u32,
) -> u32 {
    match record(list, index) {
        Some(r) => unsafe { write_capacity_checked(&r.text, out, capacity as u64) as u32 },
        None => 0,
    }
}

#[no_mangle]
pub extern "C" fn search_index_increment(list: *const SearchIndexList, index: u32) -> u32 {
    record(list, index).map_or(0, |r| r.increment)
}

#[no_mangle]
pub extern "C" fn search_index_length(list: *const SearchIndexList, index: u32) -> u32 {
    record(list, index).map_or(0, |r| r.length)
}

#[no_mangle]
pub extern "C" fn search_index_offset_start(list: *const SearchIndexList, index: u32) -> u32 {
    record(list, index).map_or(0, |r| r.offset_start)
}

#[no_mangle]
pub extern "C" fn search_index_offset_end(list: *const SearchIndexList, index: u32) -> u32 {
    record(list, index).map_or(0, |r| r.offset_end)
}
