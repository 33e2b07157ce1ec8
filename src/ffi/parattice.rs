//! `PaRattice` construction and lattice building.
//!
//! The dictionary and the input word sequence both cross the boundary as
//! JSON (`serde_json`) rather
//! than as a hand-packed C struct tree: `[[["big","cat"],["feline"]], ...]`
//! for a dictionary (groups of phrases of tokens), `["big","cat"]` for a
//! word sequence. This keeps every function in this module taking exactly
//! one pointer argument despite the dictionary's input shape being a
//! three-level nested collection.

use std::ffi::c_char;
use std::ptr;

use crate::dict::PaRattice;
use crate::lattice::{self, Lattice};

use super::{cptr_to_str, ffi_close, owned_new};

fn parse_dictionary(json: &str) -> Option<Vec<Vec<Vec<Vec<u8>>>>> {
    let groups: Vec<Vec<Vec<String>>> = serde_json::from_str(json).ok()?;
    Some(
        groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|phrase| phrase.into_iter().map(String::into_bytes).collect())
                    .collect()
            })
            .collect(),
    )
}

fn parse_words(json: &str) -> Option<Vec<String>> {
    serde_json::from_str(json).ok()
}

/// Build a `PaRattice` from a JSON-encoded dictionary. Null on malformed
/// JSON or an invalid dictionary (e.g. an empty phrase).
#[no_mangle]
pub extern "C" fn parattice_new(dict_json: *const c_char) -> *mut PaRattice {
    let Some(json) = (unsafe { cptr_to_str(dict_json) }) else {
        return ptr::null_mut();
    };
    let Some(dict) = parse_dictionary(json) else {
        return ptr::null_mut();
    };
    match PaRattice::new(&dict) {
        Ok(pr) => owned_new(pr),
        Err(_) => ptr::null_mut(),
    }
}

ffi_close!(parattice_close, PaRattice);

/// Build a paraphrase lattice over a JSON-encoded word sequence. `shrink`
/// selects the bisimulation-merge pass (`lattice::builder::shrink`). Null on
/// malformed JSON, an empty sequence, or if `parattice` is null.
#[no_mangle]
pub extern "C" fn parattice_get_lattice(
    parattice: *const PaRattice,
    words_json: *const c_char,
    shrink: bool,
    max_depth: u32,
) -> *mut Lattice {
    if parattice.is_null() {
        return ptr::null_mut();
    }
    let pr = unsafe { &*parattice };
    let Some(json) = (unsafe { cptr_to_str(words_json) }) else {
        return ptr::null_mut();
    };
    let Some(words) = parse_words(json) else {
        return ptr::null_mut();
    };
    let byte_words: Vec<&[u8]> = words.iter().map(|w| w.as_bytes()).collect();
    match lattice::build(pr, &byte_words, shrink, max_depth) {
        Ok(lat) => owned_new(lat),
        Err(_) => ptr::null_mut(),
    }
}
