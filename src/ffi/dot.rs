//! DOT graph export.

use crate::lattice::{self, Lattice};

use super::write_capacity_checked;

/// Render `lattice` as DOT source into `out` (capacity `capacity` bytes;
/// `numbered` selects the span-annotated variant). Returns the number of
/// bytes needed, 0 if `lattice` is null.
#[no_mangle]
pub extern "C" fn lattice_dump_dot(
    lattice: *const Lattice,
    numbered: bool,
    out: *mut u8,
    capacity: u64,
) -> u64 {
    if lattice.is_null() {
        return 0;
    }
    let lat = unsafe { &*lattice };
    let text = if numbered {
        lattice::dot::dump_numbered(lat)
    } else {
        lattice::dot::dump(lat)
    };
    unsafe { write_capacity_checked(text.as_bytes(), out, capacity) }
}
