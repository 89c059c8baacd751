//! Byte order conversion of element values.
//!
//! Element buffers hold binary numbers in little endian.
//! Values read from or written to a big endian transfer syntax
//! go through [`swap_in_place`], which reverses the bytes
//! of every unit according to the value representation.

use dcmio_core::VR;

/// Reverse the bytes of each binary unit of a value in place.
///
/// Text and byte-oriented VRs are left untouched.
/// A trailing partial unit (a malformed value) is also left untouched.
pub fn swap_in_place(vr: VR, data: &mut [u8]) {
    let unit = vr.swap_unit();
    if unit <= 1 {
        return;
    }
    for chunk in data.chunks_exact_mut(unit) {
        chunk.reverse();
    }
}
