//! Turns a raw, possibly non-UTF-8 object name into a host-filesystem-safe
//! path segment. Deliberately minimal: only the separators and reserved
//! characters the original tool guarded against are replaced; this is not
//! a general-purpose path sanitizer.

use std::ffi::OsString;

#[cfg(unix)]
use std::os::unix::ffi::OsStringExt;

/// Replaces `/`, `\`, and `:` with `_`, and substitutes `OBJ_<id>` when the
/// name is empty (either because it was stored empty, or because nothing
/// but reserved characters remained).
pub fn sanitize_name(raw: &[u8], obj_id: u16) -> OsString {
    if raw.is_empty() {
        return OsString::from(format!("OBJ_{obj_id}"));
    }

    let cleaned: Vec<u8> = raw
        .iter()
        .map(|&b| match b {
            b'/' | b'\\' | b':' => b'_',
            other => other,
        })
        .collect();

    bytes_to_os_string(cleaned)
}

#[cfg(unix)]
fn bytes_to_os_string(bytes: Vec<u8>) -> OsString {
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn bytes_to_os_string(bytes: Vec<u8>) -> OsString {
    String::from_utf8_lossy(&bytes).into_owned().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_path_separators_and_colon() {
        let name = sanitize_name(b"a/b\\c:d", 1);
        assert_eq!(name.to_str().unwrap(), "a_b_c_d");
    }

    #[test]
    fn empty_name_falls_back_to_obj_id() {
        let name = sanitize_name(b"", 42);
        assert_eq!(name.to_str().unwrap(), "OBJ_42");
    }

    #[test]
    fn plain_name_is_unchanged() {
        let name = sanitize_name(b"readme.txt", 7);
        assert_eq!(name.to_str().unwrap(), "readme.txt");
    }
}
