//! Document URI to file path conversion.

/// Extracts the file path from a `file://` URI.
///
/// The path is percent-decoded and `file:///C:/...` drive forms lose their
/// leading slash. Separators are left as they are; path comparison
/// normalizes them later. Returns `None` for any other scheme.
pub fn file_uri_to_path(uri: &str) -> Option<String> {
    let rest = uri.strip_prefix("file://")?;
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);
    if !rest.starts_with('/') {
        // A remote host, e.g. `file://server/share`.
        return None;
    }

    let mut path = percent_decode_path(rest);
    if has_drive_after_slash(&path) {
        path.remove(0);
    }
    Some(path)
}

/// Percent-decodes a URI path. Invalid escapes are kept literally.
pub fn percent_decode_path(path: &str) -> String {
    fn hex_val(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = path.as_bytes();
    let mut out = Vec::<u8>::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2]))
        {
            out.push((hi << 4) | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Whether the path looks like `/C:/...`.
fn has_drive_after_slash(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':'
}
