//! Windows-1252 text decoding

use encoding_rs::WINDOWS_1252;

/// Decode raw file content.
///
/// Content is read as Windows-1252. A leading byte order mark overrides
/// that (UTF-8 or UTF-16) and is stripped; malformed input decodes lossily.
pub fn decode_file_content(bytes: &[u8]) -> String {
    let (text, used, _) = WINDOWS_1252.decode(bytes);
    if used != WINDOWS_1252 {
        log::debug!("Byte order mark found, decoding as {}", used.name());
    }
    text.into_owned()
}
