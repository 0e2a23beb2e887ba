//! Binary file sniffing.

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const PDF_MAGIC: &[u8] = b"%PDF-";
const SNIFF_LEN: usize = 32;

/// Cheap, deterministic binary check on a file's leading bytes: a UTF-8 BOM
/// is text, a PDF magic number is binary, and otherwise the first 32 bytes
/// must be valid UTF-8.
pub fn is_binary(buf: &[u8]) -> bool {
    if buf.starts_with(UTF8_BOM) {
        return false;
    }
    if buf.starts_with(PDF_MAGIC) {
        return true;
    }
    let head = &buf[..buf.len().min(SNIFF_LEN)];
    std::str::from_utf8(head).is_err()
}
