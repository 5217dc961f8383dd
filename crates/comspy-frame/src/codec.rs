use std::fmt::Write;

/// Render a message as space-separated hexadecimal byte tokens.
///
/// Tokens are lowercase, `0x`-prefixed and not zero-padded: `0x1 0xff 0x2`.
pub fn format_message(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 5);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:#x}");
    }
    out
}
