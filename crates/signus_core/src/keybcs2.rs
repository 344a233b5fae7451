//! Kamenický (KEYBCS2) to UTF-8 conversion.
//!
//! The first commercial release stored savegame names in this DOS code page.
//! The lower half is ASCII; the upper half maps through [`UPPER_HALF`].

const UPPER_HALF: [&str; 128] = [
    "Č", "ü", "é", "ď", "ä", "Ď", "Ť", "č", "ě", "Ě", "Ĺ", "Í", "ľ", "ĺ", "Ä", "Á", //
    "É", "ž", "Ž", "ô", "ö", "Ó", "ů", "Ú", "ý", "Ö", "Ü", "Š", "Ľ", "Ý", "Ř", "ť", //
    "á", "í", "ó", "ú", "ň", "Ň", "Ů", "Ô", "š", "ř", "ŕ", "Ŕ", "¼", "§", "«", "»", //
    "░", "▒", "▓", "│", "┤", "╡", "╢", "╖", "╕", "╣", "║", "╗", "╝", "╜", "╛", "┐", //
    "└", "┴", "┬", "├", "─", "┼", "╞", "╟", "╚", "╔", "╩", "╦", "╠", "═", "╬", "╧", //
    "╨", "╤", "╥", "╙", "╘", "╒", "╓", "╫", "╪", "┘", "┌", "█", "▄", "▌", "▐", "▀", //
    "α", "ß", "Γ", "π", "Σ", "σ", "µ", "τ", "Φ", "Θ", "Ω", "δ", "∞", "φ", "ε", "∩", //
    "≡", "±", "≥", "≤", "⌠", "⌡", "÷", "≈", "°", "∙", "·", "√", "ⁿ", "²", "■", "\u{a0}",
];

fn expansion(byte: u8) -> &'static str {
    UPPER_HALF[usize::from(byte - 0x80)]
}

/// Convert a KEYBCS2 byte string to UTF-8. Input ends at the first NUL byte.
pub fn keybcs2_to_utf8(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let input = &bytes[..end];

    let size = input
        .iter()
        .map(|&b| if b < 0x80 { 1 } else { expansion(b).len() })
        .sum();
    let mut out = String::with_capacity(size);

    for &b in input {
        if b < 0x80 {
            out.push(char::from(b));
        } else {
            out.push_str(expansion(b));
        }
    }

    out
}
