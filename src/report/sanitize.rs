//! Text encoding for the standard PDF fonts.
//!
//! The Type1 base fonts are used with `WinAnsiEncoding`, a single-byte code page. Anything it
//! cannot represent is dropped rather than substituted.

/// Windows-1252 bytes 0x80..=0x9F that differ from Latin-1.
const CP1252_EXTRAS: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

fn win_ansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(c as u32 as u8),
        _ => CP1252_EXTRAS
            .iter()
            .find(|(extra, _)| *extra == c)
            .map(|&(_, byte)| byte),
    }
}

/// Encodes `text` for a `WinAnsiEncoding` font, silently dropping unrepresentable characters.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().filter_map(win_ansi_byte).collect()
}

/// `text` without the characters [`encode_win_ansi`] would drop.
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|&c| win_ansi_byte(c).is_some()).collect()
}

/// Amount with two decimals followed by the euro sign.
pub fn format_currency(amount: f64) -> String {
    format!("{amount:.2} €")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_latin1_and_euro() {
        assert_eq!(sanitize("Attività caffè 10 €"), "Attività caffè 10 €");
        assert_eq!(encode_win_ansi("à€"), vec![0xE0, 0x80]);
    }

    #[test]
    fn drops_what_the_code_page_cannot_hold() {
        assert_eq!(sanitize("Cliente 😀 北京 ok"), "Cliente   ok");
        assert_eq!(sanitize("tab\there"), "tabhere");
        assert!(encode_win_ansi("✓").is_empty());
    }

    #[test]
    fn typographic_quotes_survive() {
        assert_eq!(encode_win_ansi("D’Elia"), vec![b'D', 0x92, b'E', b'l', b'i', b'a']);
    }

    #[test]
    fn currency_has_two_decimals() {
        assert_eq!(format_currency(90.0), "90.00 €");
        assert_eq!(format_currency(1234.5), "1234.50 €");
        assert_eq!(format_currency(-5.0), "-5.00 €");
    }
}
