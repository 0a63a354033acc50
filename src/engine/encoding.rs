//! Decoding of target files
//!
//! Targets are third-party config files of unknown encoding. Decoding walks an
//! ordered chain: strict UTF-8, then code page 850, then UTF-8 with invalid
//! bytes dropped.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Cp850,
    /// UTF-8 with undecodable bytes dropped
    Utf8Lossy,
}

/// Attempts made when loading a target, in order
pub const DECODE_CHAIN: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Cp850,
    TextEncoding::Utf8Lossy,
];

/// Upper half of IBM code page 850 (bytes 0x80..=0xFF)
const CP850_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐', //
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤', //
    'ð', 'Ð', 'Ê', 'Ë', 'È', 'ı', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀', //
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', 'µ', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '¯', '´', //
    '\u{00AD}', '±', '‗', '¾', '¶', '§', '÷', '¸', '°', '¨', '·', '¹', '³', '²', '■', '\u{00A0}',
];

impl TextEncoding {
    /// Decode `bytes`, or `None` if they are not valid in this encoding
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            TextEncoding::Cp850 => Some(
                bytes
                    .iter()
                    .map(|&b| {
                        if b < 0x80 {
                            char::from(b)
                        } else {
                            CP850_HIGH[usize::from(b - 0x80)]
                        }
                    })
                    .collect(),
            ),
            TextEncoding::Utf8Lossy => Some(
                bytes
                    .utf8_chunks()
                    .map(|chunk| chunk.valid())
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Cp850 => "cp850",
            TextEncoding::Utf8Lossy => "utf-8 (lossy)",
        };
        f.write_str(name)
    }
}

/// Decode with the first encoding in `chain` that accepts the bytes
pub fn decode_with(bytes: &[u8], chain: &[TextEncoding]) -> Option<(String, TextEncoding)> {
    chain
        .iter()
        .find_map(|&encoding| encoding.decode(bytes).map(|text| (text, encoding)))
}
