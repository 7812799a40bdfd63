// ABOUTME: data_coding -> character-set dispatch with warn-and-passthrough fallback behavior
// ABOUTME: Baseline mapping and override merge follow spec.md's DataCodingMap exactly

use std::collections::HashMap;

use bytes::Bytes;

use crate::message::MessageContent;

/// Maps an SMPP `data_coding` integer (0-15) to a character-set name.
///
/// The baseline mapping is fixed; a caller-supplied override map is merged
/// on top and may add, replace, or supply code 0 (SMSC default alphabet),
/// per spec §3.
#[derive(Clone, Debug)]
pub struct DataCodingMap {
    charsets: HashMap<u8, String>,
}

impl DataCodingMap {
    fn baseline() -> HashMap<u8, String> {
        [
            (1, "ascii"),
            (3, "latin1"),
            (5, "iso-2022-jp"),
            (6, "iso-8859-5"),
            (7, "iso-8859-8"),
            (8, "utf-16be"),
            (9, "shift-jis"),
            (10, "iso-2022-jp"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
    }

    /// Builds the mapping from the baseline table plus caller overrides.
    pub fn new(overrides: HashMap<u8, String>) -> Self {
        let mut charsets = Self::baseline();
        charsets.extend(overrides);
        Self { charsets }
    }

    pub fn charset_name(&self, data_coding: u8) -> Option<&str> {
        self.charsets.get(&data_coding).map(String::as_str)
    }
}

impl Default for DataCodingMap {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

/// Decodes short-message octets according to their `data_coding`, degrading
/// to raw-bytes passthrough rather than failing the PDU (spec §4.1).
#[derive(Clone, Debug, Default)]
pub struct CodecTable {
    map: DataCodingMap,
}

impl CodecTable {
    pub fn new(map: DataCodingMap) -> Self {
        Self { map }
    }

    /// `decode(bytes, data_coding) -> text | bytes`.
    ///
    /// - Absent input (`None`) is warned about and passed through as `None`.
    /// - An unmapped `data_coding` is warned about and passed through as raw bytes.
    /// - A character-set decode failure is logged and the raw bytes are returned.
    pub fn decode(&self, bytes: Option<&Bytes>, data_coding: u8) -> Option<MessageContent> {
        let bytes = match bytes {
            Some(b) => b,
            None => {
                tracing::warn!(data_coding, "decode: short_message absent");
                return None;
            }
        };

        let Some(charset) = self.map.charset_name(data_coding) else {
            tracing::warn!(data_coding, "decode: unmapped data_coding, returning raw bytes");
            return Some(MessageContent::Bytes(bytes.to_vec()));
        };

        match decode_with_charset(bytes, charset) {
            Some(text) => Some(MessageContent::Text(text)),
            None => {
                tracing::error!(data_coding, charset, "decode: character-set decode failed, returning raw bytes");
                Some(MessageContent::Bytes(bytes.to_vec()))
            }
        }
    }
}

/// Resolves a charset name to an `encoding_rs::Encoding` and decodes.
/// Returns `None` only on a hard failure; lossy replacement-character
/// decoding is accepted (the SMSC ecosystem routinely mislabels encodings).
fn decode_with_charset(bytes: &[u8], charset: &str) -> Option<String> {
    let encoding = match charset.to_ascii_lowercase().as_str() {
        "ascii" => {
            // IA5/ASCII per spec is 7-bit; bytes >= 0x80 are a decode
            // failure even when they happen to form valid UTF-8.
            if !bytes.iter().all(|b| *b < 0x80) {
                return None;
            }
            return std::str::from_utf8(bytes).ok().map(str::to_string);
        }
        "latin1" | "latin-1" | "iso-8859-1" => encoding_rs::WINDOWS_1252,
        "iso-8859-5" => encoding_rs::ISO_8859_5,
        "iso-8859-8" => encoding_rs::ISO_8859_8,
        "utf-16be" => encoding_rs::UTF_16BE,
        "shift-jis" | "shift_jis" => encoding_rs::SHIFT_JIS,
        "iso-2022-jp" => encoding_rs::ISO_2022_JP,
        "utf-8" => encoding_rs::UTF_8,
        other => encoding_rs::Encoding::for_label(other.as_bytes())?,
    };

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors && encoding.is_single_byte() {
        // Single-byte charsets have no undecodable sequences; an error here
        // means the bytes are genuinely incompatible with the declared set.
        return None;
    }
    Some(text.into_owned())
}

/// Encodes outbound text per the configured `submit_encoding` (spec §4.4,
/// §6 "submit_encoding"). Unlike `decode_with_charset`, failures are never
/// fatal: unmappable characters are replaced rather than rejected, since
/// the core has no way to reject a send back to its caller mid-encode.
pub fn encode_with_charset(text: &str, charset: &str) -> Vec<u8> {
    match charset.to_ascii_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => text.as_bytes().to_vec(),
        "latin1" | "latin-1" | "iso-8859-1" => encode_with(encoding_rs::WINDOWS_1252, text),
        "iso-8859-5" => encode_with(encoding_rs::ISO_8859_5, text),
        "iso-8859-8" => encode_with(encoding_rs::ISO_8859_8, text),
        "utf-16be" => encode_with(encoding_rs::UTF_16BE, text),
        "shift-jis" | "shift_jis" => encode_with(encoding_rs::SHIFT_JIS, text),
        "iso-2022-jp" => encode_with(encoding_rs::ISO_2022_JP, text),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(encoding) => encode_with(encoding, text),
            None => {
                tracing::warn!(charset, "encode: unknown submit_encoding, falling back to utf-8");
                text.as_bytes().to_vec()
            }
        },
    }
}

fn encode_with(encoding: &'static encoding_rs::Encoding, text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        tracing::warn!(charset = encoding.name(), "encode: text contains characters unrepresentable in submit_encoding, replaced");
    }
    bytes.into_owned()
}
