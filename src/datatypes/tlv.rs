// ABOUTME: SMPP optional-parameter (TLV) representation shared by inbound and outbound PDUs
// ABOUTME: Carries the tag/value shape only — wire-level encode/decode belongs to the protocol layer

use bytes::Bytes;

// Standard TLV tag constants per SMPP v3.4 specification.
// Only the tags this core actually inspects or emits are kept; the teacher
// crate's full registry covered every optional parameter in the spec.
pub mod tags {
    pub const RECEIPTED_MESSAGE_ID: u16 = 0x001E;
    pub const MESSAGE_STATE: u16 = 0x0427;
    pub const MESSAGE_PAYLOAD: u16 = 0x0424;
    pub const USSD_SERVICE_OP: u16 = 0x0501;
    pub const ITS_SESSION_INFO: u16 = 0x1383;
    pub const SAR_MSG_REF_NUM: u16 = 0x020E;
    pub const SAR_TOTAL_SEGMENTS: u16 = 0x020F;
    pub const SAR_SEGMENT_SEQNUM: u16 = 0x0210;
    pub const USER_DATA_HEADER: u16 = 0x0005;
}

/// A single SMPP optional parameter: tag plus raw value octets.
///
/// The wire codec (tag/length framing, TLV ordering on the byte stream) is
/// the protocol object's concern; this core only ever sees and produces
/// `Tlv` values already split out of `optional_parameters`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    pub tag: u16,
    pub value: Bytes,
}

impl Tlv {
    pub fn new(tag: u16, value: impl Into<Bytes>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    /// Interprets the value as an ASCII/UTF-8 string, e.g. a hex-encoded
    /// octet such as `ussd_service_op` or `its_session_info`.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }

    /// Interprets the value as a single big-endian byte (e.g. `message_state`).
    pub fn as_u8(&self) -> Option<u8> {
        self.value.first().copied()
    }
}
