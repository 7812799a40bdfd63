// ABOUTME: The already-parsed PDU shape this core consumes — mandatory fields plus a TLV map
// ABOUTME: Generalizes the original's `unpacked_pdu_opts(pdu)` dict lookups into typed accessors

use std::collections::HashMap;

use bytes::Bytes;

use crate::datatypes::{Tlv, tags};

/// The mandatory parameters every PDU this core handles carries (spec §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MandatoryParameters {
    pub source_addr: String,
    pub destination_addr: String,
    pub short_message: Bytes,
    pub data_coding: u8,
}

/// The optional-parameter mapping of a PDU, keyed by TLV tag (spec §3).
///
/// This is the systems-language stand-in for spec.md's abstract
/// `optional_parameters` mapping: a caller (the wire codec, out of scope
/// for this core) builds one of these from the bytes on the wire, and every
/// accessor below returns a checked, typed value instead of requiring
/// callers to know tag numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionalParameters(HashMap<u16, Tlv>);

impl OptionalParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tlv: Tlv) -> &mut Self {
        self.0.insert(tlv.tag, tlv);
        self
    }

    pub fn get(&self, tag: u16) -> Option<&Tlv> {
        self.0.get(&tag)
    }

    pub fn receipted_message_id(&self) -> Option<String> {
        self.get(tags::RECEIPTED_MESSAGE_ID)
            .and_then(|t| t.as_str())
            .map(str::to_string)
    }

    pub fn message_state(&self) -> Option<u8> {
        self.get(tags::MESSAGE_STATE).and_then(Tlv::as_u8)
    }

    /// The long-message extension field, hex-decoded to raw octets. A TLV
    /// value that fails to decode as hex is logged and returned verbatim
    /// rather than dropped.
    pub fn message_payload(&self) -> Option<Bytes> {
        let tlv = self.get(tags::MESSAGE_PAYLOAD)?;
        let decoded = std::str::from_utf8(&tlv.value)
            .ok()
            .and_then(|s| hex::decode(s).ok());

        match decoded {
            Some(bytes) => Some(Bytes::from(bytes)),
            None => {
                tracing::warn!("message_payload: value is not valid hex, using raw bytes");
                Some(tlv.value.clone())
            }
        }
    }

    pub fn ussd_service_op(&self) -> Option<String> {
        self.get(tags::USSD_SERVICE_OP)
            .and_then(|t| t.as_str())
            .map(str::to_string)
    }

    pub fn its_session_info(&self) -> Option<String> {
        self.get(tags::ITS_SESSION_INFO)
            .and_then(|t| t.as_str())
            .map(str::to_string)
    }

    pub fn sar_msg_ref_num(&self) -> Option<u16> {
        self.get(tags::SAR_MSG_REF_NUM)
            .map(|t| be_u16(&t.value))
    }

    pub fn sar_total_segments(&self) -> Option<u8> {
        self.get(tags::SAR_TOTAL_SEGMENTS).and_then(Tlv::as_u8)
    }

    pub fn sar_segment_seqnum(&self) -> Option<u8> {
        self.get(tags::SAR_SEGMENT_SEQNUM).and_then(Tlv::as_u8)
    }

    pub fn user_data_header(&self) -> Option<Bytes> {
        self.get(tags::USER_DATA_HEADER).map(|t| t.value.clone())
    }
}

fn be_u16(bytes: &[u8]) -> u16 {
    match bytes {
        [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
        [lo] => *lo as u16,
        [] => 0,
    }
}

/// A complete, already-parsed PDU (spec §3, "PDU (input)").
#[derive(Clone, Debug, PartialEq)]
pub struct PduView {
    pub mandatory: MandatoryParameters,
    pub optional: OptionalParameters,
}
