// ABOUTME: Multipart concatenation detection and reassembly buffer (SAR and UDH headers)
// ABOUTME: Hex-armors part payloads at the JSON store boundary so binary survives a text-only store

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::pdu::{OptionalParameters, PduView};

/// A parsed concatenation header, regardless of whether it arrived via SAR
/// optional parameters or a UDH (spec §3, §4.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MultipartHeader {
    pub reference: u16,
    pub total: u8,
    pub sequence: u8,
}

/// Detects a concatenation header on a PDU, preferring SAR fields (the
/// out-of-band optional parameters) and falling back to a UDH, either as a
/// dedicated TLV or embedded in the leading bytes of `short_message` (spec
/// §4.3: "examines the UDH or SAR optional fields for a concatenation
/// header"). Returns the header plus the part's actual payload bytes (the
/// UDH prefix, if embedded, is stripped off).
pub fn detect_multipart(pdu: &PduView) -> Option<(MultipartHeader, Bytes)> {
    if let Some(header) = detect_sar(&pdu.optional) {
        return Some((header, pdu.mandatory.short_message.clone()));
    }

    if let Some(udh) = pdu.optional.user_data_header() {
        if let Some(header) = parse_udh(&udh) {
            return Some((header, pdu.mandatory.short_message.clone()));
        }
    }

    if let Some((header, rest)) = split_inline_udh(&pdu.mandatory.short_message) {
        return Some((header, rest));
    }

    None
}

fn detect_sar(optional: &OptionalParameters) -> Option<MultipartHeader> {
    let reference = optional.sar_msg_ref_num()?;
    let total = optional.sar_total_segments()?;
    let sequence = optional.sar_segment_seqnum()?;
    Some(MultipartHeader {
        reference,
        total,
        sequence,
    })
}

/// Parses the SMPP short-form UDH concatenation header: `UDHL, IEI=0x00,
/// IEIDL=3, reference, total, sequence`.
fn parse_udh(udh: &[u8]) -> Option<MultipartHeader> {
    if udh.len() < 6 {
        return None;
    }
    let udhl = udh[0] as usize;
    if udhl + 1 > udh.len() || udh[1] != 0x00 || udh[2] != 0x03 {
        return None;
    }
    Some(MultipartHeader {
        reference: udh[3] as u16,
        total: udh[4],
        sequence: udh[5],
    })
}

/// Like `parse_udh`, but the UDH is the leading bytes of `short_message`
/// itself (no dedicated TLV was sent); returns the header plus the
/// remaining payload after the header bytes.
fn split_inline_udh(short_message: &Bytes) -> Option<(MultipartHeader, Bytes)> {
    if short_message.len() < 6 {
        return None;
    }
    let udhl = short_message[0] as usize;
    if short_message.len() < 1 + udhl || udhl < 5 {
        return None;
    }
    let header = parse_udh(&short_message[..1 + udhl])?;
    Some((header, short_message.slice(1 + udhl..)))
}

/// Derives the deterministic reassembly key from (reference, total, source)
/// (spec §3, "Reassembly key").
pub fn reassembly_key(header: MultipartHeader, source_addr: &str) -> String {
    format!("{}:{}:{source_addr}", header.reference, header.total)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PartRecordHex {
    part_message: String,
    from_msisdn: String,
    to_msisdn: String,
}

/// One reassembled part, held in memory as raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartRecord {
    pub part_message: Bytes,
    pub from_msisdn: String,
    pub to_msisdn: String,
}

/// The per-key reassembly buffer (spec §3, MultipartBuffer).
///
/// Parts are not deduplicated by content, only by index — a fragment
/// arriving twice for the same index overwrites the earlier one.
#[derive(Clone, Debug, Default)]
pub struct MultipartBuffer {
    parts: BTreeMap<u8, PartRecord>,
}

impl MultipartBuffer {
    /// Loads a buffer from its stored JSON form, treating absent/empty
    /// input as an empty mapping. Part payloads are un-hexed on load.
    pub fn load(stored: Option<&str>) -> Self {
        let Some(stored) = stored.filter(|s| !s.is_empty()) else {
            return Self::default();
        };

        let raw: BTreeMap<u8, PartRecordHex> = match serde_json::from_str(stored) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "multipart buffer: failed to parse stored JSON, treating as empty");
                return Self::default();
            }
        };

        let parts = raw
            .into_iter()
            .filter_map(|(index, rec)| {
                let bytes = match hex::decode(&rec.part_message) {
                    Ok(b) => Bytes::from(b),
                    Err(e) => {
                        tracing::error!(index, error = %e, "multipart buffer: part payload is not valid hex, dropping part");
                        return None;
                    }
                };
                Some((
                    index,
                    PartRecord {
                        part_message: bytes,
                        from_msisdn: rec.from_msisdn,
                        to_msisdn: rec.to_msisdn,
                    },
                ))
            })
            .collect();

        Self { parts }
    }

    pub fn insert(&mut self, index: u8, part: PartRecord) {
        self.parts.insert(index, part);
    }

    /// Complete once all indices `1..=total` are present.
    pub fn is_complete(&self, total: u8) -> bool {
        (1..=total).all(|i| self.parts.contains_key(&i))
    }

    /// Concatenates parts `1..=total` in ascending index order (spec §8
    /// invariant). Panics if not complete — callers must check first.
    pub fn concatenate(&self, total: u8) -> Bytes {
        let mut out = Vec::new();
        for i in 1..=total {
            let part = self.parts.get(&i).expect("buffer is complete");
            out.extend_from_slice(&part.part_message);
        }
        Bytes::from(out)
    }

    /// Serializes the buffer back to its hex-armored JSON form.
    pub fn to_json(&self) -> String {
        let raw: BTreeMap<u8, PartRecordHex> = self
            .parts
            .iter()
            .map(|(index, rec)| {
                (
                    *index,
                    PartRecordHex {
                        part_message: hex::encode(&rec.part_message),
                        from_msisdn: rec.from_msisdn.clone(),
                        to_msisdn: rec.to_msisdn.clone(),
                    },
                )
            })
            .collect();
        serde_json::to_string(&raw).expect("PartRecordHex always serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(msg: &[u8]) -> PartRecord {
        PartRecord {
            part_message: Bytes::copy_from_slice(msg),
            from_msisdn: "111".to_string(),
            to_msisdn: "222".to_string(),
        }
    }

    #[test]
    fn hex_round_trip_through_json() {
        let mut buf = MultipartBuffer::default();
        buf.insert(1, part(&[0x00, 0xFF, 0x10]));
        let json = buf.to_json();
        let reloaded = MultipartBuffer::load(Some(&json));
        assert_eq!(
            reloaded.parts.get(&1).unwrap().part_message.as_ref(),
            &[0x00, 0xFF, 0x10]
        );
    }

    #[test]
    fn absent_buffer_loads_empty() {
        let buf = MultipartBuffer::load(None);
        assert!(!buf.is_complete(1));
    }

    #[test]
    fn empty_string_loads_empty() {
        let buf = MultipartBuffer::load(Some(""));
        assert!(!buf.is_complete(1));
    }

    #[test]
    fn completion_requires_every_index() {
        let mut buf = MultipartBuffer::default();
        buf.insert(1, part(b"Hello "));
        assert!(!buf.is_complete(2));
        buf.insert(2, part(b"World"));
        assert!(buf.is_complete(2));
    }

    #[test]
    fn concatenation_is_ascending_by_index() {
        let mut buf = MultipartBuffer::default();
        buf.insert(2, part(b"World"));
        buf.insert(1, part(b"Hello "));
        assert_eq!(buf.concatenate(2).as_ref(), b"Hello World");
    }

    #[test]
    fn later_insert_overwrites_same_index() {
        let mut buf = MultipartBuffer::default();
        buf.insert(1, part(b"first"));
        buf.insert(1, part(b"second"));
        assert_eq!(buf.parts.get(&1).unwrap().part_message.as_ref(), b"second");
    }

    #[test]
    fn sar_header_takes_priority_over_udh() {
        use crate::datatypes::{Tlv, tags};
        use crate::pdu::MandatoryParameters;

        let mut optional = OptionalParameters::new();
        optional.insert(Tlv::new(tags::SAR_MSG_REF_NUM, Bytes::from_static(&[0, 7])));
        optional.insert(Tlv::new(tags::SAR_TOTAL_SEGMENTS, Bytes::from_static(&[2])));
        optional.insert(Tlv::new(tags::SAR_SEGMENT_SEQNUM, Bytes::from_static(&[1])));

        let pdu = PduView {
            mandatory: MandatoryParameters {
                source_addr: "1234".to_string(),
                destination_addr: "5678".to_string(),
                short_message: Bytes::from_static(b"Hello "),
                data_coding: 3,
            },
            optional,
        };

        let (header, payload) = detect_multipart(&pdu).unwrap();
        assert_eq!(
            header,
            MultipartHeader {
                reference: 7,
                total: 2,
                sequence: 1
            }
        );
        assert_eq!(payload.as_ref(), b"Hello ");
    }

    #[test]
    fn inline_udh_is_stripped_from_payload() {
        use crate::pdu::MandatoryParameters;

        // UDHL=5, IEI=0x00, IEIDL=3, ref=9, total=2, seq=1, then payload.
        let mut short_message = vec![5u8, 0x00, 0x03, 9, 2, 1];
        short_message.extend_from_slice(b"World");

        let pdu = PduView {
            mandatory: MandatoryParameters {
                source_addr: "1234".to_string(),
                destination_addr: "5678".to_string(),
                short_message: Bytes::from(short_message),
                data_coding: 3,
            },
            optional: OptionalParameters::new(),
        };

        let (header, payload) = detect_multipart(&pdu).unwrap();
        assert_eq!(
            header,
            MultipartHeader {
                reference: 9,
                total: 2,
                sequence: 1
            }
        );
        assert_eq!(payload.as_ref(), b"World");
    }

    #[test]
    fn plain_short_message_is_not_multipart() {
        use crate::pdu::MandatoryParameters;

        let pdu = PduView {
            mandatory: MandatoryParameters {
                source_addr: "1234".to_string(),
                destination_addr: "5678".to_string(),
                short_message: Bytes::from_static(b"just a plain sms"),
                data_coding: 1,
            },
            optional: OptionalParameters::new(),
        };
        assert!(detect_multipart(&pdu).is_none());
    }

    #[test]
    fn reassembly_key_is_deterministic() {
        let header = MultipartHeader {
            reference: 7,
            total: 2,
            sequence: 1,
        };
        assert_eq!(reassembly_key(header, "1234"), "7:2:1234");
        assert_eq!(
            reassembly_key(header, "1234"),
            reassembly_key(header, "1234")
        );
    }
}
