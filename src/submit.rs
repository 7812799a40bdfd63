// ABOUTME: Chooses a long-message transmission strategy and computes USSD session-info octets
// ABOUTME: The four-way policy and additive session-info arithmetic are carried verbatim from the original

use crate::codec_table::encode_with_charset;
use crate::error::{CoreError, CoreResult};
use crate::message::{OutboundMessage, SessionEvent};
use crate::pdu::OptionalParameters;
use crate::protocol::ProtocolSender;

/// Above this many encoded bytes, the payload-extension strategy switches
/// from `submit` to `submit_long` (spec §4.4).
const PAYLOAD_EXTENSION_THRESHOLD: usize = 254;

/// Which mutually exclusive long-message strategy this core dispatches
/// into (spec §4.4, §6 "send_long_messages" / "send_multipart_sar" /
/// "send_multipart_udh"). Exactly one of these — or `None` — is valid;
/// enforcing that is `GatewayConfig`'s job, not this type's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LongMessagePolicy {
    #[default]
    None,
    Payload,
    Sar,
    Udh,
}

/// Computes outbound PDU parameters from a normalized message and hands
/// them to a `ProtocolSender` (spec §4.4).
#[derive(Clone, Debug)]
pub struct SubmitProcessor {
    submit_encoding: String,
    submit_data_coding: u8,
    policy: LongMessagePolicy,
}

impl Default for SubmitProcessor {
    fn default() -> Self {
        Self {
            submit_encoding: "utf-8".to_string(),
            submit_data_coding: 0,
            policy: LongMessagePolicy::None,
        }
    }
}

impl SubmitProcessor {
    pub fn new(submit_encoding: impl Into<String>, submit_data_coding: u8, policy: LongMessagePolicy) -> Self {
        Self {
            submit_encoding: submit_encoding.into(),
            submit_data_coding,
            policy,
        }
    }

    /// `send(outbound_msg, protocol)` (spec §4.4).
    pub async fn send(&self, outbound: &OutboundMessage, protocol: &impl ProtocolSender) -> CoreResult<()> {
        let to_addr = ascii_bytes(&outbound.to_addr, "to_addr")?;
        let from_addr = ascii_bytes(&outbound.from_addr, "from_addr")?;

        let encoded = encode_with_charset(&outbound.content, &self.submit_encoding);

        let mut optional = OptionalParameters::new();
        if outbound.transport_type == "ussd" {
            augment_ussd(&mut optional, outbound);
        }

        match self.policy {
            LongMessagePolicy::None => {
                protocol
                    .submit(
                        &outbound.message_id,
                        &to_addr,
                        &encoded,
                        self.submit_data_coding,
                        &from_addr,
                        optional,
                    )
                    .await
                    .map_err(CoreError::from)
            }
            LongMessagePolicy::Payload if encoded.len() > PAYLOAD_EXTENSION_THRESHOLD => protocol
                .submit_long(
                    &outbound.message_id,
                    &to_addr,
                    &encoded,
                    self.submit_data_coding,
                    &from_addr,
                    optional,
                )
                .await
                .map_err(CoreError::from),
            LongMessagePolicy::Payload => protocol
                .submit(
                    &outbound.message_id,
                    &to_addr,
                    &encoded,
                    self.submit_data_coding,
                    &from_addr,
                    optional,
                )
                .await
                .map_err(CoreError::from),
            LongMessagePolicy::Sar => protocol
                .submit_sar(
                    &outbound.message_id,
                    &to_addr,
                    &encoded,
                    self.submit_data_coding,
                    &from_addr,
                    optional,
                )
                .await
                .map_err(CoreError::from),
            LongMessagePolicy::Udh => protocol
                .submit_udh(
                    &outbound.message_id,
                    &to_addr,
                    &encoded,
                    self.submit_data_coding,
                    &from_addr,
                    optional,
                )
                .await
                .map_err(CoreError::from),
        }
    }
}

fn ascii_bytes(value: &str, field: &'static str) -> CoreResult<Vec<u8>> {
    if !value.is_ascii() {
        return Err(CoreError::NonAsciiAddress {
            field,
            value: value.to_string(),
        });
    }
    Ok(value.as_bytes().to_vec())
}

/// USSD session-info augmentation (spec §4.4): additive, not bitwise-or,
/// by design — preserves the ESME convention of alternating the low bit.
/// Well-defined only when the caller guarantees the low bit of the
/// previous turn's `session_info` matches `continue_session`.
fn augment_ussd(optional: &mut OptionalParameters, outbound: &OutboundMessage) {
    use crate::datatypes::{Tlv, tags};

    let continue_session = outbound.session_event != Some(SessionEvent::Close);

    let previous = outbound
        .transport_metadata
        .get("session_info")
        .map(String::as_str)
        .unwrap_or("0000");
    let parsed = u16::from_str_radix(previous, 16).unwrap_or(0);
    let new_value = parsed.wrapping_add(if continue_session { 0 } else { 1 });

    optional.insert(Tlv::new(tags::USSD_SERVICE_OP, "02"));
    optional.insert(Tlv::new(tags::ITS_SESSION_INFO, format!("{new_value:04x}")));
}
