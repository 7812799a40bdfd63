// ABOUTME: Classifies inbound PDUs as USSD, multipart, or plain SMS and dispatches normalized messages
// ABOUTME: Three classifier entry points applied by the caller in order, exactly as the original processor

use crate::codec_table::CodecTable;
use crate::error::{CoreError, CoreResult};
use crate::message::{MessageContent, MessageType, NormalizedInboundMessage, SessionEvent};
use crate::multipart::{self, MultipartBuffer, PartRecord};
use crate::pdu::PduView;
use crate::sink::InboundSink;
use crate::store::MessageStore;

/// Outcome of classifying a PDU as (possibly) part of a multipart
/// sequence: either it is still accumulating fragments (nothing to
/// dispatch yet), or the current fragment completed the sequence and a
/// normalized message is ready (spec §4.3's state machine).
pub enum MultipartOutcome {
    Buffering,
    Dispatch(NormalizedInboundMessage),
}

/// Classifies and reassembles inbound PDUs, dispatching normalized
/// messages to an `InboundSink` (spec §4.3).
#[derive(Clone, Debug, Default)]
pub struct DeliverProcessor {
    codec: CodecTable,
}

impl DeliverProcessor {
    pub fn new(codec: CodecTable) -> Self {
        Self { codec }
    }

    /// Runs the three classifiers in order — USSD, multipart, plain — and
    /// dispatches the first that produces a message (spec §4.3). A PDU
    /// still accumulating multipart fragments is "handled" in the sense
    /// that no further classifier runs on it, but nothing is dispatched.
    pub async fn process(
        &self,
        pdu: &PduView,
        store: &impl MessageStore,
        sink: &impl InboundSink,
    ) -> CoreResult<()> {
        if let Some(message) = self.handle_ussd(pdu) {
            sink.handle_inbound(message).await;
            return Ok(());
        }

        if let Some(outcome) = self.handle_multipart(pdu, store).await? {
            if let MultipartOutcome::Dispatch(message) = outcome {
                sink.handle_inbound(message).await;
            }
            return Ok(());
        }

        let message = self.handle_plain(pdu);
        sink.handle_inbound(message).await;
        Ok(())
    }

    /// USSD classification (spec §4.3): presence of `ussd_service_op`
    /// marks the PDU as USSD. Returns `None` for any other PDU.
    pub fn handle_ussd(&self, pdu: &PduView) -> Option<NormalizedInboundMessage> {
        let service_op = pdu.optional.ussd_service_op()?;

        let mut session_event = session_event_from_service_op(&service_op);

        let session_info = pdu.optional.its_session_info().and_then(|hex_str| {
            u16::from_str_radix(&hex_str, 16).ok().map(|value| {
                let end_session = value & 1 == 1;
                if end_session {
                    session_event = SessionEvent::Close;
                }
                format!("{:04x}", value & 0xFFFE)
            })
        });

        let content = self
            .codec
            .decode(Some(&pdu.mandatory.short_message), pdu.mandatory.data_coding)
            .unwrap_or(MessageContent::Bytes(Vec::new()));

        Some(NormalizedInboundMessage {
            source_addr: pdu.mandatory.source_addr.clone(),
            destination_addr: pdu.mandatory.destination_addr.clone(),
            short_message: content,
            message_type: MessageType::Ussd,
            session_event: Some(session_event),
            session_info,
        })
    }

    /// Multipart classification and reassembly (spec §4.3). Returns
    /// `None` if the PDU carries no SAR/UDH concatenation header at all;
    /// otherwise `Some(MultipartOutcome)` describing whether the sequence
    /// is now complete.
    pub async fn handle_multipart(
        &self,
        pdu: &PduView,
        store: &impl MessageStore,
    ) -> CoreResult<Option<MultipartOutcome>> {
        let Some((header, part_payload)) = multipart::detect_multipart(pdu) else {
            return Ok(None);
        };

        let key = multipart::reassembly_key(header, &pdu.mandatory.source_addr);
        let store_key = format!("multi_{key}");

        let stored = store.get(&store_key).await.map_err(CoreError::from)?;
        let mut buffer = MultipartBuffer::load(stored.as_deref());
        buffer.insert(
            header.sequence,
            PartRecord {
                part_message: part_payload,
                from_msisdn: pdu.mandatory.source_addr.clone(),
                to_msisdn: pdu.mandatory.destination_addr.clone(),
            },
        );

        if buffer.is_complete(header.total) {
            store.delete(&store_key).await.map_err(CoreError::from)?;
            let concatenated = buffer.concatenate(header.total);
            let content = self
                .codec
                .decode(Some(&concatenated), pdu.mandatory.data_coding)
                .unwrap_or(MessageContent::Bytes(concatenated.to_vec()));

            return Ok(Some(MultipartOutcome::Dispatch(NormalizedInboundMessage::sms(
                pdu.mandatory.source_addr.clone(),
                pdu.mandatory.destination_addr.clone(),
                content,
            ))));
        }

        store.set(&store_key, buffer.to_json()).await.map_err(CoreError::from)?;
        Ok(Some(MultipartOutcome::Buffering))
    }

    /// Plain SMS (spec §4.3): prefers `message_payload` (the long-message
    /// extension field) over `mandatory_parameters.short_message`.
    pub fn handle_plain(&self, pdu: &PduView) -> NormalizedInboundMessage {
        let payload = pdu
            .optional
            .message_payload()
            .unwrap_or_else(|| pdu.mandatory.short_message.clone());

        let content = self
            .codec
            .decode(Some(&payload), pdu.mandatory.data_coding)
            .unwrap_or(MessageContent::Bytes(payload.to_vec()));

        if content.is_empty() {
            tracing::debug!("short_message is present but empty; dispatching empty content");
        }

        NormalizedInboundMessage::sms(
            pdu.mandatory.source_addr.clone(),
            pdu.mandatory.destination_addr.clone(),
            content,
        )
    }
}

/// Maps the `ussd_service_op` hex octet to a session event (spec §4.3,
/// §7 kind 4): `01` new, `11` close, `02`/`12` continue, anything else
/// falls back to close.
fn session_event_from_service_op(service_op: &str) -> SessionEvent {
    match service_op {
        "01" => SessionEvent::New,
        "11" => SessionEvent::Close,
        "02" | "12" => SessionEvent::Continue,
        _ => SessionEvent::Close,
    }
}
