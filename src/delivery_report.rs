// ABOUTME: Merges the binary message_state channel and the free-text regex channel into one status
// ABOUTME: Regex default is carried verbatim (translated) from the original processor's pattern

use std::collections::HashMap;

use regex::Regex;

use crate::error::ConfigError;
use crate::message::DeliveryStatus;
use crate::pdu::PduView;
use crate::sink::InboundSink;

/// The default delivery-report regex, translated from the original's
/// `DELIVERY_REPORT_REGEX` (Python `{,N}` shorthand becomes explicit `{0,N}`;
/// the original's fixed 3-dot wildcards for `sub`/`dlvrd`/`err` become
/// explicit `.{3}`, not a lazy `.*?` — a malformed report with a wrong-length
/// `sub`/`dlvrd`/`err` field must fail to match, not be accepted).
pub const DEFAULT_DELIVERY_REPORT_REGEX: &str = concat!(
    r"id:(?P<id>\S{0,65})",
    r" +sub:(?P<sub>.{3})",
    r" +dlvrd:(?P<dlvrd>.{3})",
    r" +submit date:(?P<submit_date>\d*)",
    r" +done date:(?P<done_date>\d*)",
    r" +stat:(?P<stat>[A-Z]{7})",
    r" +err:(?P<err>.{3})",
    r" +[Tt]ext:(?P<text>.{0,20})",
    r".*",
);

/// Maps an opaque state token to one of the three canonical statuses
/// (spec §3, DeliveryStatusMap). Unknown keys default to `pending`.
#[derive(Clone, Debug)]
pub struct DeliveryStatusMap {
    statuses: HashMap<String, DeliveryStatus>,
}

impl DeliveryStatusMap {
    fn baseline() -> HashMap<String, DeliveryStatus> {
        use DeliveryStatus::*;
        let mut statuses: HashMap<String, DeliveryStatus> = [
            ("ENROUTE", Pending),
            ("DELIVERED", Delivered),
            ("EXPIRED", Failed),
            ("DELETED", Failed),
            ("UNDELIVERABLE", Failed),
            ("REJECTED", Failed),
            ("ACCEPTED", Delivered),
            ("UNKNOWN", Pending),
            ("DELIVRD", Delivered),
            ("REJECTD", Failed),
            ("0", Delivered),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        // Canonical tokens map to themselves, so a caller that has already
        // resolved a status can round-trip it back through `resolve`.
        for status in [Delivered, Failed, Pending] {
            statuses.insert(status.as_token().to_string(), status);
        }
        statuses
    }

    /// Builds the mapping from the baseline table plus caller overrides.
    pub fn new(overrides: HashMap<String, DeliveryStatus>) -> Self {
        let mut statuses = Self::baseline();
        statuses.extend(overrides);
        Self { statuses }
    }

    /// Resolves a state token to a canonical status, defaulting to `pending`.
    pub fn resolve(&self, token: &str) -> DeliveryStatus {
        self.statuses
            .get(token)
            .copied()
            .unwrap_or(DeliveryStatus::Pending)
    }
}

impl Default for DeliveryStatusMap {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

/// Fixed mapping from `message_state` integer (1-8) to SMPP state name
/// (spec §3, MessageStateTable). Out-of-range values map to `UNKNOWN`.
pub fn message_state_name(message_state: u8) -> &'static str {
    match message_state {
        1 => "ENROUTE",
        2 => "DELIVERED",
        3 => "EXPIRED",
        4 => "DELETED",
        5 => "UNDELIVERABLE",
        6 => "ACCEPTED",
        7 => "UNKNOWN",
        8 => "REJECTED",
        _ => "UNKNOWN",
    }
}

/// Outcome of a `DeliveryReportProcessor` attempt (spec §4.2): a
/// `handled` verdict that also carries the extracted report when matched.
pub enum DeliveryReportOutcome {
    NotHandled,
    Handled {
        receipted_message_id: String,
        status: DeliveryStatus,
    },
}

/// Interprets delivery reports from either the binary `message_state`
/// optional field or a configurable free-text regex (spec §4.2).
pub struct DeliveryReportProcessor {
    regex: Regex,
    status_map: DeliveryStatusMap,
}

impl DeliveryReportProcessor {
    pub fn new(regex_pattern: &str, status_map: DeliveryStatusMap) -> Result<Self, ConfigError> {
        let regex = Regex::new(regex_pattern)
            .map_err(|e| ConfigError::InvalidRegex(e.to_string()))?;
        Ok(Self { regex, status_map })
    }

    pub fn with_default_regex(status_map: DeliveryStatusMap) -> Self {
        Self::new(DEFAULT_DELIVERY_REPORT_REGEX, status_map)
            .expect("the default delivery report regex is always valid")
    }

    /// Reads `receipted_message_id` and `message_state` from the PDU's
    /// optional parameters (spec §4.2, `handle_pdu`).
    pub fn handle_pdu(&self, pdu: &PduView) -> DeliveryReportOutcome {
        let (Some(receipted_message_id), Some(message_state)) = (
            pdu.optional.receipted_message_id(),
            pdu.optional.message_state(),
        ) else {
            return DeliveryReportOutcome::NotHandled;
        };

        let state_name = message_state_name(message_state);
        let status = self.status_map.resolve(state_name);

        DeliveryReportOutcome::Handled {
            receipted_message_id,
            status,
        }
    }

    /// Matches the configured regex against free text (spec §4.2,
    /// `handle_text`). A regex mismatch is a normal non-event, not an error.
    pub fn handle_text(&self, content: &str) -> DeliveryReportOutcome {
        let Some(captures) = self.regex.captures(content) else {
            return DeliveryReportOutcome::NotHandled;
        };

        let id = captures.name("id").map(|m| m.as_str()).unwrap_or("");
        let stat = captures.name("stat").map(|m| m.as_str()).unwrap_or("");

        DeliveryReportOutcome::Handled {
            receipted_message_id: id.to_string(),
            status: self.status_map.resolve(stat),
        }
    }

    /// Runs `handle_pdu` and, if the PDU was a delivery report, emits the
    /// result to `sink` (spec §4.2's "emit to the transport" half).
    pub async fn process_pdu(&self, pdu: &PduView, sink: &impl InboundSink) -> DeliveryReportOutcome {
        let outcome = self.handle_pdu(pdu);
        self.dispatch(&outcome, sink).await;
        outcome
    }

    /// Runs `handle_text` and, if the text matched, emits the result to
    /// `sink` (spec §4.2's "emit to the transport" half).
    pub async fn process_text(&self, content: &str, sink: &impl InboundSink) -> DeliveryReportOutcome {
        let outcome = self.handle_text(content);
        self.dispatch(&outcome, sink).await;
        outcome
    }

    async fn dispatch(&self, outcome: &DeliveryReportOutcome, sink: &impl InboundSink) {
        if let DeliveryReportOutcome::Handled { receipted_message_id, status } = outcome {
            sink.handle_delivery_report(receipted_message_id.clone(), *status).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::datatypes::{Tlv, tags};
    use crate::pdu::{MandatoryParameters, OptionalParameters};

    fn processor() -> DeliveryReportProcessor {
        DeliveryReportProcessor::with_default_regex(DeliveryStatusMap::default())
    }

    fn empty_mandatory() -> MandatoryParameters {
        MandatoryParameters {
            source_addr: "1234".to_string(),
            destination_addr: "5678".to_string(),
            short_message: Bytes::new(),
            data_coding: 0,
        }
    }

    #[test]
    fn pdu_delivery_receipt_scenario() {
        // spec §8 scenario 1
        let mut optional = OptionalParameters::new();
        optional.insert(Tlv::new(tags::RECEIPTED_MESSAGE_ID, Bytes::from_static(b"abc123")));
        optional.insert(Tlv::new(tags::MESSAGE_STATE, Bytes::from_static(&[2])));
        let pdu = PduView {
            mandatory: empty_mandatory(),
            optional,
        };

        match processor().handle_pdu(&pdu) {
            DeliveryReportOutcome::Handled {
                receipted_message_id,
                status,
            } => {
                assert_eq!(receipted_message_id, "abc123");
                assert_eq!(status, DeliveryStatus::Delivered);
            }
            DeliveryReportOutcome::NotHandled => panic!("expected handled"),
        }
    }

    #[test]
    fn pdu_missing_fields_not_handled() {
        let pdu = PduView {
            mandatory: empty_mandatory(),
            optional: OptionalParameters::new(),
        };
        assert!(matches!(
            processor().handle_pdu(&pdu),
            DeliveryReportOutcome::NotHandled
        ));
    }

    #[test]
    fn regex_delivery_receipt_scenario() {
        // spec §8 scenario 2
        let text = "id:XYZ sub:001 dlvrd:001 submit date:1401010000 done date:1401010005 stat:DELIVRD err:000 text:Hello";
        match processor().handle_text(text) {
            DeliveryReportOutcome::Handled {
                receipted_message_id,
                status,
            } => {
                assert_eq!(receipted_message_id, "XYZ");
                assert_eq!(status, DeliveryStatus::Delivered);
            }
            DeliveryReportOutcome::NotHandled => panic!("expected handled"),
        }
    }

    #[test]
    fn regex_mismatch_is_not_handled() {
        assert!(matches!(
            processor().handle_text("this is not a delivery report"),
            DeliveryReportOutcome::NotHandled
        ));
    }

    #[test]
    fn wrong_length_sub_field_is_not_handled() {
        // sub/dlvrd/err are fixed 3-character fields in the original grammar;
        // a malformed report with a 1-character sub must not match.
        let text = "id:ABC sub:1 dlvrd:001 submit date:1401010000 done date:1401010005 stat:DELIVRD err:000 text:Hi";
        assert!(matches!(
            processor().handle_text(text),
            DeliveryReportOutcome::NotHandled
        ));
    }

    #[test]
    fn unknown_stat_degrades_to_pending() {
        let text = "id:ABC sub:001 dlvrd:001 submit date:1401010000 done date:1401010005 stat:WOTNOT err:000 text:Hi";
        match processor().handle_text(text) {
            DeliveryReportOutcome::Handled { status, .. } => {
                assert_eq!(status, DeliveryStatus::Pending);
            }
            DeliveryReportOutcome::NotHandled => panic!("expected handled"),
        }
    }

    #[test]
    fn out_of_range_message_state_maps_to_unknown_then_pending() {
        let mut optional = OptionalParameters::new();
        optional.insert(Tlv::new(tags::RECEIPTED_MESSAGE_ID, Bytes::from_static(b"id1")));
        optional.insert(Tlv::new(tags::MESSAGE_STATE, Bytes::from_static(&[99])));
        let pdu = PduView {
            mandatory: empty_mandatory(),
            optional,
        };

        match processor().handle_pdu(&pdu) {
            DeliveryReportOutcome::Handled { status, .. } => {
                assert_eq!(status, DeliveryStatus::Pending);
            }
            DeliveryReportOutcome::NotHandled => panic!("expected handled"),
        }
    }

    #[test]
    fn vendor_oddity_zero_maps_to_delivered() {
        let map = DeliveryStatusMap::default();
        assert_eq!(map.resolve("0"), DeliveryStatus::Delivered);
    }

    #[test]
    fn canonical_values_are_idempotent() {
        let map = DeliveryStatusMap::default();
        assert_eq!(map.resolve("delivered"), DeliveryStatus::Delivered);
        assert_eq!(map.resolve("failed"), DeliveryStatus::Failed);
        assert_eq!(map.resolve("pending"), DeliveryStatus::Pending);
    }

    #[test]
    fn invalid_regex_is_a_config_error() {
        let err = DeliveryReportProcessor::new("(unclosed", DeliveryStatusMap::default());
        assert!(matches!(err, Err(ConfigError::InvalidRegex(_))));
    }

    #[tokio::test]
    async fn process_pdu_dispatches_to_sink() {
        use crate::sink::test_support::RecordingSink;

        let mut optional = OptionalParameters::new();
        optional.insert(Tlv::new(tags::RECEIPTED_MESSAGE_ID, Bytes::from_static(b"abc123")));
        optional.insert(Tlv::new(tags::MESSAGE_STATE, Bytes::from_static(&[2])));
        let pdu = PduView {
            mandatory: empty_mandatory(),
            optional,
        };

        let sink = RecordingSink::default();
        processor().process_pdu(&pdu, &sink).await;

        let reports = sink.delivery_reports.lock().unwrap();
        assert_eq!(reports.as_slice(), &[("abc123".to_string(), DeliveryStatus::Delivered)]);
    }

    #[tokio::test]
    async fn process_pdu_dispatches_nothing_when_not_handled() {
        use crate::sink::test_support::RecordingSink;

        let pdu = PduView {
            mandatory: empty_mandatory(),
            optional: OptionalParameters::new(),
        };

        let sink = RecordingSink::default();
        processor().process_pdu(&pdu, &sink).await;
        assert!(sink.delivery_reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn process_text_dispatches_to_sink() {
        use crate::sink::test_support::RecordingSink;

        let text = "id:XYZ sub:001 dlvrd:001 submit date:1401010000 done date:1401010005 stat:DELIVRD err:000 text:Hello";
        let sink = RecordingSink::default();
        processor().process_text(text, &sink).await;

        let reports = sink.delivery_reports.lock().unwrap();
        assert_eq!(reports.as_slice(), &[("XYZ".to_string(), DeliveryStatus::Delivered)]);
    }
}
