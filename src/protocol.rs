// ABOUTME: The protocol object SubmitProcessor dispatches onto — owns segmentation and wire encoding
// ABOUTME: Four primitives mirror spec.md §6 exactly; the core only ever selects which one to call

use std::future::Future;

use crate::error::ProtocolError;
use crate::pdu::OptionalParameters;

/// The SMPP send primitives a protocol object exposes (spec §6).
///
/// The protocol object owns actual segmentation and reference-number
/// allocation; `SubmitProcessor` only selects which primitive to call and
/// with what payload (spec §4.4).
pub trait ProtocolSender: Send + Sync {
    fn submit(
        &self,
        message_id: &str,
        to_addr: &[u8],
        short_message: &[u8],
        data_coding: u8,
        source_addr: &[u8],
        optional_parameters: OptionalParameters,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    fn submit_long(
        &self,
        message_id: &str,
        to_addr: &[u8],
        long_message: &[u8],
        data_coding: u8,
        source_addr: &[u8],
        optional_parameters: OptionalParameters,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    fn submit_sar(
        &self,
        message_id: &str,
        to_addr: &[u8],
        short_message: &[u8],
        data_coding: u8,
        source_addr: &[u8],
        optional_parameters: OptionalParameters,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    fn submit_udh(
        &self,
        message_id: &str,
        to_addr: &[u8],
        short_message: &[u8],
        data_coding: u8,
        source_addr: &[u8],
        optional_parameters: OptionalParameters,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;
}
