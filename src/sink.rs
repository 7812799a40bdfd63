// ABOUTME: The two outbound callbacks this core emits into — inbound messages and delivery reports
// ABOUTME: Generalizes spec.md's two free-function callbacks into one collaborator trait

use std::future::Future;

use crate::message::{DeliveryStatus, NormalizedInboundMessage};

/// Where `DeliverProcessor` and `DeliveryReportProcessor` dispatch their
/// results (spec §6, "Emitted" callbacks).
pub trait InboundSink: Send + Sync {
    fn handle_inbound(&self, message: NormalizedInboundMessage) -> impl Future<Output = ()> + Send;

    fn handle_delivery_report(
        &self,
        receipted_message_id: String,
        status: DeliveryStatus,
    ) -> impl Future<Output = ()> + Send;
}
