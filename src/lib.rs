//! Message-processing core for an SMPP gateway: character-set decoding,
//! multipart reassembly, USSD session tracking, delivery-report
//! interpretation, and outbound long-message segmentation policy.
//!
//! This crate deliberately does not speak the SMPP wire protocol — it
//! consumes already-decoded PDUs (see [`pdu::PduView`]) and drives three
//! collaborator traits ([`store::MessageStore`], [`protocol::ProtocolSender`],
//! [`sink::InboundSink`]) that a surrounding transport supplies. That
//! split keeps this core reentrant and free of any socket or TCP
//! session-management concern.
//!
//! # Example
//!
//! ```rust,no_run
//! use smpp_gateway_core::GatewayConfig;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::builder()
//!     .send_multipart_sar(true)
//!     .build()?;
//!
//! let _deliver = config.build_deliver_processor();
//! let _submit = config.build_submit_processor();
//! let _delivery_report = config.build_delivery_report_processor()?;
//! # Ok(())
//! # }
//! ```

pub mod codec_table;
pub mod config;
pub mod datatypes;
pub mod deliver;
pub mod delivery_report;
pub mod error;
pub mod message;
pub mod multipart;
pub mod pdu;
pub mod protocol;
pub mod sink;
pub mod store;
pub mod submit;

pub use config::GatewayConfig;
pub use deliver::DeliverProcessor;
pub use delivery_report::DeliveryReportProcessor;
pub use error::{CoreError, CoreResult};
pub use pdu::PduView;
pub use sink::InboundSink;
pub use store::MessageStore;
pub use submit::SubmitProcessor;
