// ABOUTME: Load-time configuration surface, validated once and shared across processors
// ABOUTME: Builder mirrors the teacher crate's `with_*`-style message builders

use std::collections::HashMap;

use crate::codec_table::{CodecTable, DataCodingMap};
use crate::delivery_report::{DEFAULT_DELIVERY_REPORT_REGEX, DeliveryReportProcessor, DeliveryStatusMap};
use crate::deliver::DeliverProcessor;
use crate::error::{ConfigError, CoreResult};
use crate::message::DeliveryStatus;
use crate::submit::{LongMessagePolicy, SubmitProcessor};

/// The recognized configuration surface (spec §6, "Configuration surface").
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    delivery_report_regex: String,
    delivery_report_status_mapping: HashMap<String, DeliveryStatus>,
    data_coding_overrides: HashMap<u8, String>,
    submit_encoding: String,
    submit_data_coding: u8,
    send_long_messages: bool,
    send_multipart_sar: bool,
    send_multipart_udh: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            delivery_report_regex: DEFAULT_DELIVERY_REPORT_REGEX.to_string(),
            delivery_report_status_mapping: HashMap::new(),
            data_coding_overrides: HashMap::new(),
            submit_encoding: "utf-8".to_string(),
            submit_data_coding: 0,
            send_long_messages: false,
            send_multipart_sar: false,
            send_multipart_udh: false,
        }
    }
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Mutual exclusivity of the three long-message flags, checked at
    /// load time (spec §7, kind 5).
    fn post_validate(&self) -> Result<(), ConfigError> {
        let set: Vec<&'static str> = [
            (self.send_long_messages, "send_long_messages"),
            (self.send_multipart_sar, "send_multipart_sar"),
            (self.send_multipart_udh, "send_multipart_udh"),
        ]
        .into_iter()
        .filter_map(|(flag, name)| flag.then_some(name))
        .collect();

        if set.len() > 1 {
            return Err(ConfigError::MutuallyExclusiveLongMessageFlags(set));
        }

        regex::Regex::new(&self.delivery_report_regex)
            .map_err(|e| ConfigError::InvalidRegex(e.to_string()))?;

        Ok(())
    }

    fn long_message_policy(&self) -> LongMessagePolicy {
        if self.send_long_messages {
            LongMessagePolicy::Payload
        } else if self.send_multipart_sar {
            LongMessagePolicy::Sar
        } else if self.send_multipart_udh {
            LongMessagePolicy::Udh
        } else {
            LongMessagePolicy::None
        }
    }

    pub fn build_deliver_processor(&self) -> DeliverProcessor {
        let codec = CodecTable::new(DataCodingMap::new(self.data_coding_overrides.clone()));
        DeliverProcessor::new(codec)
    }

    pub fn build_submit_processor(&self) -> SubmitProcessor {
        SubmitProcessor::new(
            self.submit_encoding.clone(),
            self.submit_data_coding,
            self.long_message_policy(),
        )
    }

    pub fn build_delivery_report_processor(&self) -> CoreResult<DeliveryReportProcessor> {
        let status_map = DeliveryStatusMap::new(self.delivery_report_status_mapping.clone());
        DeliveryReportProcessor::new(&self.delivery_report_regex, status_map).map_err(Into::into)
    }
}

/// Builds a `GatewayConfig`, validating mutual exclusivity and regex
/// well-formedness once at `build()` (spec §7, kind 5 is fatal only here,
/// never per-message).
#[derive(Clone, Debug, Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn delivery_report_regex(mut self, pattern: impl Into<String>) -> Self {
        self.config.delivery_report_regex = pattern.into();
        self
    }

    pub fn delivery_report_status_mapping(mut self, overrides: HashMap<String, DeliveryStatus>) -> Self {
        self.config.delivery_report_status_mapping = overrides;
        self
    }

    pub fn data_coding_overrides(mut self, overrides: HashMap<u8, String>) -> Self {
        self.config.data_coding_overrides = overrides;
        self
    }

    pub fn submit_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.config.submit_encoding = encoding.into();
        self
    }

    pub fn submit_data_coding(mut self, data_coding: u8) -> Self {
        self.config.submit_data_coding = data_coding;
        self
    }

    pub fn send_long_messages(mut self, enabled: bool) -> Self {
        self.config.send_long_messages = enabled;
        self
    }

    pub fn send_multipart_sar(mut self, enabled: bool) -> Self {
        self.config.send_multipart_sar = enabled;
        self
    }

    pub fn send_multipart_udh(mut self, enabled: bool) -> Self {
        self.config.send_multipart_udh = enabled;
        self
    }

    pub fn build(self) -> Result<GatewayConfig, ConfigError> {
        self.config.post_validate()?;
        Ok(self.config)
    }
}
