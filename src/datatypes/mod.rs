mod tlv;

pub use tlv::{Tlv, tags};
