//! # SirenHub Transport
//! Message delivery implementations behind the `Transport` trait.

pub mod sms;
pub mod testing;

pub use sms::SmsGateway;
pub use testing::RecordingTransport;
