//! # BidGPT Channels
//!
//! Outbound delivery. Today that is a single SMTP mailer used by the
//! `/feedback` endpoint.

pub mod email;

pub use email::{FeedbackMessage, SmtpMailer};
