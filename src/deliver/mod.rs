//! Delivery clients for the two outward integrations.
//!
//! Each client is constructed once at startup from config; a missing
//! credential makes construction return `None`, and the handler maps
//! that to a configuration error before any send is attempted.

pub mod email;
pub mod newsletter;

pub use email::EmailSender;
pub use newsletter::{Attribution, ListClient, SubscriberStatus};
