//! # aide-adapters
//!
//! Thin HTTP adapters behind the `Calendar` and `Mailer` traits: Google
//! Calendar, Outlook Calendar (Microsoft Graph), and Gmail send. Each call
//! exchanges the session's refresh token for an access token first; no
//! token caching, no retries.

pub mod gmail;
pub mod google;
pub mod outlook;
mod token;

pub use gmail::GmailMailer;
pub use google::GoogleCalendar;
pub use outlook::OutlookCalendar;
