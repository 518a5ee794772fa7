// Common tools shared by handlers and middleware

pub mod envelope;
pub mod rate_limiter;
pub mod utils;
pub mod validation;

pub use envelope::{ApiReply, Envelope, FieldErrors};
