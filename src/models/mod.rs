//! Domain Models Module
//!
//! Entity shapes the named cache instances store. The cache engine itself
//! treats these as opaque values.

mod check_in;
mod user;

pub use check_in::CheckIn;
pub use user::User;
