//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`](neterror::NetError): Network error codes matching `net_error_list.h`,
//!   extended with the exchange-level failures raised by redirect and filter handling.

pub mod neterror;
