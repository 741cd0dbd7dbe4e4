//! External service gateways: the GSA per-diem client and the
//! receipt-parsing providers.

pub mod gsa;
pub mod providers;

pub use gsa::{GsaClient, GsaError, RateLocation};
