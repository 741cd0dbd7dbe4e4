//! HTTP handlers for the expense backend.

pub mod per_diem;
pub mod receipts;
