//! Types shared between the labeldesk service and its clients.

pub mod model;
pub mod requests;
pub mod responses;
