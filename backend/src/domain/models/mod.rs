//! Domain model types, independent of storage and transport concerns.

pub mod account;
pub mod client;
pub mod inventory;
pub mod invoice;
pub mod job;
pub mod quote;
