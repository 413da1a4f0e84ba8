//! Concrete variable stores.

pub mod circleci;
pub mod terraform;
