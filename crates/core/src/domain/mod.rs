pub mod contract;
pub mod ranking;
pub mod vote;
