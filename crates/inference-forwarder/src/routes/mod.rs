//! HTTP Routes

pub mod invoke;
