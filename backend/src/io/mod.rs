//! # IO Layer
//!
//! Transport adapters over the domain services. REST is the only
//! interface; everything here is translation between HTTP and the domain.

pub mod rest;
