//! Client code for sieve.
//!
//! This crate provides the HTTP side of the asset cache: a cache-busting
//! fetch client that implements [`sieve_core::assets::RemoteSource`].

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, FetchResponse};
