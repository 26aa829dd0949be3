//! Upstream traffic metrics providers.
//!
//! - [`RapidApiProvider`] - RapidAPI-hosted traffic endpoint

mod rapidapi_provider;

pub use rapidapi_provider::{RapidApiConfig, RapidApiProvider};
