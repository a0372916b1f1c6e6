//! Wire-level HTTP dispatch

pub mod http;

pub use http::HttpClient;
