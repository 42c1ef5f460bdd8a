pub mod fetch;

#[cfg(test)]
pub(crate) mod test_server;

pub use fetch::{FetchOptions, RawResponse, fetch};
