pub mod config;
pub mod email;
pub mod error;
pub mod http_client;
pub mod providers;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;
