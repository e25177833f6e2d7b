mod client;
mod error;

pub use client::{EapiClient, FORMAT_JSON, FORMAT_TEXT, RUNNING_CONFIG_COMMANDS};
pub use error::EapiError;
