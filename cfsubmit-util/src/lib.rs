#![warn(clippy::all)]

#[macro_use]
extern crate strum;

use lazy_static::lazy_static;

pub mod abs_path;
pub mod console;
mod error;
mod macros;
pub mod model;
pub mod service;

pub use error::EngineError;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

lazy_static! {
    /// Directory searched last for a config file.
    pub static ref CONFIG_DIR: Option<abs_path::AbsPathBuf> = dirs::config_dir()
        .and_then(|dir| abs_path::AbsPathBuf::try_new(dir.join("cfsubmit")).ok());
}
