use thiserror::Error;

use eventa_core::backend::ApiError;
use eventa_core::config::ConfigError;
use eventa_core::export::ExportError;
use eventa_core::session::SessionError;
use eventa_core::users::UserError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("{}", .0)]
    Config(#[from] ConfigError),

    #[error("{}", .0)]
    Api(#[from] ApiError),

    #[error("{}", .0)]
    Session(#[from] SessionError),

    #[error("{}", .0)]
    Export(#[from] ExportError),

    #[error("{}", .0)]
    User(#[from] UserError),
}
