use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error(transparent)]
    Api(#[from] yookye_core::api::ApiError),

    #[error(transparent)]
    Session(#[from] yookye_core::session::SessionError),

    #[error(transparent)]
    Travel(#[from] yookye_core::travel::TravelError),

    #[error(transparent)]
    Job(#[from] yookye_core::jobs::JobError),

    #[error("JSON: {}", .0)]
    Json(#[from] serde_json::Error),
}
