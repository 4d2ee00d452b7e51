use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("API error: {0}")]
    Api(#[from] audiostation_api::ApiError),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),
}
