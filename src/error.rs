/// Crate-wide error type.
///
/// Never crosses the `ffi` boundary as a Rust value — the ABI reports
/// failure by returning a null pointer or a zero-length result (see
/// `ffi::mod`).
#[derive(Debug, thiserror::Error)]
pub enum ParattiError {
    #[error("invalid input: {0}")]
    InputError(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("buffer too small: need {required}, got {provided}")]
    CapacityError { required: usize, provided: usize },
}

pub type ParattiResult<T> = Result<T, ParattiError>;
