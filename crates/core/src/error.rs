#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input rejected at the boundary. The message is shown to the client as-is.
    #[error("{0}")]
    Validation(String),
}
