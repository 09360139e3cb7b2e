/// Errors from the external quick page-count analyzer.
///
/// Probe failures are always recovered locally: the generator falls back to
/// a single placeholder page and the error never reaches the end consumer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The analyzer could not parse the payload.
    #[error("analyzer failed: {0}")]
    Analyzer(String),

    /// The analyzer does not handle this content type.
    #[error("unsupported content type: {0}")]
    Unsupported(String),
}
