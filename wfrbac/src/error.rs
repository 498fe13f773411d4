#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Builder Error")]
    Builder,
    #[error("Malformed grant: {0}")]
    MalformedGrant(String),
    #[cfg(feature = "casbin")]
    #[error(transparent)]
    Casbin(#[from] casbin::Error),
}
