mod builder;
#[cfg(feature = "casbin")]
pub mod casbin;
pub mod error;
pub mod simple;

pub use builder::Builder;
pub use wfcore::ac::traits::RoleResolver;
