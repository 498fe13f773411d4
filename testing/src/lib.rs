#[cfg(feature = "chrono")]
pub mod chrono;
pub mod core;
#[cfg(feature = "platform")]
pub mod ctrl;
