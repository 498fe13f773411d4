pub mod context;
pub mod error;
pub mod handle;
pub mod hook;
pub mod platform;
#[cfg(test)]
mod testing;

pub(crate) mod chrono {
    #[cfg(not(test))]
    pub use ::chrono::Utc;
    #[cfg(test)]
    pub use test_wf::chrono::Utc;
}
