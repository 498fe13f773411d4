pub mod agent;
pub mod role;
pub mod traits;

pub use self::agent::Agent;
pub use self::role::Roles;
