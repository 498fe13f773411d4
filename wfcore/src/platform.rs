mod connector;
mod workflow_management;
pub use connector::ConnectorOption;
pub use workflow_management::{DefaultWFPlatform, WFPlatform};

pub trait PlatformUrl {
    fn url(&self) -> &str;
}
