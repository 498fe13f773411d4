use std::sync::Arc;
use wfcore::{
    ac::traits::RoleResolver,
    content::traits::ContentBackend,
    platform::WFPlatform,
};

use crate::hook::HookRegistry;

mod builder;
mod impls;
pub use builder::Builder;
pub use impls::{
    PurgeReport,
    SweepReport,
};

#[derive(Clone)]
pub struct Platform {
    pub wf_platform: Arc<dyn WFPlatform>,
    pub content: Arc<dyn ContentBackend>,
    pub resolver: Arc<dyn RoleResolver>,
    pub(crate) hooks: Arc<HookRegistry>,
}
