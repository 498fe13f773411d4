use std::sync::Arc;
use wfcore::{
    ac::Roles,
    content::{
        Content,
        traits::ContentBackend,
    },
    workflow::WorkflowSettings,
};
use wfdb_sqlite::SqliteBackend;
use wfrbac::Builder;

use crate::platform::Platform;
use test_wf::ctrl::GRANTS;

// XXX this is a DIRECT copy of `test_wf::ctrl::create_sqlite_platform`,
// as the `Platform` returned by that one is the one from the `wfctrl`
// built as a dependency of `test-wf`, which is a distinct type from
// `crate::platform::Platform` while building the tests of this crate.
// possibly related issue: https://github.com/rust-lang/cargo/issues/8639
pub async fn create_sqlite_platform() -> anyhow::Result<Platform> {
    let backend = Arc::new(SqliteBackend::from_url("sqlite::memory:").await?);
    let resolver = Builder::new()
        .grants(GRANTS)?
        .build_simple()?;
    let platform = Platform::new(backend.clone(), backend, Arc::new(resolver));
    let editorial = platform.create_workflow(
        "editorial",
        "Editorial",
        WorkflowSettings::default(),
        false,
    ).await?;
    for (label, weight) in [
        ("Draft", 1),
        ("Review", 2),
        ("Published", 3),
    ] {
        editorial.create_state(label, weight).await?;
    }
    for (from, to, roles, label) in [
        ("editorial_creation", "editorial_draft", &["authenticated"][..], None),
        ("editorial_draft", "editorial_draft", &["authenticated"][..], None),
        ("editorial_draft", "editorial_review", &["workflow_author", "editor"][..], None),
        ("editorial_review", "editorial_draft", &["editor"][..], Some("Back to draft")),
        ("editorial_review", "editorial_review", &["authenticated"][..], None),
        ("editorial_review", "editorial_published", &["editor"][..], None),
        ("editorial_published", "editorial_draft", &["editor"][..], None),
        ("editorial_published", "editorial_published", &["authenticated"][..], None),
    ] {
        let rule = editorial.create_rule(from, to).await?;
        editorial.set_rule_roles(&rule.id, roles.iter().copied().collect::<Roles>()).await?;
        if label.is_some() {
            editorial.set_rule_label(&rule.id, label).await?;
        }
    }
    platform.bind_field("node", "field_state", "editorial").await?;
    for content in [
        Content::new("node", 1, Some(2)).with_field("field_state", "editorial_draft"),
        Content::new("node", 2, Some(2)).with_field("field_state", "editorial_review"),
        Content::new("node", 3, Some(1)).with_field("field_state", "editorial_published"),
        Content::new("node", 4, Some(2)),
    ] {
        platform.content.save_content(&content).await?;
    }
    Ok(platform)
}
