use std::sync::Arc;
use wfcore::{
    ac::Roles,
    content::{
        Content,
        traits::ContentBackend,
    },
    workflow::WorkflowSettings,
};
use wfctrl::platform::Platform;
use wfdb_sqlite::SqliteBackend;
use wfrbac::Builder;

/// Grants used by the fixture: user 1 edits, user 3 administers and
/// bypasses the rules of the editorial workflow.  User 2 owns most of
/// the content and holds no role of its own.
pub const GRANTS: &str = "\
u:1, editor
u:3, admin
admin, bypass editorial workflow_transition access
";

/// A platform on an in-memory database, seeded with the `editorial`
/// workflow bound to `field_state` of `node`, and nodes 1 to 4 in draft,
/// review, published and no state respectively.
pub async fn create_sqlite_platform() -> anyhow::Result<Platform> {
    let backend = Arc::new(SqliteBackend::from_url("sqlite::memory:").await?);
    let resolver = Builder::new()
        .grants(GRANTS)?
        .build_simple()?;
    let platform = Platform::new(backend.clone(), backend, Arc::new(resolver));
    seed_editorial(&platform).await?;
    Ok(platform)
}

pub async fn seed_editorial(platform: &Platform) -> anyhow::Result<()> {
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
    Ok(())
}
