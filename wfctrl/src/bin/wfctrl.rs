use clap::{
    Parser,
    Subcommand,
};
use std::time::Duration;
use wfcore::{
    ac::{
        Agent,
        Roles,
    },
    content::Content,
    history::{
        HistoryOrder,
        HistoryQuery,
    },
    rule::RuleFilter,
    state::StateFilter,
    transition::{
        EntityRef,
        TransitionInstance,
    },
    workflow::WorkflowSettings,
};
use wfctrl::{
    context::RequestContext,
    platform::{
        Builder as PlatformBuilder,
        Platform,
    },
};

#[derive(Debug, Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[clap(flatten)]
    platform_builder: PlatformBuilder,
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(arg_required_else_help = true)]
    Workflow {
        #[command(subcommand)]
        cmd: WorkflowCmd,
    },
    #[command(arg_required_else_help = true)]
    State {
        #[command(subcommand)]
        cmd: StateCmd,
    },
    #[command(arg_required_else_help = true)]
    Rule {
        #[command(subcommand)]
        cmd: RuleCmd,
    },
    #[command(arg_required_else_help = true)]
    Field {
        #[command(subcommand)]
        cmd: FieldCmd,
    },
    #[command(arg_required_else_help = true)]
    Content {
        #[command(subcommand)]
        cmd: ContentCmd,
    },
    #[command(arg_required_else_help = true)]
    Transition {
        #[command(subcommand)]
        cmd: TransitionCmd,
    },
    #[command(arg_required_else_help = true)]
    History {
        #[command(subcommand)]
        cmd: HistoryCmd,
    },
    /// Execute the scheduled transitions that are due.
    Cron {
        /// Keep sweeping, pausing this many seconds in between.
        #[clap(long)]
        interval: Option<u64>,
    },
}

#[derive(Debug, Subcommand)]
enum WorkflowCmd {
    #[command(arg_required_else_help = true)]
    Add {
        id: String,
        label: String,
        /// Skip the creation state, as the import brings its own.
        #[clap(long)]
        bulk_import: bool,
    },
    List,
    #[command(arg_required_else_help = true)]
    Show {
        id: String,
    },
    /// Replace the settings with the provided JSON.
    #[command(arg_required_else_help = true)]
    Settings {
        id: String,
        settings: String,
    },
}

#[derive(Debug, Subcommand)]
enum StateCmd {
    #[command(arg_required_else_help = true)]
    Add {
        workflow_id: String,
        label: String,
        #[clap(long, default_value = "0")]
        weight: i64,
    },
    #[command(arg_required_else_help = true)]
    List {
        workflow_id: String,
        #[clap(long, value_enum, default_value = "all")]
        filter: StateFilter,
    },
    #[command(arg_required_else_help = true)]
    Deactivate {
        workflow_id: String,
        sid: String,
        #[clap(long)]
        reassign_to: Option<String>,
        #[clap(long)]
        uid: Option<i64>,
    },
    #[command(arg_required_else_help = true)]
    Purge {
        workflow_id: String,
        sid: String,
    },
}

#[derive(Debug, Subcommand)]
enum RuleCmd {
    #[command(arg_required_else_help = true)]
    Add {
        workflow_id: String,
        /// Use an empty string for any state.
        from_sid: String,
        to_sid: String,
        #[clap(long, value_delimiter = ',')]
        roles: Vec<String>,
        #[clap(long)]
        label: Option<String>,
    },
    #[command(arg_required_else_help = true)]
    List {
        workflow_id: String,
        #[clap(long)]
        from_sid: Option<String>,
        #[clap(long)]
        to_sid: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum FieldCmd {
    #[command(arg_required_else_help = true)]
    Bind {
        entity_type: String,
        field_name: String,
        workflow_id: String,
    },
    List {
        #[clap(long)]
        workflow_id: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ContentCmd {
    #[command(arg_required_else_help = true)]
    Add {
        entity_type: String,
        entity_id: i64,
        #[clap(long)]
        owner: Option<i64>,
    },
    #[command(arg_required_else_help = true)]
    Show {
        entity_type: String,
        entity_id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum TransitionCmd {
    #[command(arg_required_else_help = true)]
    Execute {
        entity_type: String,
        entity_id: i64,
        field_name: String,
        to_sid: String,
        #[clap(long)]
        uid: Option<i64>,
        #[clap(long)]
        comment: Option<String>,
        #[clap(long)]
        force: bool,
        /// Schedule for the provided timestamp instead.
        #[clap(long)]
        at: Option<i64>,
    },
    #[command(arg_required_else_help = true)]
    Options {
        entity_type: String,
        entity_id: i64,
        field_name: String,
        #[clap(long)]
        uid: Option<i64>,
    },
    /// Advance the item to the state following its current one.
    #[command(arg_required_else_help = true)]
    Next {
        entity_type: String,
        entity_id: i64,
        field_name: String,
        #[clap(long)]
        uid: Option<i64>,
    },
    #[command(arg_required_else_help = true)]
    Pending {
        entity_type: String,
        entity_id: i64,
        field_name: String,
    },
}

#[derive(Debug, Subcommand)]
enum HistoryCmd {
    #[command(arg_required_else_help = true)]
    List {
        entity_type: String,
        entity_ids: Vec<i64>,
        #[clap(long)]
        field_name: Option<String>,
        #[clap(long, value_enum, default_value = "desc")]
        order: HistoryOrder,
        #[clap(long)]
        limit: Option<i64>,
        #[clap(long)]
        offset: Option<i64>,
    },
    #[command(arg_required_else_help = true)]
    Revert {
        hid: i64,
        #[clap(long)]
        uid: Option<i64>,
    },
}

#[async_std::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    stderrlog::new()
        .module(module_path!())
        .module("wfctrl")
        .module("wfdb_sqlite")
        .verbosity((args.verbose as usize) + 1)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .unwrap();

    let platform = args.platform_builder
        .build()
        .await
        .map_err(anyhow::Error::from_boxed)?;

    match args.command {
        Commands::Workflow { cmd } => {
            parse_workflow(&platform, cmd).await?;
        },
        Commands::State { cmd } => {
            parse_state(&platform, cmd).await?;
        },
        Commands::Rule { cmd } => {
            parse_rule(&platform, cmd).await?;
        },
        Commands::Field { cmd } => {
            parse_field(&platform, cmd).await?;
        },
        Commands::Content { cmd } => {
            parse_content(&platform, cmd).await?;
        },
        Commands::Transition { cmd } => {
            parse_transition(&platform, cmd).await?;
        },
        Commands::History { cmd } => {
            parse_history(&platform, cmd).await?;
        },
        Commands::Cron { interval } => {
            cron(&platform, interval).await?;
        },
    }

    Ok(())
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

async fn parse_workflow(
    platform: &Platform,
    arg: WorkflowCmd,
) -> anyhow::Result<()> {
    match arg {
        WorkflowCmd::Add { id, label, bulk_import } => {
            let ctrl = platform.create_workflow(
                &id,
                &label,
                WorkflowSettings::default(),
                bulk_import,
            ).await?;
            println!("created workflow {}", ctrl.workflow().id);
        }
        WorkflowCmd::List => {
            for workflow in platform.list_workflows().await?.iter() {
                println!("{}: {}", workflow.id, workflow.label);
            }
        }
        WorkflowCmd::Show { id } => {
            let ctrl = platform.get_workflow(&id).await?;
            println!("{}", serde_json::to_string_pretty(ctrl.workflow())?);
            println!("states:");
            for state in ctrl.get_states(StateFilter::All).await?.iter() {
                let flag = if state.active { " " } else { "x" };
                println!("[{flag}] {} ({}, weight {})", state.id, state.label, state.weight);
            }
            println!("rules:");
            for rule in ctrl.get_rules(&RuleFilter::default()).await?.iter() {
                println!("- {}: {} -> {} [{}]", rule.id, rule.from_sid, rule.to_sid, rule.roles);
            }
            if !ctrl.is_valid().await? {
                println!("workflow {id} is not valid; see the log for details");
            }
        }
        WorkflowCmd::Settings { id, settings } => {
            let settings: WorkflowSettings = serde_json::from_str(&settings)?;
            let mut ctrl = platform.get_workflow(&id).await?;
            ctrl.update_settings(settings).await?;
            println!("updated settings of workflow {id}");
        }
    }
    Ok(())
}

async fn parse_state(
    platform: &Platform,
    arg: StateCmd,
) -> anyhow::Result<()> {
    match arg {
        StateCmd::Add { workflow_id, label, weight } => {
            let ctrl = platform.get_workflow(&workflow_id).await?;
            let state = ctrl.create_state(&label, weight).await?;
            println!("state {} in workflow {workflow_id}", state.id);
        }
        StateCmd::List { workflow_id, filter } => {
            let ctrl = platform.get_workflow(&workflow_id).await?;
            for state in ctrl.get_states(filter).await?.iter() {
                println!("{} ({})", state.id, state.label);
            }
        }
        StateCmd::Deactivate { workflow_id, sid, reassign_to, uid } => {
            let ctrl = platform.get_workflow(&workflow_id).await?;
            let mut ctx = RequestContext::new();
            let moved = ctrl.deactivate_state(
                &mut ctx,
                &sid,
                reassign_to.as_deref(),
                Agent::from(uid),
            ).await?;
            println!("deactivated state {sid}; {moved} item(s) reassigned");
        }
        StateCmd::Purge { workflow_id, sid } => {
            let ctrl = platform.get_workflow(&workflow_id).await?;
            let report = ctrl.purge_state(&sid).await?;
            println!(
                "purged state {sid} along with {} rule(s) and {} history record(s)",
                report.rules,
                report.history,
            );
        }
    }
    Ok(())
}

async fn parse_rule(
    platform: &Platform,
    arg: RuleCmd,
) -> anyhow::Result<()> {
    match arg {
        RuleCmd::Add { workflow_id, from_sid, to_sid, roles, label } => {
            let ctrl = platform.get_workflow(&workflow_id).await?;
            let rule = ctrl.create_rule(&from_sid, &to_sid).await?;
            let rule = ctrl.set_rule_roles(&rule.id, roles.into_iter().collect::<Roles>()).await?;
            let rule = match label {
                Some(label) => ctrl.set_rule_label(&rule.id, Some(&label)).await?,
                None => rule,
            };
            println!("rule {}: {} -> {} [{}]", rule.id, rule.from_sid, rule.to_sid, rule.roles);
        }
        RuleCmd::List { workflow_id, from_sid, to_sid } => {
            let ctrl = platform.get_workflow(&workflow_id).await?;
            let rules = ctrl.get_rules(&RuleFilter { from_sid, to_sid }).await?;
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }
    Ok(())
}

async fn parse_field(
    platform: &Platform,
    arg: FieldCmd,
) -> anyhow::Result<()> {
    match arg {
        FieldCmd::Bind { entity_type, field_name, workflow_id } => {
            platform.bind_field(&entity_type, &field_name, &workflow_id).await?;
            println!("bound {entity_type}.{field_name} to workflow {workflow_id}");
        }
        FieldCmd::List { workflow_id } => {
            for field in platform.list_fields(workflow_id.as_deref()).await?.iter() {
                println!("{}.{}: {}", field.entity_type, field.field_name, field.workflow_id);
            }
        }
    }
    Ok(())
}

async fn parse_content(
    platform: &Platform,
    arg: ContentCmd,
) -> anyhow::Result<()> {
    match arg {
        ContentCmd::Add { entity_type, entity_id, owner } => {
            let target = EntityRef::new(&entity_type, entity_id);
            if platform.content.load_content(&target).await?.is_some() {
                println!("content {target} already exists");
                return Ok(());
            }
            let mut content = Content::new(&entity_type, entity_id, owner);
            content.changed = now();
            platform.content.save_content(&content).await?;
            println!("added content {target}");
        }
        ContentCmd::Show { entity_type, entity_id } => {
            let target = EntityRef::new(&entity_type, entity_id);
            match platform.content.load_content(&target).await? {
                Some(content) => {
                    println!("{target} owned by {:?}, changed at {}", content.owner_id(), content.changed_time());
                    for field_name in content.field_names() {
                        println!("- {field_name}: {}", content.field_value(&field_name).unwrap_or_default());
                    }
                }
                None => println!("no content {target}"),
            }
        }
    }
    Ok(())
}

async fn parse_transition(
    platform: &Platform,
    arg: TransitionCmd,
) -> anyhow::Result<()> {
    let mut ctx = RequestContext::new();
    match arg {
        TransitionCmd::Execute {
            entity_type,
            entity_id,
            field_name,
            to_sid,
            uid,
            comment,
            force,
            at,
        } => {
            let workflow = platform.get_workflow_for_field(&entity_type, &field_name).await?
                .into_inner();
            let mut instance = TransitionInstance::new(
                &workflow.id,
                EntityRef::new(&entity_type, entity_id),
                &field_name,
                "",
                &to_sid,
                Agent::from(uid),
                now(),
            );
            if let Some(comment) = comment {
                instance = instance.comment(comment);
            }
            if let Some(at) = at {
                instance = instance.schedule_at(at);
            }
            let sid = platform.execute_and_update_entity(&mut ctx, &mut instance, force).await?;
            println!("{} is now in state {sid} ({})", instance.target, instance.status);
        }
        TransitionCmd::Options { entity_type, entity_id, field_name, uid } => {
            let target = EntityRef::new(&entity_type, entity_id);
            let workflow = platform.get_workflow_for_field(&entity_type, &field_name).await?
                .into_inner();
            let content = platform.content.load_content(&target).await?
                .ok_or_else(|| anyhow::anyhow!("no content {target}"))?;
            let current = platform.current_sid(&workflow.id, &*content, &field_name).await?;
            let options = platform.get_options(
                &mut ctx,
                &*content,
                &field_name,
                &Agent::from(uid),
                &current,
                false,
            ).await?;
            println!("{target} is in state {current}; options:");
            for option in options.iter() {
                println!("- {option}");
            }
        }
        TransitionCmd::Next { entity_type, entity_id, field_name, uid } => {
            let target = EntityRef::new(&entity_type, entity_id);
            let agent = Agent::from(uid);
            let workflow = platform.get_workflow_for_field(&entity_type, &field_name).await?
                .into_inner();
            let content = platform.content.load_content(&target).await?
                .ok_or_else(|| anyhow::anyhow!("no content {target}"))?;
            let next = platform.get_next_sid(&mut ctx, &*content, &field_name, &agent, false).await?;
            let mut instance = TransitionInstance::new(
                &workflow.id,
                target,
                &field_name,
                "",
                &next,
                agent,
                now(),
            );
            let sid = platform.execute_and_update_entity(&mut ctx, &mut instance, false).await?;
            println!("{} is now in state {sid} ({})", instance.target, instance.status);
        }
        TransitionCmd::Pending { entity_type, entity_id, field_name } => {
            let target = EntityRef::new(&entity_type, entity_id);
            match platform.pending_for(&target, &field_name).await? {
                Some(instance) => println!("{}", serde_json::to_string_pretty(&instance)?),
                None => println!("nothing pending for {target} [{field_name}]"),
            }
        }
    }
    Ok(())
}

async fn parse_history(
    platform: &Platform,
    arg: HistoryCmd,
) -> anyhow::Result<()> {
    match arg {
        HistoryCmd::List { entity_type, entity_ids, field_name, order, limit, offset } => {
            let query = HistoryQuery {
                entity_type,
                entity_ids,
                field_name,
                order,
                limit,
                offset,
            };
            for record in platform.find_history(&query).await?.iter() {
                println!("{record}");
            }
        }
        HistoryCmd::Revert { hid, uid } => {
            let mut ctx = RequestContext::new();
            let sid = platform.revert(&mut ctx, hid, Agent::from(uid)).await?;
            println!("reverted history record {hid}; item is now in state {sid}");
        }
    }
    Ok(())
}

async fn cron(
    platform: &Platform,
    interval: Option<u64>,
) -> anyhow::Result<()> {
    loop {
        let mut ctx = RequestContext::new();
        let report = platform.run_due(&mut ctx, now()).await?;
        log::info!(
            "sweep: {} executed, {} discarded, {} rejected",
            report.executed,
            report.discarded,
            report.rejected,
        );
        match interval {
            Some(secs) => async_std::task::sleep(Duration::from_secs(secs)).await,
            None => break,
        }
    }
    Ok(())
}
