use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::Serialize;

use desk_jobs::{JobRunner, JobSnapshot, JobState};
use desk_sdk::{Desk, MergePlan};
use desk_server::DeskServer;
use desk_sla::{SlaEvaluator, SlaPolicy, SlaTimer, TicketSla};
use desk_store::{DeskState, InMemoryBackend};
use desk_types::{format_timestamp, FieldValue, Ticket, TicketId, Timestamp};

use crate::cli::*;
use crate::config::DeskConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = DeskConfig::load_or_default(cli.config.as_deref())?;
    let format = cli.format;
    match cli.command {
        Command::Sla(SlaArgs { action: SlaAction::Resolve { policies, ticket, now } }) => {
            let now = now.unwrap_or_else(chrono::Utc::now);
            let sla = cmd_sla_resolve(&config, &policies, &ticket, now)?;
            emit(format, &sla, || render_sla(&sla))
        }
        Command::Policy(PolicyArgs { action: PolicyAction::Validate { file } }) => {
            cmd_policy_validate(&file, format)
        }
        Command::Policy(PolicyArgs { action: PolicyAction::List { file } }) => {
            let policies = cmd_policy_list(&file)?;
            emit(format, &policies, || render_policies(&policies))
        }
        Command::Merge(MergeArgs { action: MergeAction::Plan(args) }) => cmd_merge_plan(args, format),
        Command::Job(JobArgs { action: JobAction::Simulate { name, steps, tick_ms, fail_at } }) => {
            let mut jobs = config.jobs.clone();
            if let Some(steps) = steps { jobs.steps = steps; }
            if let Some(tick_ms) = tick_ms { jobs.tick_ms = tick_ms; }
            if fail_at.is_some() { jobs.fail_at = fail_at; }
            let runner = JobRunner::new(jobs)?;
            cmd_job_simulate(runner, name, format)
        }
        Command::Serve(args) => cmd_serve(config, args),
        Command::Config => match format {
            OutputFormat::Text => { print!("{}", config.to_toml()?); Ok(()) }
            OutputFormat::Json => print_json(&config),
        },
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Text => { print!("{}", text()); Ok(()) }
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

// ---- sla ----

fn cmd_sla_resolve(config: &DeskConfig, policies: &Path, ticket: &Path, now: Timestamp) -> anyhow::Result<TicketSla> {
    let policies: Vec<SlaPolicy> = read_json(policies)?;
    let ticket: Ticket = read_json(ticket)?;
    let evaluator = SlaEvaluator::new(config.sla.clone(), policies)?;
    Ok(evaluator.evaluate(&ticket, now))
}

fn render_timer(label: &str, timer: &Option<SlaTimer>) -> String {
    match timer {
        Some(t) => {
            let remaining = if t.remaining.overdue {
                t.remaining.human_text.red().bold()
            } else {
                t.remaining.human_text.green()
            };
            format!("  {label}: {} ({remaining})\n", format_timestamp(&t.deadline))
        }
        None => format!("  {label}: {}\n", "no target".dimmed()),
    }
}

fn render_sla(sla: &TicketSla) -> String {
    let mut out = format!("Ticket {}\n", sla.ticket_id.to_string().bold());
    match (&sla.policy_id, &sla.policy_name) {
        (Some(id), Some(name)) => {
            out.push_str(&format!("  Policy: {} ({})\n", name.cyan(), id));
            out.push_str(&render_timer("First response", &sla.first_response));
            out.push_str(&render_timer("Resolution", &sla.resolution));
        }
        _ => out.push_str(&format!("  {}\n", "No SLA policy applies.".yellow())),
    }
    out
}

// ---- policy ----

fn cmd_policy_validate(file: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let policies: Vec<SlaPolicy> = read_json(file)?;
    let results: Vec<(String, Option<String>)> = policies
        .iter()
        .map(|p| (p.id.clone(), p.validate().err().map(|e| e.to_string())))
        .collect();
    let set_error = if results.iter().all(|(_, e)| e.is_none()) {
        SlaEvaluator::new(Default::default(), policies).err().map(|e| e.to_string())
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let report: Vec<_> = results
                .iter()
                .map(|(id, err)| serde_json::json!({ "id": id, "valid": err.is_none(), "error": err }))
                .collect();
            print_json(&serde_json::json!({ "policies": report, "error": set_error }))?;
        }
        OutputFormat::Text => {
            for (id, err) in &results {
                match err {
                    None => println!("{} {}", "✓".green(), id),
                    Some(e) => println!("{} {}: {}", "✗".red(), id, e),
                }
            }
            if let Some(e) = &set_error {
                println!("{} {}", "✗".red(), e);
            }
        }
    }

    let invalid = results.iter().filter(|(_, e)| e.is_some()).count();
    if invalid > 0 {
        bail!("{invalid} of {} policies are invalid", results.len());
    }
    if let Some(e) = set_error {
        bail!(e);
    }
    Ok(())
}

fn cmd_policy_list(file: &Path) -> anyhow::Result<Vec<SlaPolicy>> {
    let mut policies: Vec<SlaPolicy> = read_json(file)?;
    policies.sort_by_key(|p| p.order);
    Ok(policies)
}

fn render_policies(policies: &[SlaPolicy]) -> String {
    if policies.is_empty() {
        return "No SLA policies.\n".to_string();
    }
    policies
        .iter()
        .map(|p| format!("{:>3}. {} ({}) - {}\n", p.order, p.name.bold(), p.id.dimmed(), p.summary()))
        .collect()
}

// ---- merge ----

fn build_plan(tickets: Vec<Ticket>, args: &PlanArgs) -> anyhow::Result<(Desk, MergePlan)> {
    let ids: Vec<TicketId> = tickets.iter().map(|t| t.id.clone()).collect();
    let target = TicketId::new(args.target.clone());
    let desk = Desk::in_memory(DeskState::from_parts(tickets, vec![]));

    let rt = runtime()?;
    let mut plan = rt.block_on(desk.plan_merge(&ids, &target))?;
    plan.request.merge_messages = !args.no_messages;
    plan.request.copy_tags = !args.no_tags;
    plan.request.copy_custom_fields = !args.no_fields;
    plan.request.close_source_tickets = !args.keep_open;
    for (field, value) in &args.resolutions {
        plan.resolve(field, FieldValue::parse_loose(value))?;
    }
    Ok((desk, plan))
}

fn cmd_merge_plan(args: PlanArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tickets: Vec<Ticket> = read_json(&args.tickets)?;
    let (desk, plan) = build_plan(tickets, &args)?;
    let payload = plan.payload()?;

    let merged = if args.apply {
        let rt = runtime()?;
        let response = rt
            .block_on(desk.submit_merge(&plan))
            .map_err(|feedback| anyhow::anyhow!(feedback.to_string()))?;
        Some(rt.block_on(desk.backend().get_ticket(&response.target_ticket_id))?)
    } else {
        None
    };

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "conflicts": plan.conflicts,
            "payload": payload,
            "merged": merged,
        })),
        OutputFormat::Text => {
            println!(
                "Merging {} ticket(s) into {}",
                payload.source_ticket_ids.len(),
                payload.target_ticket_id.to_string().yellow().bold()
            );
            if plan.conflicts.is_empty() {
                println!("  {}", "No field conflicts.".green());
            }
            for conflict in &plan.conflicts {
                println!("  {} {}", "conflict".red(), conflict.field_key.bold());
                for cv in &conflict.values {
                    let marker = if cv.value == conflict.selected_value { "*".green() } else { " ".normal() };
                    println!("    {marker} {} = {}", cv.ticket_id, cv.value);
                }
            }
            let on = |b: bool| if b { "yes".green() } else { "no".dimmed() };
            println!("  Merge messages: {}", on(payload.merge_messages));
            println!("  Copy tags: {}", on(payload.copy_tags));
            println!("  Copy custom fields: {}", on(payload.copy_custom_fields.is_some()));
            println!("  Close sources: {}", on(payload.close_source_tickets));
            if let Some(target) = &merged {
                println!(
                    "{} Merged into {}: {} message(s), {} tag(s)",
                    "✓".green().bold(),
                    target.id,
                    target.messages.len(),
                    target.tags.len()
                );
            }
            Ok(())
        }
    }
}

// ---- job ----

fn cmd_job_simulate(runner: JobRunner, name: String, format: OutputFormat) -> anyhow::Result<()> {
    let rt = runtime()?;
    let done: JobSnapshot = rt.block_on(async {
        let handle = runner.spawn(name);
        let mut rx = handle.subscribe();
        if format == OutputFormat::Text {
            let mut last = None;
            loop {
                let snapshot = rx.borrow_and_update().clone();
                if last != Some(snapshot.progress) {
                    println!("  {:>3}% {}", snapshot.progress, snapshot.state);
                    last = Some(snapshot.progress);
                }
                if snapshot.is_terminal() || rx.changed().await.is_err() {
                    break;
                }
            }
        }
        handle.wait().await
    })?;

    match format {
        OutputFormat::Json => print_json(&done)?,
        OutputFormat::Text => match &done.state {
            JobState::Completed => println!("{} {} completed", "✓".green().bold(), done.name),
            JobState::Failed(reason) => println!("{} {} failed: {}", "✗".red().bold(), done.name, reason),
            other => println!("{} ended as {}", done.name, other),
        },
    }
    if let JobState::Failed(reason) = done.state {
        bail!(reason);
    }
    Ok(())
}

// ---- serve ----

fn cmd_serve(config: DeskConfig, args: ServeArgs) -> anyhow::Result<()> {
    let mut server_config = config.server;
    server_config.sla = config.sla;
    if let Some(bind) = args.bind {
        server_config = server_config.with_bind_str(&bind)?;
    }
    let state = match &args.state {
        Some(path) => DeskState::from_json(
            &std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        )?,
        None => DeskState::default(),
    };

    println!(
        "Desk API on {} ({} tickets, {} policies)",
        server_config.bind_addr.to_string().bold(),
        state.tickets.len(),
        state.policies.len()
    );
    let server = DeskServer::new(server_config, Arc::new(InMemoryBackend::new(state)));
    runtime()?.block_on(server.serve())?;
    Ok(())
}
