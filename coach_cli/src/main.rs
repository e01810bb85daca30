use coach_core::*;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "trnr")]
#[command(about = "Trainer workout plan scheduler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a plan from a plan definition file and schedule its sessions
    Create {
        /// Plan definition file (TOML)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Parse and materialize without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Store the parsed plan as a named draft instead of committing
        #[arg(long, conflicts_with = "dry_run")]
        draft: Option<String>,

        /// Create from a cached draft instead of a file
        #[arg(long, conflicts_with = "file")]
        from_draft: Option<String>,
    },

    /// Edit an existing plan, replacing its scheduled sessions
    Edit {
        /// Plan id
        plan_id: String,

        /// Plan definition file (TOML)
        #[arg(long)]
        file: PathBuf,

        /// Parse and materialize without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List plans
    List {
        /// Filter by status (draft, active, completed, cancelled)
        #[arg(long)]
        status: Option<String>,

        /// Filter by client
        #[arg(long)]
        client: Option<String>,
    },

    /// Show one plan and its scheduled sessions
    Show {
        /// Plan id
        plan_id: String,
    },

    /// Change a plan's status
    SetStatus {
        /// Plan id
        plan_id: String,

        /// New status (draft, active, completed, cancelled)
        status: String,
    },

    /// Delete a plan and all of its sessions
    Delete {
        /// Plan id
        plan_id: String,
    },

    /// Export a plan's schedule as CSV
    Export {
        /// Plan id
        plan_id: String,

        /// Output file
        #[arg(long)]
        out: PathBuf,
    },

    /// List or remove cached plan drafts
    Drafts {
        /// Remove the named draft
        #[arg(long)]
        rm: Option<String>,
    },

    /// Show or clear the pending-sync log
    Sync {
        /// Clear the log
        #[arg(long)]
        clear: bool,
    },

    /// List known workout templates
    Templates,
}

fn main() -> Result<()> {
    // Initialize logging
    coach_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;

    match cli.command {
        Commands::Create {
            file,
            dry_run,
            draft,
            from_draft,
        } => cmd_create(&data_dir, file, dry_run, draft, from_draft, &config),
        Commands::Edit {
            plan_id,
            file,
            dry_run,
        } => cmd_edit(&data_dir, &plan_id, &file, dry_run, &config),
        Commands::List { status, client } => cmd_list(&data_dir, status, client),
        Commands::Show { plan_id } => cmd_show(&data_dir, &plan_id, &config),
        Commands::SetStatus { plan_id, status } => cmd_set_status(&data_dir, &plan_id, &status),
        Commands::Delete { plan_id } => cmd_delete(&data_dir, &plan_id),
        Commands::Export { plan_id, out } => cmd_export(&data_dir, &plan_id, &out),
        Commands::Drafts { rm } => cmd_drafts(&data_dir, rm),
        Commands::Sync { clear } => cmd_sync(&data_dir, clear),
        Commands::Templates => cmd_templates(&config),
    }
}

fn drafts_path(data_dir: &Path) -> PathBuf {
    data_dir.join("drafts.json")
}

fn sync_path(data_dir: &Path) -> PathBuf {
    data_dir.join("pending_sync.json")
}

fn parse_plan_id(raw: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw)
        .map_err(|e| Error::PlanValidation(format!("invalid plan id '{}': {}", raw, e)))
}

fn parse_status(raw: &str) -> Result<PlanStatus> {
    PlanStatus::parse(raw).ok_or_else(|| {
        Error::PlanValidation(format!(
            "unknown status '{}' (expected draft, active, completed, or cancelled)",
            raw
        ))
    })
}

fn cmd_create(
    data_dir: &Path,
    file: Option<PathBuf>,
    dry_run: bool,
    draft: Option<String>,
    from_draft: Option<String>,
    config: &Config,
) -> Result<()> {
    let cache = DraftCache::new(drafts_path(data_dir));

    let fields = match (&file, &from_draft) {
        (Some(path), None) => load_plan_file(path, config)?,
        (None, Some(name)) => cache
            .load_draft(name)?
            .ok_or_else(|| Error::PlanValidation(format!("no draft named '{}'", name)))?,
        _ => {
            return Err(Error::PlanValidation(
                "provide exactly one of --file or --from-draft".into(),
            ))
        }
    };

    coach_core::schedule::validate_new_plan(&fields)?;

    if let Some(name) = draft {
        cache.save_draft(&name, &fields)?;
        println!("✓ Draft '{}' saved", name);
        return Ok(());
    }

    if dry_run {
        let sessions = materialize(
            uuid::Uuid::nil(),
            &fields.schedule_data,
            fields.start_date,
            fields.end_date,
        )?;
        let registry = build_registry(&config.templates.custom);
        print_sessions(&registry, &sessions);
        println!("\n[Dry run - nothing written]");
        return Ok(());
    }

    let store = PlanStore::new(data_dir);
    let plan = store.create_plan(fields)?;

    let reconciler = Reconciler::new();
    let outcome = reconciler.reconcile(&store, &plan, false)?;

    let sync = SyncLog::new(sync_path(data_dir));
    sync.record("plan", &plan.id.to_string(), SyncAction::Create)?;

    println!("✓ Created plan {}", plan.id);
    println!("  {} sessions scheduled", outcome.created);
    Ok(())
}

fn cmd_edit(
    data_dir: &Path,
    plan_id: &str,
    file: &Path,
    dry_run: bool,
    config: &Config,
) -> Result<()> {
    let id = parse_plan_id(plan_id)?;
    let fields = load_plan_file(file, config)?;
    coach_core::schedule::validate_new_plan(&fields)?;

    if dry_run {
        let sessions = materialize(id, &fields.schedule_data, fields.start_date, fields.end_date)?;
        let registry = build_registry(&config.templates.custom);
        print_sessions(&registry, &sessions);
        println!("\n[Dry run - nothing written]");
        return Ok(());
    }

    let store = PlanStore::new(data_dir);
    let plan = store.update_plan(id, fields)?;

    let reconciler = Reconciler::new();
    let outcome = reconciler.reconcile(&store, &plan, true)?;

    let sync = SyncLog::new(sync_path(data_dir));
    sync.record("plan", &plan.id.to_string(), SyncAction::Update)?;

    println!("✓ Updated plan {}", plan.id);
    println!("  {} sessions scheduled (previous schedule replaced)", outcome.created);
    Ok(())
}

fn cmd_list(data_dir: &Path, status: Option<String>, client: Option<String>) -> Result<()> {
    let status = status.as_deref().map(parse_status).transpose()?;

    let store = PlanStore::new(data_dir);
    let plans: Vec<Plan> = store
        .list_plans()?
        .into_iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .filter(|p| client.as_deref().map_or(true, |c| p.client_id == c))
        .collect();

    if plans.is_empty() {
        println!("No plans found.");
        return Ok(());
    }

    for plan in &plans {
        println!(
            "{}  {:<9} {:<8} {} .. {}  {}",
            plan.id,
            plan.status,
            plan.schedule_type,
            plan.start_date,
            plan.end_date,
            plan.name
        );
    }
    println!("\n{} plan(s)", plans.len());
    Ok(())
}

fn cmd_show(data_dir: &Path, plan_id: &str, config: &Config) -> Result<()> {
    let id = parse_plan_id(plan_id)?;
    let store = PlanStore::new(data_dir);
    let plan = store.get_plan(id)?.ok_or(Error::PlanNotFound(id))?;

    let duration_days = (plan.end_date - plan.start_date).num_days();
    let duration_weeks = (duration_days + 6) / 7;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PLAN");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", plan.name);
    if let Some(description) = &plan.description {
        println!("  {}", description);
    }
    println!();
    println!("  Client:   {}", plan.client_id);
    println!("  Trainer:  {}", plan.trainer_id);
    println!("  Status:   {}", plan.status);
    println!("  Schedule: {}", plan.schedule_type);
    println!(
        "  Range:    {} .. {} ({} days, ~{} weeks)",
        plan.start_date, plan.end_date, duration_days, duration_weeks
    );

    if let ScheduleData::Weekly { days } = &plan.schedule_data {
        let per_week = days.values().filter(|t| t.is_some()).count();
        println!("  Workouts: {}/week", per_week);
    }

    let sessions = store.sessions_for_plan(id)?;
    println!();
    if sessions.is_empty() {
        println!("  No sessions scheduled.");
    } else {
        let registry = build_registry(&config.templates.custom);
        print_sessions(&registry, &sessions);
    }
    println!();
    Ok(())
}

fn cmd_set_status(data_dir: &Path, plan_id: &str, status: &str) -> Result<()> {
    let id = parse_plan_id(plan_id)?;
    let status = parse_status(status)?;

    let store = PlanStore::new(data_dir);
    let plan = store.set_status(id, status)?;

    println!("✓ Plan {} is now {}", plan.id, plan.status);
    Ok(())
}

fn cmd_delete(data_dir: &Path, plan_id: &str) -> Result<()> {
    let id = parse_plan_id(plan_id)?;
    let store = PlanStore::new(data_dir);
    store.delete_plan(id)?;

    let sync = SyncLog::new(sync_path(data_dir));
    sync.record("plan", &id.to_string(), SyncAction::Delete)?;

    println!("✓ Deleted plan {} and its sessions", id);
    Ok(())
}

fn cmd_export(data_dir: &Path, plan_id: &str, out: &Path) -> Result<()> {
    let id = parse_plan_id(plan_id)?;
    let store = PlanStore::new(data_dir);
    let plan = store.get_plan(id)?.ok_or(Error::PlanNotFound(id))?;
    let sessions = store.sessions_for_plan(id)?;

    let count = write_sessions_csv(&plan, &sessions, out)?;
    println!("✓ Exported {} sessions", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn cmd_drafts(data_dir: &Path, rm: Option<String>) -> Result<()> {
    let cache = DraftCache::new(drafts_path(data_dir));

    if let Some(name) = rm {
        if cache.remove_draft(&name)? {
            println!("✓ Removed draft '{}'", name);
        } else {
            println!("No draft named '{}'", name);
        }
        return Ok(());
    }

    let names = cache.list_drafts()?;
    if names.is_empty() {
        println!("No drafts.");
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

fn cmd_sync(data_dir: &Path, clear: bool) -> Result<()> {
    let sync = SyncLog::new(sync_path(data_dir));

    if clear {
        sync.clear()?;
        println!("✓ Pending-sync log cleared");
        return Ok(());
    }

    let entries = sync.pending()?;
    if entries.is_empty() {
        println!("Nothing pending.");
        return Ok(());
    }
    for entry in entries {
        println!(
            "{}  {:<6} {:?}  queued {}",
            entry.kind,
            entry.id,
            entry.action,
            entry.queued_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn cmd_templates(config: &Config) -> Result<()> {
    let registry = build_registry(&config.templates.custom);
    let errors = registry.validate();
    if !errors.is_empty() {
        eprintln!("Template registry errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid template registry".into()));
    }

    for template in registry.iter_sorted() {
        println!(
            "{:<18} {:<26} {:<10} {} min",
            template.id, template.name, template.category, template.duration_minutes
        );
    }
    Ok(())
}

fn print_sessions(registry: &TemplateRegistry, sessions: &[MaterializedSession]) {
    for (index, session) in sessions.iter().enumerate() {
        let template = session
            .template_id
            .as_deref()
            .map(|id| registry.name_of(id))
            .unwrap_or("-");

        match session.scheduled_date {
            Some(date) => {
                let day = session
                    .day_of_week
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                let week = session
                    .week_number
                    .map(|w| format!(" (week {})", w))
                    .unwrap_or_default();
                let notes = session
                    .notes
                    .as_deref()
                    .map(|n| format!("  - {}", n))
                    .unwrap_or_default();
                println!("  {}  {:<9}{} {}{}", date, day, week, template, notes);
            }
            None => {
                let key = session.notes.as_deref().unwrap_or("session");
                println!("  #{:<3} {:<12} {}", index + 1, key, template);
            }
        }
    }
    println!("\n  {} session(s)", sessions.len());
}
