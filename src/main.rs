use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use coursekit::coursekit_api::HttpCourseClient;
use coursekit::coursekit_config::{ApiConfig, SessionConfig};
use coursekit::coursekit_core::{PermissionId, assistant_grantable};
use coursekit::coursekit_models::CourseId;
use coursekit::coursekit_observability::{LogConfig, init_tracing};
use coursekit::coursekit_session::{Capability, SessionScope};
use coursekit::report::{CourseReport, resolve_course};
use dialoguer::{Input, Select};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "coursekit")]
#[command(about = "Coursekit - Inspect course sessions and capabilities", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the permissions an owner can grant to a course assistant
    Catalog,
    /// Resolve a course and print the caller's role and capabilities
    Inspect {
        /// Course ID (prompted if not provided)
        #[arg(short = 'c', long)]
        course: Option<String>,
    },
    /// Check a single permission; exits 0 if allowed, 1 if denied
    Check {
        /// Course ID (prompted if not provided)
        #[arg(short = 'c', long)]
        course: Option<String>,

        /// Permission identifier, e.g. CREATE_RESOURCE (selected interactively if not provided)
        #[arg(short = 'p', long)]
        permission: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let _log_guard = init_tracing(&LogConfig::from_env());

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n❌ {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Catalog => {
            handle_catalog();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Inspect { course } => handle_inspect(course).await,
        Commands::Check { course, permission } => handle_check(course, permission).await,
    }
}

fn handle_catalog() {
    println!("Permissions grantable to course assistants:\n");
    for permission in assistant_grantable() {
        println!("  {:<20} {}", permission.as_str(), permission.label());
    }
}

async fn handle_inspect(course: Option<String>) -> anyhow::Result<ExitCode> {
    let course_id = course_id_or_prompt(course)?;
    let scope = build_scope()?;
    let settle_timeout = SessionConfig::from_env().settle_timeout();

    let context = resolve_course(&scope, course_id, settle_timeout).await?;
    println!("{}", CourseReport::from_context(&context));
    Ok(ExitCode::SUCCESS)
}

async fn handle_check(
    course: Option<String>,
    permission: Option<String>,
) -> anyhow::Result<ExitCode> {
    let course_id = course_id_or_prompt(course)?;
    let permission = permission_or_prompt(permission)?;
    let scope = build_scope()?;
    let settle_timeout = SessionConfig::from_env().settle_timeout();

    let context = resolve_course(&scope, course_id, settle_timeout).await?;
    let decision = context.decide(Capability::Permission(permission));

    if decision.is_allowed() {
        println!("✅ {} on {}: {}", permission, context.course_id(), decision);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("❌ {} on {}: {}", permission, context.course_id(), decision);
        Ok(ExitCode::from(1))
    }
}

fn build_scope() -> anyhow::Result<SessionScope> {
    let config = ApiConfig::from_env().context("Failed to load API configuration")?;
    let client = HttpCourseClient::new(config).context("Failed to create API client")?;
    Ok(SessionScope::new(Arc::new(client)))
}

fn course_id_or_prompt(course: Option<String>) -> anyhow::Result<CourseId> {
    let raw = match course {
        Some(course) => course,
        None => Input::<String>::new()
            .with_prompt("Course ID")
            .interact_text()
            .context("Failed to read course ID")?,
    };
    Ok(raw.parse::<CourseId>()?)
}

fn permission_or_prompt(permission: Option<String>) -> anyhow::Result<PermissionId> {
    if let Some(permission) = permission {
        return Ok(permission.parse::<PermissionId>()?);
    }

    let items: Vec<String> = PermissionId::all()
        .iter()
        .map(|permission| format!("{:<20} {}", permission.as_str(), permission.label()))
        .collect();
    let index = Select::new()
        .with_prompt("Permission")
        .items(items.as_slice())
        .default(0)
        .interact()
        .context("Failed to read permission")?;

    PermissionId::all()
        .get(index)
        .copied()
        .context("Selected permission is out of range")
}
