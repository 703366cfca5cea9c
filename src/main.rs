//! `coach` command line.
//!
//! Usage:
//!   coach child "Maya threw blocks at cleanup" --name Maya --age 4
//!   coach classroom "Class transition to cleanup was chaotic today" --class-size 18
//!   coach family --child Maya --parent Ana --language spanish --context meal_time
//!   coach kb export > kb.json
//!   coach kb validate kb.json
//!   coach parse "Meltdown during circle time this morning"

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use coach_engine::context::parse_description;
use coach_engine::{
    BehaviorContext, BehaviorLog, ChildRef, ClassroomContext, CoachEngine, Config, EmotionalState,
    Language, Severity, TimeOfDay,
};

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Behavior coaching responses for early childhood educators", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Coach a single child's behavior (eleven sections)
    Child {
        description: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u8>,
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        severity: Option<Severity>,
        #[arg(long)]
        time: Option<TimeOfDay>,
        /// How the educator is feeling
        #[arg(long)]
        mood: Option<EmotionalState>,
        #[arg(long = "stressor")]
        stressors: Vec<String>,
        #[arg(long)]
        iep: bool,
        #[arg(long)]
        behavior_plan: bool,
    },
    /// Coach a whole-class challenge (four sections)
    Classroom {
        description: String,
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        severity: Option<Severity>,
        #[arg(long)]
        grade: Option<String>,
        #[arg(long)]
        class_size: Option<u32>,
    },
    /// Write a parent letter
    Family {
        #[arg(long)]
        child: Option<String>,
        #[arg(long, default_value = "")]
        parent: String,
        #[arg(long)]
        language: Option<Language>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Knowledge base administration
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },
    /// Show the fields inferred from a description
    Parse { text: String },
}

#[derive(Subcommand)]
enum KbAction {
    /// Print the knowledge base as JSON
    Export,
    /// Check a JSON knowledge base against the current one without changing
    /// anything, then print the fingerprint it would have. To load it on
    /// every run, point `knowledge.seed_path` (or COACH_KB_PATH) at the file.
    Validate { path: PathBuf },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    coach_engine::init_tracing(&config.runtime.log_filter);

    let engine = CoachEngine::from_config(&config).context("building engine")?;

    match cli.command {
        Commands::Child {
            description,
            name,
            age,
            context,
            severity,
            time,
            mood,
            stressors,
            iep,
            behavior_plan,
        } => {
            let child = name.map(|name| ChildRef {
                name,
                age_years: age,
                has_iep: iep,
                has_behavior_plan: behavior_plan,
            });
            let ctx = BehaviorContext {
                description,
                context_tag: context,
                time_of_day: time,
                severity,
                stressors,
                emotional_state: mood,
                child,
                ..Default::default()
            };
            print_json(&engine.generate_child_behavior_strategy(ctx))
        }
        Commands::Classroom {
            description,
            context,
            severity,
            grade,
            class_size,
        } => {
            let ctx = ClassroomContext {
                description,
                context_tag: context,
                severity,
                grade_level: grade,
                class_size,
                ..Default::default()
            };
            print_json(&engine.generate_classroom_strategy(ctx))
        }
        Commands::Family {
            child,
            parent,
            language,
            description,
            context,
            notes,
        } => {
            let child = child.map(ChildRef::named);
            let log = (description.is_some() || context.is_some()).then(|| BehaviorLog {
                description: description.unwrap_or_default(),
                context_tag: context,
                ..Default::default()
            });
            let language = language.unwrap_or(config.family.default_language);
            let letter = engine.generate_family_script(
                child.as_ref(),
                log.as_ref(),
                &parent,
                language,
                notes.as_deref(),
            );
            println!("{letter}");
            Ok(())
        }
        Commands::Kb { action } => match action {
            KbAction::Export => print_json(&engine.export_knowledge_base()),
            KbAction::Validate { path } => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let preview = engine.knowledge().validate_json(&json)?;
                println!("{}", preview.fingerprint.unwrap_or_default());
                Ok(())
            }
        },
        Commands::Parse { text } => print_json(&parse_description(&text)),
    }
}
