//! Ontoweave CLI
//!
//! - `compile`: diagram JSON → one ontology table per component + report
//! - `plan`: print each component's execution order without compiling
//! - `template`: inspect a template's terms and derived rank types

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use ontoweave_compiler::Compiler;
use ontoweave_ontology::OntologyGraph;
use ontoweave_storage::{read_diagram, ProjectConfig, PROJECT_FILE};
use tracing_subscriber::{fmt, EnvFilter};

mod render;

#[derive(Parser)]
#[command(name = "ontoweave")]
#[command(author, version, about = "Compile relationship diagrams into ontology graphs")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProjectArgs {
    /// Project config (defaults to ./ontoweave.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Template directory (overrides the config)
    #[arg(long)]
    templates: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a diagram and write one ontology per component.
    Compile {
        /// Diagram relationship table (JSON)
        diagram: PathBuf,

        #[command(flatten)]
        project: ProjectArgs,

        /// Output directory (overrides the config)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the compiled diagram as JSON instead of writing files
        #[arg(long)]
        json: bool,
    },

    /// Show the components and operation order of a diagram.
    Plan {
        diagram: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Print a template's relationships and derived term types.
    Template {
        name: String,

        #[command(flatten)]
        project: ProjectArgs,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ProjectConfig> {
    match path {
        Some(path) => ProjectConfig::load(path),
        None => ProjectConfig::load_or_default(Path::new(PROJECT_FILE)),
    }
}

fn project_config(args: &ProjectArgs) -> Result<ProjectConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = &args.templates {
        config.template_dir = dir.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compile {
            diagram,
            project,
            out,
            json,
        } => cmd_compile(&diagram, &project, out, json),
        Commands::Plan {
            diagram,
            config,
            json,
        } => cmd_plan(&diagram, config.as_deref(), json),
        Commands::Template { name, project } => cmd_template(&name, &project),
    }
}

fn cmd_compile(diagram: &Path, project: &ProjectArgs, out: Option<PathBuf>, json: bool) -> Result<()> {
    let mut config = project_config(project)?;
    if let Some(out) = out {
        config.output_dir = out;
    }

    let input = read_diagram(diagram)?;
    let templates = config.templates()?;
    tracing::debug!(templates = templates.len(), root = %templates.root().display(), "loaded templates");
    let compiled = Compiler::with_config(&templates, config.compiler.clone()).compile(&input);

    if json {
        println!("{}", serde_json::to_string_pretty(&compiled)?);
    } else {
        let written = config.writer().write(&compiled)?;
        render::print_report(&compiled, &written);
    }

    let failed = compiled.report.failures().count();
    if failed > 0 {
        return Err(anyhow!(
            "{failed} of {} components failed",
            compiled.report.components.len()
        ));
    }
    Ok(())
}

fn cmd_plan(diagram: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config)?;
    let input = read_diagram(diagram)?;
    // planning never loads a template
    let templates = ontoweave_ontology::InMemoryTemplates::new();
    let plan = Compiler::with_config(&templates, config.compiler).plan(&input);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        render::print_plan(&plan);
    }
    Ok(())
}

fn cmd_template(name: &str, project: &ProjectArgs) -> Result<()> {
    let config = project_config(project)?;
    let templates = config.templates()?;
    let graph = OntologyGraph::load(&templates, name)?;

    println!(
        "{} {} ({} terms, {} relationships)",
        "template".green().bold(),
        name.bold(),
        graph.len(),
        graph.edge_count()
    );
    if let Some(path) = templates.path_of(name) {
        println!("  {}", path.display().to_string().dimmed());
    }
    render::print_template(&graph);
    Ok(())
}
