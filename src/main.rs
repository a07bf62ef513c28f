use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use swaggen::{
    log_failure, CodegenConfig, FileSystemSink, FileTemplateLoader, Generator, JinjaEngine,
    SwaggerModel,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the Swagger / OpenAPI description (overrides config if provided)
    #[arg(short, long, global = true)]
    swagger: Option<PathBuf>,

    /// Base output directory (defaults to the config file's directory)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Dry run mode - don't write files
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new swaggen project
    Init {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Generate files from templates (default command)
    Generate,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => {
            init_project(&path)?;
        }
        Some(Commands::Generate) | None => {
            generate(cli)?;
        }
    }

    Ok(())
}

const STARTER_CONFIG: &str = r#"swagger: swagger.yaml

defaults:
  extension: .ts

per_definition:
  templates/model.ts.j2:
    target: output/models

per_path:
  templates/controller.ts.j2:
    target: output/controllers
    group_by: x-swagger-router-controller
    operations: [get, put, post, delete]
"#;

const STARTER_SWAGGER: &str = r#"swagger: "2.0"
info:
  title: Petstore
  version: 1.0.0
definitions:
  Pet:
    type: object
    properties:
      id:
        type: integer
      name:
        type: string
paths:
  /pets:
    x-swagger-router-controller: Pets
    get:
      operationId: listPets
    post:
      operationId: createPet
  /pets/{petId}:
    x-swagger-router-controller: Pets
    get:
      operationId: showPetById
"#;

const STARTER_MODEL_TEMPLATE: &str = r#"// {{ definition.referencePath }}
export interface {{ definition.definitionName | pascalcase }} {
{%- for name, property in definition.properties | items %}
  {{ name }}: {{ property.type }};
{%- endfor %}
}
"#;

const STARTER_CONTROLLER_TEMPLATE: &str = r#"// {{ groupKey }}
{%- for op in members %}
export function {{ op.operationId }}() {} // {{ op.verb | upper }} {{ op.path }}
{%- endfor %}
"#;

fn init_project(path: &Path) -> Result<()> {
    info!("Initializing swaggen project at {:?}", path);

    std::fs::create_dir_all(path.join("templates"))?;
    std::fs::write(path.join("codegen.yaml"), STARTER_CONFIG)?;
    std::fs::write(path.join("swagger.yaml"), STARTER_SWAGGER)?;
    std::fs::write(path.join("templates/model.ts.j2"), STARTER_MODEL_TEMPLATE)?;
    std::fs::write(
        path.join("templates/controller.ts.j2"),
        STARTER_CONTROLLER_TEMPLATE,
    )?;

    info!("✓ Project initialized successfully!");
    info!("  Run: swaggen -c codegen.yaml");

    Ok(())
}

fn generate(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .ok_or_else(|| anyhow::anyhow!("--config is required"))?;

    info!("Loading config from {:?}", config_path);
    let config = CodegenConfig::load(&config_path).context("Failed to load config")?;
    let config_dir = config_path
        .parent()
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let swagger_path = cli
        .swagger
        .or_else(|| config.swagger.as_ref().map(|p| config_dir.join(p)))
        .ok_or_else(|| {
            anyhow::anyhow!("--swagger is required when the config has no swagger entry")
        })?;

    info!("Loading API description from {:?}", swagger_path);
    let model = SwaggerModel::load(&swagger_path)
        .with_context(|| format!("Failed to load API description {:?}", swagger_path))?;

    let output_base = cli.output.unwrap_or_else(|| config_dir.clone());

    if cli.dry_run {
        info!("=== DRY RUN MODE ===");
    }

    let generator = Generator::new(
        JinjaEngine::new(),
        FileTemplateLoader::with_base_dir(&config_dir),
    )
    .with_failure_handler(log_failure);
    let mut sink = FileSystemSink::new(output_base).dry_run(cli.dry_run);

    // The failure handler already logged the cause.
    let report = generator
        .generate(&model, &config, &mut sink)
        .map_err(|_| anyhow::anyhow!("Code generation failed"))?;
    info!("Generated {} file(s)", report.files.len());

    if cli.dry_run {
        info!("=== DRY RUN COMPLETE ===");
    }

    Ok(())
}
