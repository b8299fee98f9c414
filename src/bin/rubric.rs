//! Command-line entry point: validate response files, score validated
//! runs, and write per-metric reports.
//!
//! Exit code is 0 when no error-severity events were recorded and 255
//! otherwise, so callers can gate downstream steps on validation health.

use clap::{Args, Parser, Subcommand, ValueEnum};
use rubric::error::Result;
use rubric::events::EventLog;
use rubric::load;
use rubric::response::{TaskSchema, ValidationScope};
use rubric::scorers::manager::Task;
use rubric::scorers::{ScoresManager, ScoringContext};
use rubric::validate::Validator;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "rubric")]
#[command(
    author,
    version,
    about = "Validate and score multi-task information-extraction runs"
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a response file, writing the surviving records
    #[command(visible_alias = "v")]
    Validate(ValidateArgs),

    /// Score a validated run and write per-metric reports
    #[command(visible_alias = "s")]
    Score(ScoreArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaArg {
    /// Task1 cluster-mention assertions
    ClusterMention,
    /// Task1 argument assertions
    ArgumentAssertion,
    /// Task2 cross-document responses
    CrossDocument,
    /// Task3 claim frames
    ClaimFrame,
}

impl From<SchemaArg> for TaskSchema {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::ClusterMention => TaskSchema::Task1ClusterMention,
            SchemaArg::ArgumentAssertion => TaskSchema::Task1ArgumentAssertion,
            SchemaArg::CrossDocument => TaskSchema::Task2CrossDocument,
            SchemaArg::ClaimFrame => TaskSchema::Task3ClaimFrame,
        }
    }
}

#[derive(Args)]
struct ValidateArgs {
    /// Directory with encodings.tab, core_documents.tab,
    /// parent_children.tab, and the boundary tables
    #[arg(long)]
    corpus: PathBuf,

    /// Directory with query tables (topics, claim frames, entity types)
    #[arg(long)]
    queries: Option<PathBuf>,

    /// Record shape of the input file
    #[arg(long, value_enum)]
    schema: SchemaArg,

    /// Run ID of the submission being validated
    #[arg(long)]
    run_id: String,

    /// Response file to validate
    input: PathBuf,

    /// Where to write the validated records (must not exist)
    output: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum TaskArg {
    Task1,
    Task2,
    Task3,
}

impl From<TaskArg> for Task {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::Task1 => Task::Task1,
            TaskArg::Task2 => Task::Task2,
            TaskArg::Task3 => Task::Task3,
        }
    }
}

#[derive(Args)]
struct ScoreArgs {
    /// Task whose metrics to run
    #[arg(long, value_enum)]
    task: TaskArg,

    /// Run ID of the submission being scored
    #[arg(long)]
    run_id: String,

    /// Corpus directory (task1)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Validated gold cluster-mention file (task1)
    #[arg(long)]
    gold_mentions: Option<PathBuf>,

    /// Validated gold argument-assertion file (task1)
    #[arg(long)]
    gold_arguments: Option<PathBuf>,

    /// Validated system cluster-mention file (task1)
    #[arg(long)]
    system_mentions: Option<PathBuf>,

    /// Validated system argument-assertion file (task1)
    #[arg(long)]
    system_arguments: Option<PathBuf>,

    /// Cluster alignment table (task1)
    #[arg(long)]
    alignment: Option<PathBuf>,

    /// Pairwise type-similarity table (task1)
    #[arg(long)]
    similarities: Option<PathBuf>,

    /// Directory with queries.tab, responses.tab, assessments.tab (task2)
    /// or rankings.tab, assessments.tab (task3)
    #[arg(long)]
    queries: Option<PathBuf>,

    /// Ranking cutoff for NDCG (task3)
    #[arg(long)]
    cutoff: Option<usize>,

    /// Also write <metric>-scores.json next to the text reports
    #[arg(long)]
    json: bool,

    /// Directory to write the per-metric reports into (must not exist)
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let log = EventLog::new();
    let outcome = match cli.command {
        Commands::Validate(args) => run_validate(&args, &log),
        Commands::Score(args) => run_score(&args, &log),
    };
    if let Err(error) = outcome {
        log::error!("{error}");
        return ExitCode::from(255);
    }
    if log.errors() > 0 {
        log::error!(
            "{} error(s), {} warning(s)",
            log.errors(),
            log.warnings()
        );
        return ExitCode::from(255);
    }
    if log.warnings() > 0 {
        log::warn!("0 error(s), {} warning(s)", log.warnings());
    }
    ExitCode::SUCCESS
}

fn require_missing(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(rubric::error::Error::invalid_input(format!(
            "output {} already exists",
            path.display()
        )));
    }
    Ok(())
}

fn require_present(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(rubric::error::Error::invalid_input(format!(
            "input {} does not exist",
            path.display()
        )));
    }
    Ok(())
}

fn run_validate(args: &ValidateArgs, log: &EventLog) -> Result<()> {
    require_present(&args.corpus)?;
    require_present(&args.input)?;
    require_missing(&args.output)?;

    let corpus = load::load_corpus(&args.corpus, log)?;
    let boundaries = load::load_boundaries(&args.corpus, log)?;
    let queries = match &args.queries {
        Some(dir) => Some(load::load_queries(dir)?),
        None => None,
    };
    let schema = TaskSchema::from(args.schema);
    let mut file = load::load_response_file(&args.input, schema, log)?;

    // Clusters and claims have to exist before records can be checked
    // against them.
    let records = std::mem::take(&mut file.records);
    let set = load::assemble_response_set(
        &args.run_id,
        &[load::ResponseFile {
            schema,
            header: file.header.clone(),
            records: records.clone(),
        }],
        log,
    );

    let validator = Validator::new(&boundaries, log);
    let mut kept = Vec::new();
    for record in records {
        let cluster = record
            .get(rubric::response::Attribute::DocumentId)
            .zip(record.get(rubric::response::Attribute::ClusterId))
            .and_then(|(document_id, cluster_id)| set.cluster(document_id, cluster_id));
        let scope = ValidationScope {
            corpus: &corpus,
            claims: &set.claims,
            queries: queries.as_ref(),
            cluster,
        };
        if let Some(valid) = validator.validate_record(&scope, record) {
            kept.push(valid);
        }
    }
    log::info!(
        "kept {} of {} record(s) from {}",
        kept.len(),
        set.records.len(),
        args.input.display()
    );
    file.records = kept;
    load::write_response_file(&args.output, &file)
}

fn run_score(args: &ScoreArgs, log: &EventLog) -> Result<()> {
    require_missing(&args.output)?;
    let manager = match Task::from(args.task) {
        Task::Task1 => score_task1(args, log)?,
        Task::Task2 => {
            let dir = required(&args.queries, "--queries")?;
            let queries = load::load_cross_doc_queries(dir, log)?;
            ScoresManager::score_task2(&queries, &args.run_id)
        }
        Task::Task3 => {
            let dir = required(&args.queries, "--queries")?;
            let claims = load::load_claim_rankings(dir, log)?;
            ScoresManager::score_task3(&claims, args.cutoff, &args.run_id)
        }
    };
    manager.write_reports(&args.output)?;
    if args.json {
        manager.write_json(&args.output)?;
    }
    Ok(())
}

fn required<'a>(option: &'a Option<PathBuf>, flag: &str) -> Result<&'a PathBuf> {
    option
        .as_ref()
        .ok_or_else(|| rubric::error::Error::invalid_input(format!("{flag} is required")))
}

fn score_task1(args: &ScoreArgs, log: &EventLog) -> Result<ScoresManager> {
    let corpus_dir = required(&args.corpus, "--corpus")?;
    let corpus = load::load_corpus(corpus_dir, log)?;
    let gold = load_task1_run("gold", &args.gold_mentions, &args.gold_arguments, log)?;
    let system = load_task1_run(&args.run_id, &args.system_mentions, &args.system_arguments, log)?;
    let alignment = load::load_alignment(required(&args.alignment, "--alignment")?, log)?;
    let similarities =
        load::load_type_similarities(required(&args.similarities, "--similarities")?, log)?;
    let ctx = ScoringContext {
        run_id: &args.run_id,
        corpus: &corpus,
        gold: &gold,
        system: &system,
        alignment: &alignment,
        similarities: &similarities,
        log,
    };
    Ok(ScoresManager::score_task1(&ctx))
}

fn load_task1_run(
    run_id: &str,
    mentions: &Option<PathBuf>,
    arguments: &Option<PathBuf>,
    log: &EventLog,
) -> Result<rubric::response::ResponseSet> {
    let mut files = Vec::new();
    if let Some(path) = mentions {
        files.push(load::load_response_file(
            path,
            TaskSchema::Task1ClusterMention,
            log,
        )?);
    }
    if let Some(path) = arguments {
        files.push(load::load_response_file(
            path,
            TaskSchema::Task1ArgumentAssertion,
            log,
        )?);
    }
    Ok(load::assemble_response_set(run_id, &files, log))
}
