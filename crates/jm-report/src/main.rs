use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use jm_common::corpus::{self, SkillFrequency};
use jm_common::embedding::create_provider;
use jm_common::extraction::CandidateSkills;
use jm_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use jm_common::market::{self, MarketSummary, DEFAULT_TOP_VALUES};
use jm_common::matching::{MatchResult, RelatedTitle, ScoreWeights};
use jm_common::run_id::{self, RunId};
use jm_common::{
    CandidateProfile, EmergentSkillReport, EngineConfig, MatchingEngine, Posting, Taxonomy,
};
use serde::Serialize;
use tracing::info;

const APP_NAME: &str = "jm-report";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "jm-report",
    about = "Rank job postings for a CV and report emergent skills"
)]
struct Cli {
    /// Taxonomy JSON file ([{id,label,category,aliases}]); built-in list when absent
    #[arg(long, env = "JM_TAXONOMY_PATH", global = true)]
    taxonomy: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Score every posting against a CV and print the ranking
    Rank(RankArgs),
    /// Skill frequencies, trends and emergent skills of a posting batch
    Trends(TrendArgs),
    /// Posting titles related to a query title
    Titles(TitleArgs),
}

#[derive(Debug, Clone, Args)]
struct RankArgs {
    /// JSON array of postings
    #[arg(long)]
    postings: PathBuf,

    /// CV as plain text
    #[arg(long)]
    cv: PathBuf,

    /// Comma separated skills the candidate declares explicitly
    #[arg(long, default_value = "")]
    skills: String,

    /// Lexical share of the global score (defaults to JM_LEXICAL_WEIGHT)
    #[arg(long)]
    lexical_weight: Option<f64>,

    /// Semantic share of the global score (defaults to JM_SEMANTIC_WEIGHT)
    #[arg(long)]
    semantic_weight: Option<f64>,

    /// Keep only the best N results
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Debug, Clone, Args)]
struct TrendArgs {
    /// JSON array of postings (the current window)
    #[arg(long)]
    postings: PathBuf,

    /// JSON array of older postings to compare against
    #[arg(long, conflicts_with = "cutoff")]
    reference: Option<PathBuf>,

    /// Split `--postings` itself: published before this date is the reference window
    #[arg(long)]
    cutoff: Option<NaiveDate>,

    /// Lower bound of the required share for the emerging list
    #[arg(long, default_value_t = 0.05)]
    emerging_min: f64,

    /// Upper bound of the required share for the emerging list
    #[arg(long, default_value_t = 0.15)]
    emerging_max: f64,

    /// Entries in the location and contract type lists
    #[arg(long, default_value_t = DEFAULT_TOP_VALUES)]
    top_values: usize,
}

#[derive(Debug, Clone, Args)]
struct TitleArgs {
    /// JSON array of postings
    #[arg(long)]
    postings: PathBuf,

    /// Title to find neighbours for, e.g. "data analyst"
    #[arg(long)]
    query: String,

    #[arg(long, default_value_t = 10)]
    top_n: usize,

    /// Minimum raw cosine similarity
    #[arg(long, default_value_t = 0.7)]
    min_similarity: f64,
}

#[derive(Debug, Serialize)]
struct RankReport {
    process_id: RunId,
    provider: String,
    candidate_skills: Vec<String>,
    unknown_skills: Vec<String>,
    results: Vec<MatchResult>,
}

#[derive(Debug, Serialize)]
struct TrendReport {
    process_id: RunId,
    report: EmergentSkillReport,
    emerging: Vec<SkillFrequency>,
    market: MarketSummary,
}

#[derive(Debug, Serialize)]
struct TitleReport {
    process_id: RunId,
    query: String,
    related: Vec<RelatedTitle>,
}

fn load_postings(path: &Path) -> Result<Vec<Posting>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read postings from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse postings in {}", path.display()))
}

fn load_taxonomy(path: Option<&Path>) -> Result<Taxonomy> {
    let Some(path) = path else {
        return Ok(Taxonomy::builtin());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read taxonomy from {}", path.display()))?;
    Taxonomy::from_json_str(&raw)
        .with_context(|| format!("invalid taxonomy in {}", path.display()))
}

fn parse_skill_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|skill| skill.trim().to_string())
        .filter(|skill| !skill.is_empty())
        .collect()
}

fn build_engine(taxonomy: Taxonomy, config: EngineConfig) -> MatchingEngine {
    let provider = create_provider(&config.embedding);
    MatchingEngine::new(Arc::new(taxonomy), provider, config)
}

fn rank(
    engine: &MatchingEngine,
    candidate: &CandidateProfile,
    postings: &[Posting],
    weights: &ScoreWeights,
    top: Option<usize>,
) -> RankReport {
    let run = engine.start_run();
    let skills = run.candidate_skills(candidate);
    let mut results = run.score_with_skills(&skills, candidate, postings, weights);
    if let Some(top) = top {
        results.truncate(top);
    }

    let CandidateSkills {
        mentions,
        unknown_explicit,
    } = skills;
    RankReport {
        process_id: run_id::process(),
        provider: engine.provider().name().to_string(),
        candidate_skills: mentions
            .iter()
            .map(|mention| mention.id().to_string())
            .collect(),
        unknown_skills: unknown_explicit,
        results,
    }
}

fn trends(
    engine: &MatchingEngine,
    postings: Vec<Posting>,
    reference: Option<Vec<Posting>>,
    cutoff: Option<NaiveDate>,
    emerging_band: (f64, f64),
    top_values: usize,
) -> TrendReport {
    let (current, reference) = match (reference, cutoff) {
        (Some(reference), _) => (postings, Some(reference)),
        (None, Some(cutoff)) => {
            let (current, older) = corpus::split_by_date(&postings, cutoff);
            (current, Some(older))
        }
        (None, None) => (postings, None),
    };

    let report = engine.aggregate_skills(&current, reference.as_deref());
    let emerging = report
        .emerging_by_share(emerging_band.0, emerging_band.1)
        .into_iter()
        .cloned()
        .collect();

    TrendReport {
        process_id: run_id::process(),
        report,
        emerging,
        market: market::summarize(&current, top_values),
    }
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::from_env();
    let taxonomy = load_taxonomy(cli.taxonomy.as_deref())?;
    info!(
        terms = taxonomy.len(),
        provider = %config.embedding.provider,
        process_id = %run_id::process(),
        "engine configured"
    );

    match cli.command {
        Command::Rank(args) => {
            let weights = ScoreWeights {
                lexical: args.lexical_weight.unwrap_or(config.weights.lexical),
                semantic: args.semantic_weight.unwrap_or(config.weights.semantic),
            };
            let engine = build_engine(taxonomy, config);
            let postings = load_postings(&args.postings)?;
            let cv_text = fs::read_to_string(&args.cv)
                .with_context(|| format!("failed to read CV from {}", args.cv.display()))?;
            let candidate = CandidateProfile {
                cv_text,
                skills: parse_skill_list(&args.skills),
            };

            let report = rank(&engine, &candidate, &postings, &weights, args.top);
            write_json(&report, cli.pretty)
        }
        Command::Trends(args) => {
            let engine = build_engine(taxonomy, config);
            let postings = load_postings(&args.postings)?;
            let reference = args.reference.as_deref().map(load_postings).transpose()?;

            let report = trends(
                &engine,
                postings,
                reference,
                args.cutoff,
                (args.emerging_min, args.emerging_max),
                args.top_values,
            );
            write_json(&report, cli.pretty)
        }
        Command::Titles(args) => {
            let engine = build_engine(taxonomy, config);
            let postings = load_postings(&args.postings)?;

            let related = engine
                .start_run()
                .related_titles(&args.query, &postings, args.top_n, args.min_similarity)
                .context("title similarity needs a working embedding provider")?;
            write_json(
                &TitleReport {
                    process_id: run_id::process(),
                    query: args.query,
                    related,
                },
                cli.pretty,
            )
        }
    }
}

fn main() {
    dotenv().ok();
    init_tracing_subscriber(APP_NAME);
    install_tracing_panic_hook(APP_NAME);

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        tracing::error!(error = format!("{err:#}"), "{APP_NAME} failed");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jm_common::corpus::TrendDirection;
    use jm_common::SkillId;

    fn posting(id: &str, required: &str, published_on: Option<&str>) -> Posting {
        Posting {
            id: Some(id.into()),
            source: "test".into(),
            required_text: required.into(),
            location: Some("Paris".into()),
            published_on: published_on.and_then(|d| d.parse().ok()),
            ..Posting::default()
        }
    }

    #[test]
    fn parses_rank_command() {
        let cli = Cli::try_parse_from([
            "jm-report",
            "rank",
            "--postings",
            "postings.json",
            "--cv",
            "cv.txt",
            "--skills",
            "Python, SQL",
            "--semantic-weight",
            "0",
            "--top",
            "5",
        ])
        .unwrap();

        let Command::Rank(args) = cli.command else {
            panic!("expected rank");
        };
        assert_eq!(args.postings, PathBuf::from("postings.json"));
        assert_eq!(args.semantic_weight, Some(0.0));
        assert_eq!(args.lexical_weight, None);
        assert_eq!(args.top, Some(5));
        assert_eq!(parse_skill_list(&args.skills), vec!["Python", "SQL"]);
    }

    #[test]
    fn reference_and_cutoff_conflict() {
        let parsed = Cli::try_parse_from([
            "jm-report",
            "trends",
            "--postings",
            "a.json",
            "--reference",
            "b.json",
            "--cutoff",
            "2024-01-01",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn skill_list_ignores_blanks() {
        assert!(parse_skill_list(" , ").is_empty());
        assert_eq!(parse_skill_list("rust,,go lang "), vec!["rust", "go lang"]);
    }

    #[test]
    fn rank_report_lists_candidate_skills_and_truncates() {
        let engine = build_engine(Taxonomy::builtin(), EngineConfig::default());
        let candidate = CandidateProfile {
            cv_text: "Python and SQL every day".into(),
            skills: vec!["Curling".into()],
        };
        let postings = vec![
            posting("a", "Java", None),
            posting("b", "Python, SQL", None),
            posting("c", "Python", None),
        ];

        let report = rank(
            &engine,
            &candidate,
            &postings,
            &ScoreWeights::new(1.0, 0.0),
            Some(2),
        );
        assert_eq!(report.candidate_skills, vec!["python", "sql"]);
        assert_eq!(report.unknown_skills, vec!["Curling"]);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].posting_id.as_deref(), Some("b"));
        assert_eq!(report.provider, "hash");
    }

    #[test]
    fn trends_split_on_cutoff() {
        let engine = build_engine(Taxonomy::builtin(), EngineConfig::default());
        let mut postings = Vec::new();
        for i in 0..10 {
            let required = if i < 4 { "Rust" } else { "SQL" };
            postings.push(posting(&format!("new-{i}"), required, Some("2024-06-01")));
        }
        for i in 0..10 {
            let required = if i < 1 { "Rust" } else { "SQL" };
            postings.push(posting(&format!("old-{i}"), required, Some("2024-01-01")));
        }

        let cutoff = NaiveDate::from_ymd_opt(2024, 3, 1);
        let report = trends(&engine, postings, None, cutoff, (0.05, 0.5), 5);

        assert_eq!(report.report.total_postings, 10);
        assert_eq!(report.report.reference_postings, Some(10));
        let rust = report.report.get(&SkillId::from("rust")).unwrap();
        assert_eq!(rust.trend, TrendDirection::Rising);
        assert!(report.emerging.iter().any(|entry| entry.skill.as_str() == "rust"));
        assert_eq!(report.market.salary.total_postings, 10);
        assert_eq!(report.market.locations[0].value, "Paris");
        assert_eq!(report.market.locations[0].count, 10);
    }

    #[test]
    fn taxonomy_defaults_to_builtin() {
        let taxonomy = load_taxonomy(None).unwrap();
        assert!(taxonomy.canonicalize("kubernetes").is_some());
    }

    #[test]
    fn missing_postings_file_reports_path() {
        let err = load_postings(Path::new("/nonexistent/postings.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/postings.json"));
    }
}
