//! CLI application for demographic landmark error analysis.
//!
//! Usage:
//!   landmark-bias -c analysis.json -f age          # Significant keypoints
//!   landmark-bias -c analysis.json -f skintone -a  # All keypoints
//!   landmark-bias -c analysis.json -f lighting --json
//!   landmark-bias -c analysis.json -f sex -d       # Descriptive table

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use landmark_bias::{
    descriptive_table, significance_report, Config, ErrorIndex, Factor, FactorAnalysis,
    KeypointId, ReportOptions, Summary,
};
use log::info;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "landmark-bias")]
#[command(author, version, about = "Landmark estimation error analysis across demographic groups", long_about = None)]
struct Args {
    /// Analysis configuration file
    #[arg(short, long, default_value = "analysis.json")]
    config: PathBuf,

    /// Demographic factor to analyze (age, sex, skintone, occlusion,
    /// lighting, expression)
    #[arg(short, long, default_value = "age")]
    factor: String,

    /// List every keypoint, not only the significant ones
    #[arg(short, long)]
    all: bool,

    /// Run and display test prerequisites per keypoint
    #[arg(short, long)]
    prerequisites: bool,

    /// Display descriptive per-group statistics instead of tests
    #[arg(short, long)]
    descriptive: bool,

    /// Significance threshold
    #[arg(long, default_value = "0.05")]
    alpha: f64,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    factor: String,
    alpha: f64,
    keypoints: Vec<KeypointOutput>,
    /// Welch t-test over the aggregate, binary factors only
    #[serde(skip_serializing_if = "Option::is_none")]
    t_test: Option<TTestOutput>,
    /// Per-group aggregate summaries
    descriptive: BTreeMap<String, Summary>,
}

#[derive(Serialize)]
struct KeypointOutput {
    keypoint: KeypointId,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'static str>,
    f_statistic: f64,
    p_value: f64,
    significant: bool,
    pairs: Vec<PairOutput>,
}

#[derive(Serialize)]
struct PairOutput {
    group_a: &'static str,
    group_b: &'static str,
    mean_diff: f64,
    p_value: f64,
    reject: bool,
}

#[derive(Serialize)]
struct TTestOutput {
    t_statistic: f64,
    df: f64,
    p_value: f64,
}

fn main() {
    let args = Args::parse();
    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let factor: Factor = args.factor.parse()?;
    let config = Config::from_file(&args.config)?;

    info!("Loading annotations and estimations from {:?}", args.config);
    let index = ErrorIndex::load(&config)?;
    info!("Indexed {} keypoints", index.keypoint_ids().len());

    let analysis = FactorAnalysis::new(&index, factor);

    let output_str = if args.json {
        serde_json::to_string_pretty(&build_output(&index, &analysis, args)?)?
    } else if args.descriptive {
        descriptive_table(&analysis)
    } else {
        let options = ReportOptions {
            show_all: args.all,
            prerequisites: args.prerequisites,
            alpha: args.alpha,
        };
        significance_report(&index, &analysis, &options)?
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        info!("Output written to {path:?}");
    } else {
        println!("{output_str}");
    }

    Ok(())
}

fn build_output(
    index: &ErrorIndex,
    analysis: &FactorAnalysis,
    args: &Args,
) -> Result<Output, Box<dyn std::error::Error>> {
    let mut keypoints = Vec::new();
    for kp_id in index.keypoint_ids() {
        let Ok(anova) = analysis.one_way_anova(Some(kp_id)) else {
            continue;
        };
        let significant = anova.p_value <= args.alpha;
        if !significant && !args.all {
            continue;
        }
        let pairs = if significant {
            analysis
                .tukey_post_hoc(Some(kp_id), args.alpha)?
                .into_iter()
                .map(|pair| PairOutput {
                    group_a: pair.group_a.label(),
                    group_b: pair.group_b.label(),
                    mean_diff: pair.mean_diff,
                    p_value: pair.p_value,
                    reject: pair.reject,
                })
                .collect()
        } else {
            Vec::new()
        };
        keypoints.push(KeypointOutput {
            keypoint: kp_id,
            name: landmark_bias::keypoint_name(kp_id),
            f_statistic: anova.f_statistic,
            p_value: anova.p_value,
            significant,
            pairs,
        });
    }

    let t_test = if analysis.factor().is_binary() {
        analysis.welch_t_test(None).ok().map(|t| TTestOutput {
            t_statistic: t.t_statistic,
            df: t.df,
            p_value: t.p_value,
        })
    } else {
        None
    };

    let descriptive = analysis
        .summaries(None)
        .into_iter()
        .map(|(group, summary)| (group.label().to_string(), summary))
        .collect();

    Ok(Output {
        factor: analysis.factor().to_string(),
        alpha: args.alpha,
        keypoints,
        t_test,
        descriptive,
    })
}
