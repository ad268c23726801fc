use ook_categorizer::config::{load_params, load_trace};
use ook_categorizer::render;
use ook_categorizer::stats::cluster_statistics;
use ook_categorizer::types::Polarity;
use ook_categorizer::{Categorizer, CategorizerParams};
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "ook_categorizer".to_string());
    let config = parse_args(&program)?;

    let params = match &config.params_path {
        Some(path) => load_params(path)?,
        None => CategorizerParams::default(),
    };
    let mut trace = load_trace(&config.input_path)?.into_trace()?;

    let mut categorizer = Categorizer::new(params);
    let report = categorizer
        .process(&mut trace)
        .map_err(|e| format!("Categorization failed (code {}): {e}", e.code()))?;

    if config.format.includes_text() {
        println!("Categorized Sequence");
        print!("{}", render::render_sequence(&report.categories, &trace));
        println!();
        println!("Categories");
        print!("{}", render::render_category_table(&report.categories));
        for polarity in [Polarity::High, Polarity::Low] {
            println!();
            println!("{}-Value Categories", polarity.label());
            print!(
                "{}",
                render::render_category_details(&report.categories[polarity], &trace)
            );
            println!("cluster mean/median/mad:");
            let stats = cluster_statistics(&report.categories[polarity], &trace, polarity);
            for (index, entry) in stats.iter().enumerate() {
                match entry {
                    Some(s) => println!("{}\t{}\t{}\t{}", index, s.mean, s.median, s.mad),
                    None => println!("{index}\t-"),
                }
            }
        }
        println!();
        if report.overlap {
            println!("overlapping clusters: correction skipped");
        }
        println!("max. rel. delta: {} \u{2030}", report.max_rel_delta);
    }

    if config.format.includes_json() {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
        if let Some(path) = config.json_out {
            fs::write(&path, json)
                .map_err(|e| format!("Failed to write JSON report to {}: {e}", path.display()))?;
            println!("JSON report written to {}", path.display());
        } else {
            println!("{json}");
        }
    }

    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Both,
}

impl OutputFormat {
    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "both" => Ok(Self::Both),
            other => Err(format!("Unknown format '{other}'. Use text|json|both.")),
        }
    }

    fn includes_text(&self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }

    fn includes_json(&self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

struct CliConfig {
    input_path: PathBuf,
    format: OutputFormat,
    json_out: Option<PathBuf>,
    params_path: Option<PathBuf>,
}

fn parse_args(program: &str) -> Result<CliConfig, String> {
    let mut args = env::args().skip(1);
    let mut input_path: Option<PathBuf> = None;
    let mut format = OutputFormat::Text;
    let mut json_out: Option<PathBuf> = None;
    let mut params_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{}", usage(program));
                std::process::exit(0);
            }
            "--format" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--format expects a value\n{}", usage(program)))?;
                format = OutputFormat::from_str(&value)?;
            }
            "--json-out" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--json-out expects a path\n{}", usage(program)))?;
                json_out = Some(PathBuf::from(value));
            }
            "--params" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--params expects a path\n{}", usage(program)))?;
                params_path = Some(PathBuf::from(value));
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option '{arg}'\n{}", usage(program)));
            }
            _ => {
                if input_path.is_some() {
                    return Err(format!(
                        "Unexpected positional argument '{arg}'\n{}",
                        usage(program)
                    ));
                }
                input_path = Some(PathBuf::from(arg));
            }
        }
    }

    let input_path = input_path.ok_or_else(|| usage(program))?;
    Ok(CliConfig {
        input_path,
        format,
        json_out,
        params_path,
    })
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <trace.json> [--format text|json|both] [--json-out report.json] \\\n         [--params params.json]\n\n\
Categorizes a recorded OOK duration trace and prints the duration-level sequence.\n\
Examples:\n  {program} data/trace.json --format both --json-out trace_report.json\n  {program} trace.json --format text\n"
    )
}
