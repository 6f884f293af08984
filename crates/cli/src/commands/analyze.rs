use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::*;
use serde::Deserialize;

use pagecheck_rules::rules::builtin_rules;
use pagecheck_rules::{
    filter_compatible, AlwaysAcceptFilter, BasicLocalizer, DomDocument, Engine, InputSet,
    Resource, ResultFilter, TextRenderer, TimelineEvent, UrlExclusionFilter,
};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Page capture file (JSON)
    pub input: PathBuf,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit the raw result record as JSON instead of a text report
    #[arg(long)]
    pub json: bool,

    /// Drop findings whose URLs contain this substring (repeatable)
    #[arg(long = "exclude-url", value_name = "SUBSTRING")]
    pub exclude_url: Vec<String>,

    /// Report rules excluded by the capability filter
    #[arg(short, long)]
    pub verbose: bool,
}

/// On-disk page capture format. A thin mirror of the library's input
/// types with optional fields defaulted, so hand-written captures stay
/// terse.
#[derive(Debug, Deserialize)]
pub struct PageCapture {
    pub resources: Vec<CapturedResource>,
    #[serde(default)]
    pub dom: Option<DomDocument>,
    #[serde(default)]
    pub timeline: Option<Vec<TimelineEvent>>,
    #[serde(default)]
    pub primary_resource_url: Option<String>,
    #[serde(default)]
    pub onload_millis: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CapturedResource {
    pub url: String,
    pub status_code: i32,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub request_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub response_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub request_start_millis: Option<u64>,
}

pub fn build_input(capture: PageCapture) -> Result<InputSet> {
    let mut input = InputSet::new();
    for captured in capture.resources {
        let mut resource = Resource::new(&captured.url, captured.status_code);
        if let Some(method) = &captured.method {
            resource = resource.with_request_method(method);
        }
        for (name, value) in &captured.request_headers {
            resource = resource.with_request_header(name, value);
        }
        for (name, value) in &captured.response_headers {
            resource = resource.with_response_header(name, value);
        }
        if let Some(body) = captured.body {
            resource = resource.with_response_body(body);
        }
        if let Some(start) = captured.request_start_millis {
            resource = resource.with_request_start_millis(start);
        }
        input
            .add_resource(resource)
            .with_context(|| format!("rejected resource {}", captured.url))?;
    }
    if let Some(dom) = capture.dom {
        input.set_dom(dom)?;
    }
    if let Some(timeline) = capture.timeline {
        input.set_timeline(timeline)?;
    }
    if let Some(url) = capture.primary_resource_url {
        input.set_primary_resource_url(url)?;
    }
    if let Some(millis) = capture.onload_millis {
        input.set_onload_millis(millis)?;
    }
    input.freeze();
    Ok(input)
}

fn score_banner(score: i32) -> ColoredString {
    let text = format!("Overall score: {score}/100");
    if score >= 80 {
        text.bright_green().bold()
    } else if score >= 50 {
        text.bright_yellow().bold()
    } else {
        text.bright_red().bold()
    }
}

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read capture file {}", args.input.display()))?;
    let capture: PageCapture =
        serde_json::from_str(&raw).context("capture file is not valid JSON")?;
    let input = build_input(capture)?;

    let (runnable, excluded) = filter_compatible(builtin_rules(), input.available_capabilities());
    if args.verbose {
        for rule in &excluded {
            eprintln!(
                "{} {} (missing {:?})",
                "excluded:".bright_yellow(),
                rule.rule_name,
                rule.missing
            );
        }
    }
    if runnable.is_empty() {
        bail!("the capture supports none of the available rules");
    }

    let mut engine = Engine::with_rules(runnable);
    engine.init();
    let results = engine.compute_results(&input)?;

    let filter: Box<dyn ResultFilter> = if args.exclude_url.is_empty() {
        Box::new(AlwaysAcceptFilter)
    } else {
        Box::new(UrlExclusionFilter::new(args.exclude_url.clone()))
    };

    let report = if args.json {
        if args.exclude_url.is_empty() {
            results.to_json()?
        } else {
            engine.filter_results(&results, filter.as_ref())?.to_json()?
        }
    } else {
        let formatted = engine.format_results(&results, filter.as_ref())?;
        let localizer = BasicLocalizer;
        let mut text = TextRenderer::new(&localizer).render(&formatted);
        if let Some(score) = formatted.overall_score {
            // Swap the plain banner for a colored one on terminals.
            let plain = format!("Overall score: {score}/100");
            text = text.replacen(&plain, &score_banner(score).to_string(), 1);
        }
        format!(
            "pagecheck report for {} ({})\n\n{}",
            args.input.display(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            text
        )
    };

    match &args.output {
        Some(path) => fs::write(path, &report)
            .with_context(|| format!("cannot write report to {}", path.display()))?,
        None => print!("{report}"),
    }

    if !results.is_success() {
        bail!(
            "rules failed during analysis: {}",
            results.error_rules.join(", ")
        );
    }
    Ok(())
}
