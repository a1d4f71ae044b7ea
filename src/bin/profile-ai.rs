//! CLI binary for gigexecs-profile-ai.
//!
//! A thin shim over the library crate that maps CLI flags to `FlowConfig`,
//! runs the import flow, and prints the reconciled draft.

use anyhow::{Context, Result};
use clap::Parser;
use gigexecs_profile_ai::{
    import::resolve_backend, import_cv, import_pasted_text, reconcile, CvFile, DraftProfile,
    Eligibility, FlowConfig, ImportProgressCallback, ProgressCallback, ReviewSession,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: spinner during upload, a determinate bar across the
/// poll attempt budget, a hint line when the paste fallback applies.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: u32) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} checks  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Parsing");
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ImportProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, file_name: &str, size_bytes: u64) {
        self.bar.set_prefix("Uploading");
        self.bar
            .set_message(format!("{file_name} ({:.2} MB)", size_bytes as f64 / 1024.0 / 1024.0));
    }

    fn on_upload_complete(&self, source_file_id: &str) {
        self.bar.println(format!(
            "  {} Uploaded  {}",
            green("✓"),
            dim(source_file_id)
        ));
    }

    fn on_poll_attempt(&self, attempt: u32, max_attempts: u32, _percent: u8) {
        if self.bar.length().unwrap_or(0) != max_attempts as u64 {
            self.activate_bar(max_attempts);
        }
        self.bar.set_position(attempt as u64);
    }

    fn on_parse_complete(&self) {
        self.bar.println(format!("  {} Parsed", green("✓")));
    }

    fn on_fallback_suggested(&self, reason: String) {
        self.bar.println(format!(
            "  {} {}  {}",
            yellow("⚠"),
            "Extraction failed — retry with --paste <textfile>",
            dim(&reason)
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Import a CV and print the extracted draft
  profile-ai cv.pdf

  # Import and publish in one go
  profile-ai cv.pdf --publish

  # The extraction service couldn't read the PDF? Paste the text instead
  profile-ai --paste cv.txt

  # Structured output for scripting
  profile-ai cv.pdf --json > draft.json

ENVIRONMENT VARIABLES:
  GIGEXECS_API_BASE     API base URL (e.g. https://gigexecs.com/.netlify/functions)
  GIGEXECS_AUTH_TOKEN   Bearer token of the active session

SETUP:
  1. Log in and copy a session token:  export GIGEXECS_AUTH_TOKEN=eyJ...
  2. Point at the platform:            export GIGEXECS_API_BASE=https://gigexecs.com/.netlify/functions
  3. Import:                           profile-ai cv.pdf
"#;

/// Import a CV into a GigExecs profile draft using the AI parser.
#[derive(Parser, Debug)]
#[command(
    name = "profile-ai",
    version,
    about = "Import a CV into a GigExecs profile draft using the AI parser",
    long_about = "Upload a CV (PDF, DOC, DOCX — max 10 MB), drive the asynchronous parse job, \
and print the reconciled profile draft. When the document cannot be extracted, fall back to \
pasted text with --paste.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// CV file to import (.pdf, .doc, .docx).
    input: Option<PathBuf>,

    /// Text file with the pasted CV content (fallback path, 100–30000 chars).
    #[arg(long, conflicts_with = "input")]
    paste: Option<PathBuf>,

    /// API base URL.
    #[arg(long, env = "GIGEXECS_API_BASE")]
    api_base: Option<String>,

    /// Session bearer token.
    #[arg(long, env = "GIGEXECS_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Publish the draft after a successful import.
    #[arg(long)]
    publish: bool,

    /// Output the draft (and eligibility) as JSON instead of a summary.
    #[arg(long)]
    json: bool,

    /// Delay between parse-status checks, in milliseconds.
    #[arg(long, env = "PROFILE_AI_POLL_INTERVAL_MS", default_value_t = 2000)]
    poll_interval_ms: u64,

    /// Maximum parse-status checks before giving up.
    #[arg(long, env = "PROFILE_AI_MAX_ATTEMPTS", default_value_t = 60)]
    max_attempts: u32,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "PROFILE_AI_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Disable the progress bar.
    #[arg(long, env = "PROFILE_AI_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PROFILE_AI_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the requested result.
    #[arg(short, long, env = "PROFILE_AI_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar is the feedback channel that matters.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<(Arc<CliProgressCallback>, ProgressCallback)> = if show_progress {
        let cb = CliProgressCallback::new();
        Some((Arc::clone(&cb), cb as ProgressCallback))
    } else {
        None
    };

    let mut builder = FlowConfig::builder()
        .poll_interval_ms(cli.poll_interval_ms)
        .max_poll_attempts(cli.max_attempts)
        .request_timeout_secs(cli.timeout);
    if let Some(ref base) = cli.api_base {
        builder = builder.api_base_url(base);
    }
    if let Some(ref token) = cli.token {
        builder = builder.auth_token(token);
    }
    if let Some((_, ref cb)) = progress {
        builder = builder.progress_callback(Arc::clone(cb));
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run the import ───────────────────────────────────────────────────
    let review = if let Some(ref paste_path) = cli.paste {
        let text = tokio::fs::read_to_string(paste_path)
            .await
            .with_context(|| format!("Failed to read {}", paste_path.display()))?;
        import_pasted_text(&text, &config)
            .await
            .context("Pasted-text parse failed")?
    } else {
        let input = cli
            .input
            .as_ref()
            .context("Provide a CV file, or --paste <textfile>")?;
        let file = CvFile::from_path(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?;
        import_cv(file, &config).await.context("Import failed")?
    };

    if let Some((ref cli_cb, _)) = progress {
        cli_cb.finish();
    }

    // ── Output ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "draft": review.draft(),
            "eligibility": review.eligibility(),
        }))
        .context("Failed to serialise draft")?;
        println!("{json}");
    } else {
        print_summary(review.draft(), review.eligibility());
    }

    // ── Publish ──────────────────────────────────────────────────────────
    if cli.publish {
        publish(review, &config, cli.quiet).await?;
    } else if !cli.quiet && !cli.json {
        eprintln!("{}", dim("Re-run with --publish to save this draft."));
    }

    Ok(())
}

async fn publish(mut review: ReviewSession, config: &FlowConfig, quiet: bool) -> Result<()> {
    let api = resolve_backend(config).context("Cannot reach the platform")?;
    let receipt = review.publish(&api).await.context("Publish failed")?;

    if quiet {
        return Ok(());
    }
    eprintln!(
        "{} Published{}",
        green("✔"),
        receipt
            .completeness
            .map(|p| format!("  —  profile {}% complete", bold(&p.to_string())))
            .unwrap_or_default()
    );
    if let Some(sections) = receipt.sections {
        eprintln!(
            "   {} work experiences, {} education entries, {} skills matched",
            sections.work_experience.saved, sections.education.saved, sections.skills.matched
        );
    }
    if !receipt.unmatched_skills.is_empty() {
        eprintln!(
            "{} Unmatched skills (add these manually later): {}",
            yellow("⚠"),
            receipt.unmatched_skills.join(", ")
        );
    }
    Ok(())
}

/// Human-readable draft summary, reconciled field names throughout.
fn print_summary(draft: &DraftProfile, eligibility: Option<&Eligibility>) {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(ref basic) = draft.basic_info {
        let name = [basic.first_name.as_deref(), basic.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            let _ = writeln!(out, "{}", bold(&name));
        }
        if let Some(ref headline) = basic.headline {
            let _ = writeln!(out, "{}", dim(headline));
        }
        if let Some(ref location) = basic.location {
            let _ = writeln!(out, "{}", dim(location));
        }
        let _ = writeln!(out);
    }

    if !draft.work_experience.is_empty() {
        let _ = writeln!(out, "{}", cyan(&format!("Experience ({})", draft.work_experience.len())));
        for exp in &draft.work_experience {
            let years = match (reconcile::start_year(exp), reconcile::end_label(exp)) {
                (Some(start), end) if !end.is_empty() => format!("  {}–{}", start, end),
                (Some(start), _) => format!("  {start}–"),
                _ => String::new(),
            };
            let _ = writeln!(
                out,
                "  • {} — {}{}",
                reconcile::job_title(exp).unwrap_or("(untitled)"),
                exp.company,
                dim(&years)
            );
        }
        let _ = writeln!(out);
    }

    if !draft.education.is_empty() {
        let _ = writeln!(out, "{}", cyan(&format!("Education ({})", draft.education.len())));
        for edu in &draft.education {
            let _ = writeln!(
                out,
                "  • {} — {}",
                reconcile::degree(edu).unwrap_or("(degree unknown)"),
                reconcile::institution(edu).unwrap_or("(institution unknown)"),
            );
        }
        let _ = writeln!(out);
    }

    if !draft.skills.is_empty() {
        let _ = writeln!(out, "{}", cyan(&format!("Skills ({})", draft.skills.len())));
        let _ = writeln!(out, "  {}", draft.skills.join(", "));
        let _ = writeln!(out);
    }

    if !draft.certifications.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            cyan(&format!("Certifications ({})", draft.certifications.len()))
        );
        for cert in &draft.certifications {
            let _ = writeln!(out, "  • {}", cert.name);
        }
        let _ = writeln!(out);
    }

    if let Some(elig) = eligibility {
        let verdict = if elig.meets_threshold {
            green("meets the experience threshold")
        } else {
            red("may not meet the 15+ year threshold")
        };
        let _ = writeln!(
            out,
            "~{} years experience — {} {}",
            elig.years_of_experience_estimate,
            verdict,
            dim(&format!("({:?} confidence)", elig.confidence)),
        );
    }
}
