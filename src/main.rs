use anyhow::{Context, Result, bail};
use rulegate::engine::{CancelToken, Engine, Registry};
use rulegate::report::get_reporter;
use rulegate::{cli, init_logging};
use std::sync::Arc;

/// Exit code when no rule fired.
const EXIT_CLEAN: i32 = 0;
/// Exit code when at least one rule fired (constraints apply).
const EXIT_FIRED: i32 = 1;
/// Exit code on load/parse failure.
const EXIT_LOAD_FAILURE: i32 = 2;

fn main() {
    match run_main() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            display_error(&e);
            std::process::exit(EXIT_LOAD_FAILURE);
        }
    }
}

/// Display an error with its full cause chain.
fn display_error(error: &anyhow::Error) {
    eprintln!("\u{26a0} Error: {error}");

    let causes: Vec<_> = error.chain().skip(1).collect();
    if !causes.is_empty() {
        eprintln!("\nCaused by:");
        for (i, cause) in causes.iter().enumerate() {
            let prefix = if i == causes.len() - 1 {
                "\u{2514}\u{2500}"
            } else {
                "\u{251c}\u{2500}"
            };
            eprintln!("{prefix} {cause}");
        }
    }
}

fn run_main() -> Result<i32> {
    let args = cli::args::parse();

    init_logging(args.verbose);

    let config = cli::config::load(&args)?;
    let merged = cli::config::merge(&args, &config);

    tracing::info!("rulegate v{} starting", env!("CARGO_PKG_VERSION"));

    let request_text = match (&args.request, &args.request_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?,
        (None, None) => bail!("Provide a request via --request or --request-file"),
    };

    let content_snippet = match (&args.content, &args.content_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read content file {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let (registry, load_errors) = Registry::load_dir(&args.rules_dir).with_context(|| {
        format!("Failed to read rules directory {}", args.rules_dir.display())
    })?;

    // The library tolerates a partial rule set; the CLI does not, since a
    // silently skipped rule would mask authoring mistakes.
    if !load_errors.is_empty() {
        for error in &load_errors {
            eprintln!("\u{26a0} {error}");
        }
        bail!(
            "{} rule source(s) failed to load from {}",
            load_errors.len(),
            args.rules_dir.display()
        );
    }

    let engine = Engine::new(Arc::new(registry));
    let cancel = merged
        .timeout
        .map_or_else(CancelToken::new, CancelToken::with_timeout);
    let result = engine.evaluate_with_cancel(&request_text, content_snippet.as_deref(), &cancel);

    if !args.quiet {
        let reporter = get_reporter(&merged.format)
            .with_context(|| format!("Unknown report format '{}'", merged.format))?;
        let rendered = reporter.format(&result)?;
        println!("{rendered}");
    }

    Ok(if result.any_fired { EXIT_FIRED } else { EXIT_CLEAN })
}
