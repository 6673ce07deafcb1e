use clap::{Arg, ArgAction, Command};
use log::{debug, error, info, warn, LevelFilter};
use retrospective::config::{self, ConfigSource, PageContent};
use retrospective::generator::{Credential, GeminiImageClient};
use retrospective::page::Page;
use retrospective::section::DisplayMode;
use retrospective::validation;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Debug)]
enum AppError {
    ContentError(String),
    ArgumentError(String),
    PathError(String),
    OutputError(String),
}

/// Verbosity level for output
#[derive(Debug, Clone, Copy, PartialEq)]
enum Verbosity {
    Quiet,   // No output except errors
    Normal,  // Standard output
    Verbose, // Detailed output
}

/// Content file picked up from the working directory when `--content` is absent.
const LOCAL_CONTENT_FILE: &str = "retrospective.toml";

fn get_verbosity(matches: &clap::ArgMatches) -> Verbosity {
    if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Get the content file to load, if any.
///
/// Priority order:
/// 1. If `--content` is explicitly provided, use that file
/// 2. If `retrospective.toml` exists in current directory, use it
/// 3. If `<config dir>/retrospective/content.toml` exists, use it
/// 4. Otherwise `None`: the built-in content is used
fn get_content_path(matches: &clap::ArgMatches) -> Option<PathBuf> {
    if let Some(content_file) = matches.get_one::<String>("content") {
        return Some(PathBuf::from(content_file));
    }

    let local = Path::new(LOCAL_CONTENT_FILE);
    if local.exists() {
        return Some(local.to_path_buf());
    }

    dirs::config_dir()
        .map(|dir| dir.join("retrospective").join("content.toml"))
        .filter(|path| path.exists())
}

fn load_content(matches: &clap::ArgMatches) -> Result<PageContent, AppError> {
    let result = match get_content_path(matches) {
        Some(path) => {
            debug!("Loading content from {}", path.display());
            config::load_content_from_source(ConfigSource::File(&path))
        }
        None => {
            debug!("Using built-in content");
            config::load_content_from_source(ConfigSource::Default)
        }
    };
    result.map_err(|e| AppError::ContentError(e.to_string()))
}

fn get_output_path(matches: &clap::ArgMatches) -> Result<PathBuf, AppError> {
    let current_dir = std::env::current_dir().map_err(|e| AppError::PathError(e.to_string()))?;

    Ok(matches
        .get_one::<String>("output")
        .map(|p| current_dir.join(p))
        .unwrap_or_else(|| current_dir.join("index.html")))
}

fn get_mode(matches: &clap::ArgMatches) -> Result<Option<DisplayMode>, AppError> {
    matches
        .get_one::<String>("mode")
        .map(|m| m.parse::<DisplayMode>().map_err(AppError::ArgumentError))
        .transpose()
}

/// Splits a `SECTION=PATH` upload argument.
fn parse_upload(arg: &str) -> Result<(String, PathBuf), AppError> {
    match arg.split_once('=') {
        Some((id, path)) if !id.trim().is_empty() && !path.trim().is_empty() => {
            Ok((id.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(AppError::ArgumentError(format!(
            "Invalid upload '{}': expected SECTION=PATH",
            arg
        ))),
    }
}

fn ensure_slot(page: &Page, id: &str) -> Result<(), AppError> {
    if page.has_slot(id) {
        Ok(())
    } else {
        Err(AppError::ArgumentError(format!(
            "Unknown section '{}'. Available: {}",
            id,
            page.slot_ids().join(", ")
        )))
    }
}

/// Applies every upload; a failed upload is reported and shown on its slot.
fn apply_uploads(page: &mut Page, uploads: &[(String, PathBuf)], verbosity: Verbosity) -> usize {
    let mut failures = 0;
    for (id, path) in uploads {
        match page.slots_mut().upload_file(id, path) {
            Ok(()) => {
                if verbosity == Verbosity::Verbose {
                    info!("🖼  {} -> section '{}'", path.display(), id);
                }
            }
            Err(e) => {
                failures += 1;
                if verbosity != Verbosity::Quiet {
                    println!("⚠️  Section '{}': {}", id, e.user_message());
                }
            }
        }
    }
    failures
}

/// Requests an illustration for each section; failures stay on the slot.
fn apply_generations(page: &mut Page, ids: &[String], verbosity: Verbosity) -> usize {
    let credential = Credential::from_env();
    let client = credential.clone().map(GeminiImageClient::new);
    let mut failures = 0;

    for id in ids {
        let result = match &client {
            Some(client) => page.slots_mut().generate(id, credential.as_ref(), client),
            None => page
                .slots_mut()
                .begin_generation(id, None)
                .map(|_| ()),
        };
        match result {
            Ok(()) => {
                if verbosity != Verbosity::Quiet {
                    println!("🎨 Generated illustration for section '{}'", id);
                }
            }
            Err(e) => {
                failures += 1;
                if verbosity != Verbosity::Quiet {
                    println!("⚠️  Section '{}': {}", id, e.user_message());
                }
            }
        }
    }
    failures
}

fn run(matches: clap::ArgMatches) -> Result<(), AppError> {
    let verbosity = get_verbosity(&matches);
    let dry_run = matches.get_flag("dry-run");

    let mut content = load_content(&matches)?;
    if let Some(model) = matches.get_one::<String>("model") {
        content.generation.model = model.to_string();
    }

    let output_path = get_output_path(&matches)?;
    let output_path_str = output_path
        .to_str()
        .ok_or_else(|| AppError::PathError("Invalid output path".to_string()))?;

    let mut page = Page::new(content);
    if let Some(mode) = get_mode(&matches)? {
        page.set_mode(mode);
    }

    let uploads = matches
        .get_many::<String>("upload")
        .map(|values| values.map(|s| parse_upload(s)).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_default();
    let generate: Vec<String> = matches
        .get_many::<String>("generate")
        .map(|values| values.map(|s| s.to_string()).collect())
        .unwrap_or_default();

    for id in uploads.iter().map(|(id, _)| id).chain(generate.iter()) {
        ensure_slot(&page, id)?;
    }

    // Run validation checks
    let warnings = validation::validate_page(page.content(), page.widgets(), Some(output_path_str));
    if verbosity != Verbosity::Quiet {
        if !warnings.is_empty() {
            if verbosity == Verbosity::Verbose {
                info!("🔍 Pre-flight validation:");
            }
            for warning in &warnings {
                warn!("{}", warning);
            }
        } else if verbosity == Verbosity::Verbose {
            info!("✓ Pre-flight validation passed");
        }
    }

    if dry_run {
        if verbosity == Verbosity::Quiet {
            return if warnings.is_empty() {
                Ok(())
            } else {
                Err(AppError::ContentError(format!(
                    "{} validation warnings",
                    warnings.len()
                )))
            };
        }
        println!("✓ Dry-run validation complete. No page generated.");
        if warnings.is_empty() {
            println!("✓ No issues detected. Run without --dry-run to generate the page.");
        } else {
            for warning in &warnings {
                println!("  • {}", warning);
            }
            println!(
                "⚠️  {} warning(s) found. Review above and run without --dry-run to generate the page anyway.",
                warnings.len()
            );
        }
        return Ok(());
    }

    let failed_uploads = apply_uploads(&mut page, &uploads, verbosity);
    let failed_generations = apply_generations(&mut page, &generate, verbosity);
    if failed_uploads + failed_generations > 0 {
        warn!(
            "{} image operation(s) failed; the affected sections show the error inline",
            failed_uploads + failed_generations
        );
    }

    if verbosity == Verbosity::Verbose {
        info!("📄 Rendering page in {} mode...", page.mode());
    }

    let html = if matches.get_flag("static-mode") {
        page.to_html()
    } else {
        page.to_html_with_toggle()
    };
    retrospective::save_html(&html, output_path_str)
        .map_err(|e| AppError::OutputError(e.to_string()))?;

    if verbosity != Verbosity::Quiet {
        println!("✅ Successfully saved page to {}", output_path_str);

        if verbosity == Verbosity::Verbose {
            let size_kb = html.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.2} MB", size_kb / 1024.0);
            }
        }
    }

    Ok(())
}

fn cli() -> Command {
    Command::new("retrospective")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render a personal year-in-review as a single static HTML page")
        .after_help(
            "EXAMPLES:\n  \
            retrospective -o index.html\n  \
            retrospective -c my-year.toml --mode detail --static-mode\n  \
            retrospective --upload self=./morning.png --upload career=./desk.jpg\n  \
            GEMINI_API_KEY=... retrospective --generate intro --generate mechanism\n  \
            retrospective --print-default-content > retrospective.toml\n",
        )
        .arg(
            Arg::new("content")
                .short('c')
                .long("content")
                .value_name("CONTENT_FILE")
                .help("Path to the content file (TOML format). Auto-detects retrospective.toml if not specified"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_PATH")
                .help("Path to the output HTML file (defaults to ./index.html)"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .value_parser(["simple", "detail"])
                .help("Display mode the page opens in (defaults to the content's default_mode)"),
        )
        .arg(
            Arg::new("static-mode")
                .long("static-mode")
                .help("Render only the selected mode, without the mode switch")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("upload")
                .long("upload")
                .value_name("SECTION=PATH")
                .help("Use a local image file for a section's illustration (can be specified multiple times)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("generate")
                .long("generate")
                .value_name("SECTION")
                .help("Generate a section's illustration with the image service; needs GEMINI_API_KEY (can be specified multiple times)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .value_name("MODEL")
                .help("Image model used by --generate (overrides the content file)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show detailed output including validation warnings and file size")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress all output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Validate content without writing the page")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print-default-content")
                .long("print-default-content")
                .help("Print the built-in retrospective.toml to stdout and exit")
                .action(ArgAction::SetTrue),
        )
}

fn init_logger(verbosity: Verbosity) {
    // RUST_LOG wins over -v/-q
    let mut builder = env_logger::Builder::from_default_env();
    builder.format_timestamp_millis();
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(match verbosity {
            Verbosity::Quiet => LevelFilter::Error,
            Verbosity::Normal => LevelFilter::Warn,
            Verbosity::Verbose => LevelFilter::Info,
        });
    }
    builder.init();
}

fn main() {
    let matches = cli().get_matches();
    init_logger(get_verbosity(&matches));

    if matches.get_flag("print-default-content") {
        print!("{}", config::default_content_toml());
        return;
    }

    if let Err(e) = run(matches) {
        match e {
            AppError::ContentError(e) => error!("[X] Content error: {}", e),
            AppError::ArgumentError(e) => error!("[X] Argument error: {}", e),
            AppError::PathError(e) => error!("[X] Path error: {}", e),
            AppError::OutputError(e) => error!("[X] Output error: {}", e),
        }
        process::exit(1);
    }
}
