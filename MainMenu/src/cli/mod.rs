//! `MainMenu` CLI - turn a main menu background mod into a named mod archive

pub mod progress;
mod prompt;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use console::style;
use indicatif::ProgressBar;

use crate::archive::ArchiveTools;
use crate::config::Settings;
use crate::convert::{ConvertError, ConvertOptions, ConvertStep, convert_mod, validate_identifier};
use progress::{BROOM, CUBE, GEAR, LOOKING_GLASS, PACKAGE, PICTURE, print_done, print_step, simple_spinner};

const NO_SEVEN_ZIP: &str = "7-Zip not found; only zip and 7z archives can be extracted (use --seven-zip to point at it)";

#[derive(Parser, Debug)]
#[command(name = "mainmenu", version)]
#[command(about = "Convert a main menu background mod into a named, self-contained mod archive", long_about = None)]
struct Cli {
    /// Mod archive containing logo.nif or logo01ae.nif (zip, 7z, rar, ...)
    archive: Option<PathBuf>,

    /// Name of the new mod (asked for on standard input if omitted)
    #[arg(short, long)]
    name: Option<String>,

    /// Folder the output archive is written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// 7-Zip executable, for archive formats without built-in support
    #[arg(long, value_name = "PATH")]
    seven_zip: Option<PathBuf>,

    /// Folder to create the temporary workspace in
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Settings file [default: <config dir>/MainMenu/config.json]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Exit immediately after an error instead of waiting for a key
    #[arg(long)]
    no_pause: bool,

    /// Only print errors and the final result
    #[arg(short, long)]
    quiet: bool,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Run the `MainMenu` CLI
pub fn run_cli() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut pause_on_error = !cli.no_pause;
    match run(&cli, &mut pause_on_error) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            for cause in err.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            if pause_on_error {
                prompt::pause();
            }
            let code = err.downcast_ref::<ConvertError>().map_or(1, ConvertError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli, pause_on_error: &mut bool) -> anyhow::Result<()> {
    let archive = cli.archive.as_deref().ok_or(ConvertError::MissingArgument)?;

    let settings = Settings::load(cli.config.as_deref())?;
    *pause_on_error = *pause_on_error && settings.pause_on_error;

    if !cli.quiet {
        print_step(1, ConvertStep::TOTAL, GEAR, "Locating archive tools...");
    }
    let seven_zip = cli.seven_zip.as_deref().or(settings.seven_zip.as_deref());
    let tools = ArchiveTools::locate(seven_zip).map_err(|source| ConvertError::MissingDependency { source })?;
    if let Some(path) = tools.seven_zip() {
        tracing::info!("Using 7-Zip at {}", path.display());
    }
    if let Some(warning) = seven_zip_warning(&tools) {
        tracing::warn!("{warning}");
    }

    let identifier = match &cli.name {
        Some(name) => name.trim().to_string(),
        None => {
            println!("{}", prompt::PROMPT);
            prompt::read_identifier(io::stdin().lock()).map_err(|source| ConvertError::Prompt { source })?
        }
    };
    validate_identifier(&identifier)?;

    let output_dir = cli
        .output_dir
        .clone()
        .or(settings.output_dir)
        .unwrap_or_else(|| default_output_dir(archive));

    let mut options = ConvertOptions::new(identifier, output_dir).with_tools(tools);
    if let Some(temp_root) = cli.temp_dir.clone().or(settings.temp_dir) {
        options = options.with_temp_root(temp_root);
    }

    let start = Instant::now();
    let mut spinner: Option<ProgressBar> = None;
    let result = convert_mod(archive, &options, |step| {
        if let Some(pb) = spinner.take() {
            pb.finish_and_clear();
        }
        if cli.quiet {
            return;
        }
        print_step(step.number(), ConvertStep::TOTAL, step_emoji(step), step.description());
        if matches!(step, ConvertStep::Extracting | ConvertStep::Repackaging) {
            spinner = Some(simple_spinner(&archive.display().to_string()));
        }
    });
    if let Some(pb) = spinner.take() {
        pb.finish_and_clear();
    }
    let report = result?;

    println!("Done!");
    if !cli.quiet {
        println!(
            "Patched {} shape(s), relocated {}",
            report.shapes_patched,
            report.old_texture
        );
        println!("Wrote {}", style(report.output.display()).green());
        print_done(start.elapsed());
    }
    Ok(())
}

fn seven_zip_warning(tools: &ArchiveTools) -> Option<&'static str> {
    tools.seven_zip().is_none().then_some(NO_SEVEN_ZIP)
}

/// The archive's own folder, or the current directory for a bare file name.
fn default_output_dir(archive: &Path) -> PathBuf {
    archive
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn step_emoji(step: ConvertStep) -> console::Emoji<'static, 'static> {
    match step {
        ConvertStep::Extracting | ConvertStep::Repackaging => PACKAGE,
        ConvertStep::LocatingMesh => LOOKING_GLASS,
        ConvertStep::PatchingMesh => CUBE,
        ConvertStep::RelocatingTexture => PICTURE,
        ConvertStep::CleaningUp => BROOM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_archive_is_optional_for_the_parser() {
        let cli = Cli::try_parse_from(["mainmenu", "--no-pause"]).unwrap();
        assert!(cli.archive.is_none());
        assert!(cli.no_pause);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "mainmenu", "mod.7z", "-n", "MyMod", "-o", "out", "--seven-zip", "/bin/7z", "-q",
        ])
        .unwrap();
        assert_eq!(cli.archive, Some(PathBuf::from("mod.7z")));
        assert_eq!(cli.name.as_deref(), Some("MyMod"));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.seven_zip, Some(PathBuf::from("/bin/7z")));
        assert!(cli.quiet);
    }

    #[test]
    fn test_missing_archive_is_missing_argument() {
        let cli = Cli::try_parse_from(["mainmenu"]).unwrap();
        let mut pause = false;
        let err = run(&cli, &mut pause).unwrap_err();
        let convert_err = err.downcast_ref::<ConvertError>().unwrap();
        assert_eq!(convert_err.kind(), crate::convert::ErrorKind::MissingArgument);
    }

    #[test]
    fn test_seven_zip_warning_only_without_seven_zip() {
        assert_eq!(seven_zip_warning(&ArchiveTools::builtin()), Some(NO_SEVEN_ZIP));
        assert_eq!(seven_zip_warning(&ArchiveTools::with_seven_zip("/usr/bin/7z")), None);
    }

    #[test]
    fn test_default_output_dir() {
        assert_eq!(default_output_dir(Path::new("mod.zip")), PathBuf::from("."));
        assert_eq!(
            default_output_dir(Path::new("downloads/mod.zip")),
            PathBuf::from("downloads")
        );
    }
}
