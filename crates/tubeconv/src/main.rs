use std::fs;
use std::io::{self, IsTerminal, Read};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use tracing_subscriber::EnvFilter;
use tubeconv::{
    ConsoleNotifier, ConvertError, ConvertResult, SystemOpener, TargetFormat, build_orchestrator,
    submit,
};
use tubeconv_config::{
    config_path, load_config, open_in_editor, resolve_settings, set_config_value,
};

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Open config file in editor
    Edit,
    /// Print the config file location
    Path,
}

#[derive(Debug, Parser)]
#[command(name = "tubeconv")]
#[command(version, about = "Turn YouTube links into audio or video downloads", long_about = None)]
struct Cli {
    /// Output format: audio (mp3) or video (mp4)
    #[arg(short, long)]
    format: Option<String>,
    /// Read URLs from a file, one per line
    #[arg(long)]
    input: Option<String>,
    /// Print only download links
    #[arg(long)]
    simple: bool,
    /// Open download links after conversion
    #[arg(long, conflicts_with = "no_open")]
    open: bool,
    /// Never open download links
    #[arg(long)]
    no_open: bool,
    /// Seconds to wait for each provider
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
    /// Log provider attempts to stderr
    #[arg(short, long)]
    verbose: bool,
    #[arg(value_name = "URL")]
    urls: Vec<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(Commands::Config { action }) = cli.command {
        if let Err(err) = handle_config_command(action) {
            eprintln!("{} {err}", style("Error:").red());
            std::process::exit(1);
        }
        return;
    }

    let config = load_config().unwrap_or_else(|err| exit_with(err));
    let mut settings = resolve_settings(&config).unwrap_or_else(|err| exit_with(err));

    if let Some(secs) = cli.timeout {
        if secs == 0 {
            exit_with(ConvertError::InvalidInput(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        settings.timeout = Duration::from_secs(secs);
    }
    settings.simple |= cli.simple;
    if cli.open {
        settings.open_links = true;
    } else if cli.no_open {
        settings.open_links = false;
    }

    let urls = gather_inputs(&cli).unwrap_or_else(|err| exit_with(err));
    if urls.is_empty() {
        exit_with(ConvertError::InvalidInput("no input URLs provided".to_string()));
    }

    let format = resolve_format(cli.format.as_deref(), settings.default_format)
        .unwrap_or_else(|err| exit_with(err));

    let orchestrator = build_orchestrator(&settings);
    let notifier = if settings.open_links {
        ConsoleNotifier::new(settings.simple).with_opener(SystemOpener)
    } else {
        ConsoleNotifier::new(settings.simple)
    };

    let mut success = 0usize;
    let mut failed = 0usize;

    for url in &urls {
        if submit(url, format, &orchestrator, &notifier).await.is_success() {
            success += 1;
        } else {
            failed += 1;
        }
    }

    if !settings.simple {
        print_summary(success + failed, success, failed);
    }
    if failed > 0 {
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "tubeconv=debug,tubeconv_providers=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn exit_with(err: ConvertError) -> ! {
    eprintln!("{} {err}", style("Error:").red());
    std::process::exit(1);
}

fn gather_inputs(cli: &Cli) -> ConvertResult<Vec<String>> {
    let mut urls = cli.urls.clone();

    if let Some(path) = &cli.input {
        let content = fs::read_to_string(path)
            .map_err(|err| ConvertError::InvalidInput(format!("failed to read input file: {err}")))?;
        urls.extend(parse_lines(&content));
    }

    if urls.is_empty() {
        if io::stdin().is_terminal() {
            let url: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("YouTube URL")
                .interact_text()
                .map_err(|err| ConvertError::InvalidInput(format!("prompt failed: {err}")))?;
            urls.extend(parse_lines(&url));
        } else {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| ConvertError::InvalidInput(format!("failed to read stdin: {err}")))?;
            urls.extend(parse_lines(&buffer));
        }
    }

    Ok(urls)
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .collect()
}

fn resolve_format(
    explicit: Option<&str>,
    default_format: Option<TargetFormat>,
) -> ConvertResult<TargetFormat> {
    if let Some(raw) = explicit {
        return raw.parse();
    }
    if let Some(format) = default_format {
        return Ok(format);
    }
    if !io::stdin().is_terminal() {
        return Ok(TargetFormat::Audio);
    }

    let options = [TargetFormat::Audio, TargetFormat::Video];
    let labels = ["Audio (mp3)", "Video (mp4)"];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select output format")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(|err| ConvertError::InvalidInput(format!("selection failed: {err}")))?;

    Ok(options[selection])
}

fn handle_config_command(action: ConfigAction) -> ConvertResult<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = load_config()?;
            match config.get(&key) {
                Some(v) => println!("{} = {}", key, v),
                None => println!("{} = <null>", key),
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            set_config_value(&key, &value)?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
            Ok(())
        }
        ConfigAction::List => {
            let config = load_config()?;
            println!("Current configuration:");
            let mut current_table = "";
            for (key, value) in config.entries() {
                let (table, field) = key.split_once('.').unwrap_or(("", key));
                if table != current_table {
                    println!("\n[{table}]");
                    current_table = table;
                }
                println!("{field} = {}", value.as_deref().unwrap_or("<null>"));
            }
            Ok(())
        }
        ConfigAction::Edit => open_in_editor(),
        ConfigAction::Path => {
            println!("{}", config_path()?.display());
            Ok(())
        }
    }
}

fn print_summary(total: usize, success: usize, failed: usize) {
    println!(
        "{} Total: {} | Success: {} | Failed: {}",
        style("Summary:").bold(),
        total,
        success,
        failed
    );
}
