use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::thread;

use console::style;
use tubeconv_core::{ConversionResult, ConvertError, ConvertResult};

pub trait Notifier: Send + Sync {
    fn notify(&self, result: &ConversionResult);
}

/// Hands a download link to whatever can fetch it.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> ConvertResult<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> ConvertResult<()> {
        let mut command = opener_command(url);
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| ConvertError::LinkOpen(err.to_string()))?;

        // Reaped off-thread so the launcher does not linger as a zombie.
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

/// Builds the platform launcher. The URL is always a plain argument to a
/// non-shell program; `cmd /C start` would interpret `&`, `|` and `^`.
fn opener_command(url: &str) -> Command {
    let (program, leading): (&str, &[&str]) = if cfg!(target_os = "windows") {
        ("rundll32", &["url.dll,FileProtocolHandler"])
    } else if cfg!(target_os = "macos") {
        ("open", &[])
    } else {
        ("xdg-open", &[])
    };

    let mut command = Command::new(program);
    command.args(leading).arg(url);
    command
}

pub struct ConsoleNotifier {
    simple: bool,
    opener: Option<Box<dyn LinkOpener>>,
}

impl ConsoleNotifier {
    pub fn new(simple: bool) -> Self {
        Self {
            simple,
            opener: None,
        }
    }

    pub fn with_opener(mut self, opener: impl LinkOpener + 'static) -> Self {
        self.opener = Some(Box::new(opener));
        self
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, result: &ConversionResult) {
        match result {
            ConversionResult::Success {
                download_url,
                provider,
            } => {
                if self.simple {
                    println!("{download_url}");
                } else {
                    println!("{} via {provider}", style("Converted").green());
                    println!("  {} {download_url}", style("Download:").dim());
                }
                if let Some(opener) = &self.opener
                    && let Err(err) = opener.open(download_url)
                {
                    eprintln!("{} {err}", style("Warning:").yellow());
                }
            }
            ConversionResult::Failure { message } => {
                eprintln!("{} {message}", style("Failed").red());
            }
        }
    }
}

/// Keeps every result it is given; for callers that render results themselves.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    results: Mutex<Vec<ConversionResult>>,
}

impl CollectingNotifier {
    pub fn results(&self) -> Vec<ConversionResult> {
        self.results
            .lock()
            .map(|results| results.clone())
            .unwrap_or_default()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, result: &ConversionResult) {
        if let Ok(mut results) = self.results.lock() {
            results.push(result.clone());
        }
    }
}
