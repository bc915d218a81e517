use color_eyre::{
    eyre::{bail, eyre, WrapErr},
    Result,
};
use immersive_fullscreen::geometry::{Point, Rect};
use immersive_fullscreen::immersive::{
    HeadlessWindow, ImmersiveCommand, ImmersiveController, ImmersiveHandle, ImmersiveNotification,
    ImmersiveStatus,
};
use immersive_fullscreen::prefs::TomlPrefStore;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_BOUNDS: (i32, i32) = (1920, 1080);

#[derive(Debug, Clone, PartialEq)]
struct SimArgs {
    prefs_path: Option<PathBuf>,
    width: i32,
    height: i32,
}

/// One line of stdin, parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SimInput {
    Command(ImmersiveCommand),
    Status,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let args = parse_args(std::env::args().skip(1))?;

    let prefs = match &args.prefs_path {
        Some(path) => TomlPrefStore::open(path.clone()),
        None => TomlPrefStore::open_default(),
    }
    .wrap_err("Failed to open preference file")?;
    info!("Using preferences from {}", prefs.path().display());

    let window = HeadlessWindow::new(Rect::new(0, 0, args.width, args.height));
    let controller = ImmersiveController::attach_to(Box::new(window), Box::new(prefs));

    let (notification_tx, mut notification_rx) = mpsc::channel(100);
    let mut handle = ImmersiveHandle::spawn(controller, notification_tx);

    let _printer = tokio::spawn(async move {
        while let Some(notification) = notification_rx.recv().await {
            println!("{}", format_notification(&notification));
        }
        debug!("Notification channel closed");
    });

    let commands = handle.sender();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_input(line) {
            Ok(SimInput::Command(command)) => commands
                .send(command)
                .await
                .map_err(|e| eyre!("Controller stopped: {}", e))?,
            Ok(SimInput::Status) => println!("{}", format_status(&handle.status())),
            Ok(SimInput::Quit) => break,
            Err(e) => warn!("{}", e),
        }
    }

    drop(commands);
    let detached = handle
        .shutdown()
        .await
        .map_err(|e| eyre!("Failed to shut down controller: {}", e))?;
    println!("final {}", format_status(&detached.status()));

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(log_level(std::env::var("RUST_LOG").ok().as_deref()))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .pretty()
        .init();
}

/// `RUST_LOG` naming a single level sets the maximum; anything else means INFO.
fn log_level(rust_log: Option<&str>) -> Level {
    rust_log
        .and_then(|value| value.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<SimArgs> {
    let (mut width, mut height) = DEFAULT_BOUNDS;
    let mut prefs_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--prefs" => {
                let path = args.next().ok_or_else(|| eyre!("--prefs needs a path"))?;
                prefs_path = Some(PathBuf::from(path));
            }
            "--bounds" => {
                let bounds = args
                    .next()
                    .ok_or_else(|| eyre!("--bounds needs WIDTHxHEIGHT"))?;
                (width, height) = parse_bounds(&bounds)?;
            }
            other => bail!("Unknown argument: {}", other),
        }
    }

    Ok(SimArgs {
        prefs_path,
        width,
        height,
    })
}

fn parse_bounds(bounds: &str) -> Result<(i32, i32)> {
    let (width, height) = bounds
        .split_once('x')
        .ok_or_else(|| eyre!("Bounds must look like WIDTHxHEIGHT, got {}", bounds))?;
    let width: i32 = width.parse().wrap_err("Invalid width")?;
    let height: i32 = height.parse().wrap_err("Invalid height")?;
    if width <= 0 || height <= 0 {
        bail!("Bounds must be positive, got {}x{}", width, height);
    }
    Ok((width, height))
}

fn parse_input(line: &str) -> Result<SimInput> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or_else(|| eyre!("Empty command"))?;

    let input = match verb {
        "move" => {
            let x = parse_coordinate(words.next(), "x")?;
            let y = parse_coordinate(words.next(), "y")?;
            SimInput::Command(ImmersiveCommand::MouseMoved(Point::new(x, y)))
        }
        "focus" => SimInput::Command(ImmersiveCommand::AddressBarFocused),
        "blur" => SimInput::Command(ImmersiveCommand::AddressBarBlurred),
        "key" => SimInput::Command(ImmersiveCommand::KeyboardActivity),
        "fullscreen" => match words.next() {
            Some("on") => SimInput::Command(ImmersiveCommand::FullscreenChanged(true)),
            Some("off") => SimInput::Command(ImmersiveCommand::FullscreenChanged(false)),
            _ => bail!("Usage: fullscreen on|off"),
        },
        "tab" => SimInput::Command(ImmersiveCommand::ActiveTabChanged),
        "reveal" => SimInput::Command(ImmersiveCommand::RevealUi),
        "hide" => SimInput::Command(ImmersiveCommand::HideUiAfterDelay),
        "hide-now" => SimInput::Command(ImmersiveCommand::HideUiImmediately),
        "pin" => SimInput::Command(ImmersiveCommand::PinUi),
        "unpin" => SimInput::Command(ImmersiveCommand::UnpinUi),
        "enable" => SimInput::Command(ImmersiveCommand::SetEnabled(true)),
        "disable" => SimInput::Command(ImmersiveCommand::SetEnabled(false)),
        "status" => SimInput::Status,
        "quit" | "exit" => SimInput::Quit,
        other => bail!("Unknown command: {}", other),
    };

    if words.next().is_some() {
        bail!("Too many arguments for {}", verb);
    }
    Ok(input)
}

fn parse_coordinate(word: Option<&str>, name: &str) -> Result<i32> {
    let word = word.ok_or_else(|| eyre!("Usage: move X Y"))?;
    word.parse()
        .wrap_err_with(|| format!("Invalid {} coordinate: {}", name, word))
}

fn format_notification(notification: &ImmersiveNotification) -> String {
    format!(
        "[{}] {:?}",
        notification.at.format("%H:%M:%S%.3f"),
        notification.event
    )
}

fn format_status(status: &ImmersiveStatus) -> String {
    format!(
        "state={} visible={} hover={} focus={} animation={:?} auto_hide={}",
        status.state,
        status.ui_visible,
        status.hovering_top_edge,
        status.address_bar_focused,
        status.animation,
        status.auto_hide_pending
    )
}
