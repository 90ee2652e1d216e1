//! `lendfront` CLI: offline tooling for a site settings profile.
//!
//! Opens the same profile file the server uses and works on it through the
//! settings store, so every read falls back to defaults and every write is
//! validated against the group's shape exactly as the site would.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::io::AsyncReadExt;

use lendfront_core::adapter::DefaultReason;
use lendfront_core::admin::AdminGate;
use lendfront_core::group::GroupId;
use lendfront_core::schema::{DeviceClass, Section};
use lendfront_core::store::{HydrationReport, Origin, SettingsStore};
use lendfront_core::style::{StyleBlock, Surface};
use lendfront_storage::{ProfileBackend, StorageBackend};

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

static COLOR: AtomicBool = AtomicBool::new(true);

fn paint(code: &'static str) -> &'static str {
    if COLOR.load(Ordering::Relaxed) { code } else { "" }
}

// ── CLI structure ────────────────────────────────────────────────────

/// lendfront: site settings profile tool.
#[derive(Parser)]
#[command(
    name = "lendfront",
    version,
    about = "lendfront CLI: inspect, edit, preview and repair site settings",
    long_about = None,
    after_help = "Environment variables:\n  \
         LENDFRONT_PROFILE_PATH   Profile file (default: ./data/profile.json)\n\n\
         Examples:\n  \
         lendfront groups\n  \
         lendfront show hero-text\n  \
         lendfront set loan-cards cards.json\n  \
         lendfront preview payment-card --width 375 --surface dialog",
)]
struct Cli {
    /// Settings profile file.
    #[arg(long, env = "LENDFRONT_PROFILE_PATH", default_value = "./data/profile.json")]
    profile: PathBuf,

    /// Disable colored output.
    #[arg(long, default_value = "false")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every settings group and where its value comes from.
    Groups,
    /// Print a group's current value as JSON.
    Show {
        /// Group name, e.g. `hero-text`.
        group: String,
    },
    /// Print a group's default value as JSON.
    Defaults {
        /// Group name.
        group: String,
    },
    /// Replace a group with a JSON value.
    Set {
        /// Group name.
        group: String,
        /// JSON file to read, or `-` for stdin.
        input: String,
    },
    /// Reset a group to its default.
    Reset {
        /// Group name.
        group: String,
    },
    /// Print the CSS derived from a group's current value.
    Preview {
        /// Group name.
        group: String,
        /// Device class: desktop or mobile.
        #[arg(long, conflicts_with = "width")]
        device: Option<String>,
        /// Viewport width in pixels; below 768 renders mobile.
        #[arg(long)]
        width: Option<u32>,
        /// Surface: page or dialog.
        #[arg(long, default_value = "page")]
        surface: String,
    },
    /// Custom background images of a section.
    Backgrounds {
        #[command(subcommand)]
        action: BackgroundCommands,
    },
    /// Admin-mode flag.
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },
    /// Report stored values that fail to decode.
    Check {
        /// Overwrite corrupt values with their defaults.
        #[arg(long, default_value = "false")]
        repair: bool,
    },
}

#[derive(Subcommand)]
enum BackgroundCommands {
    /// List a section's custom backgrounds.
    List {
        /// hero, loan or service.
        section: String,
    },
    /// Add an image path to a section's custom backgrounds.
    Add {
        section: String,
        path: String,
    },
    /// Remove an image path from a section's custom backgrounds.
    Remove {
        section: String,
        path: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Show whether admin mode is on.
    Status,
    /// Turn admin mode on.
    On,
    /// Turn admin mode off.
    Off,
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    let (bold, cyan, dim, reset) = (paint(BOLD), paint(CYAN), paint(DIM), paint(RESET));
    println!("{bold}{cyan}{icon} {title}{reset}");
    println!("{dim}─────────────────────────────────────────{reset}");
}

fn kv_line(key: &str, value: &str) {
    let (dim, white, reset) = (paint(DIM), paint(WHITE), paint(RESET));
    println!("  {dim}{key:<32}{reset} {white}{value}{reset}");
}

fn success(msg: &str) {
    let (green, bold, reset) = (paint(GREEN), paint(BOLD), paint(RESET));
    println!("{green}{bold}✓{reset} {msg}");
}

fn warning(msg: &str) {
    let (yellow, bold, reset) = (paint(YELLOW), paint(BOLD), paint(RESET));
    println!("{yellow}{bold}⚠{reset} {yellow}{msg}{reset}");
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to format JSON: {e}"),
    }
}

fn origin_label(origin: &Origin) -> String {
    let (green, yellow, red, reset) = (paint(GREEN), paint(YELLOW), paint(RED), paint(RESET));
    match origin {
        Origin::Stored => format!("{green}stored{reset}"),
        Origin::Defaulted(DefaultReason::Absent) => format!("{yellow}default{reset}"),
        Origin::Defaulted(reason) => format!("{red}default ({reason}){reset}"),
    }
}

// ── Profile access ───────────────────────────────────────────────────

struct Profile {
    storage: Arc<dyn StorageBackend>,
    store: SettingsStore,
    report: HydrationReport,
}

impl Profile {
    async fn open(path: &Path) -> Result<Self> {
        let backend = ProfileBackend::open(path)
            .await
            .with_context(|| format!("failed to open profile '{}'", path.display()))?;
        let storage: Arc<dyn StorageBackend> = Arc::new(backend);
        let store = SettingsStore::new(Arc::clone(&storage));
        let report = store.hydrate().await;
        Ok(Self {
            storage,
            store,
            report,
        })
    }
}

fn parse_group(name: &str) -> Result<GroupId> {
    name.parse().map_err(anyhow::Error::msg)
}

fn parse_section(name: &str) -> Result<Section> {
    name.parse().map_err(anyhow::Error::msg)
}

async fn read_input(input: &str) -> Result<Value> {
    let raw = if input == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("failed to read '{input}'"))?
    };
    serde_json::from_str(&raw).context("input is not valid JSON")
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        COLOR.store(false, Ordering::Relaxed);
    }

    match run(&cli.profile, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (red, bold, reset) = (paint(RED), paint(BOLD), paint(RESET));
            eprintln!();
            eprintln!("  {red}{bold}✗ Error:{reset} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(profile_path: &Path, cmd: Commands) -> Result<()> {
    let profile = Profile::open(profile_path).await?;
    match cmd {
        Commands::Groups => {
            cmd_groups(&profile);
            Ok(())
        }
        Commands::Show { group } => {
            let id = parse_group(&group)?;
            print_json(&profile.store.snapshot_json(id)?);
            Ok(())
        }
        Commands::Defaults { group } => {
            let id = parse_group(&group)?;
            print_json(&profile.store.default_json(id)?);
            Ok(())
        }
        Commands::Set { group, input } => cmd_set(&profile, &group, &input).await,
        Commands::Reset { group } => cmd_reset(&profile, &group).await,
        Commands::Preview {
            group,
            device,
            width,
            surface,
        } => cmd_preview(&profile, &group, device.as_deref(), width, &surface),
        Commands::Backgrounds { action } => cmd_backgrounds(&profile, action).await,
        Commands::Admin { action } => cmd_admin(&profile, action).await,
        Commands::Check { repair } => cmd_check(&profile, repair).await,
    }
}

fn cmd_groups(profile: &Profile) {
    header("⚙", "Settings groups");
    for id in GroupId::ALL {
        let label = profile
            .report
            .origin(id.storage_key())
            .map_or_else(|| "unknown".to_owned(), origin_label);
        kv_line(id.name(), &label);
    }
    println!();
    header("🖼", "Custom backgrounds");
    for section in Section::ALL {
        let key = profile.store.custom_backgrounds(section).storage_key();
        let label = profile
            .report
            .origin(key)
            .map_or_else(|| "unknown".to_owned(), origin_label);
        kv_line(section.as_str(), &label);
    }
}

async fn cmd_set(profile: &Profile, group: &str, input: &str) -> Result<()> {
    let id = parse_group(group)?;
    let value = read_input(input).await?;
    profile.store.replace_json(id, value).await?;
    success(&format!("{id} updated"));
    Ok(())
}

async fn cmd_reset(profile: &Profile, group: &str) -> Result<()> {
    let id = parse_group(group)?;
    let default = profile.store.default_json(id)?;
    profile.store.replace_json(id, default).await?;
    success(&format!("{id} reset to default"));
    Ok(())
}

fn cmd_preview(
    profile: &Profile,
    group: &str,
    device: Option<&str>,
    width: Option<u32>,
    surface: &str,
) -> Result<()> {
    let id = parse_group(group)?;
    let device = match (device, width) {
        (Some(device), _) => device.parse().map_err(anyhow::Error::msg)?,
        (None, Some(width)) => DeviceClass::from_viewport_width(width),
        (None, None) => DeviceClass::Desktop,
    };
    let surface: Surface = surface.parse().map_err(anyhow::Error::msg)?;

    let blocks = profile.store.preview(id, device, surface);
    let css: Vec<String> = blocks.iter().map(StyleBlock::to_css).collect();
    println!("{}", css.join("\n"));
    Ok(())
}

async fn cmd_backgrounds(profile: &Profile, action: BackgroundCommands) -> Result<()> {
    let paths = match action {
        BackgroundCommands::List { section } => {
            let section = parse_section(&section)?;
            profile
                .store
                .custom_backgrounds(section)
                .current()
                .context("settings store is not ready")?
        }
        BackgroundCommands::Add { section, path } => {
            let section = parse_section(&section)?;
            let paths = profile.store.add_custom_background(section, &path).await?;
            success(&format!("added {path} to {} backgrounds", section.as_str()));
            paths
        }
        BackgroundCommands::Remove { section, path } => {
            let section = parse_section(&section)?;
            let paths = profile.store.remove_custom_background(section, &path).await?;
            success(&format!("removed {path} from {} backgrounds", section.as_str()));
            paths
        }
    };
    for path in paths {
        println!("{path}");
    }
    Ok(())
}

async fn cmd_admin(profile: &Profile, action: AdminCommands) -> Result<()> {
    let gate = AdminGate::load(Arc::clone(&profile.storage)).await;
    match action {
        AdminCommands::Status => {
            header("🔑", "Admin mode");
            let (green, dim, reset) = (paint(GREEN), paint(DIM), paint(RESET));
            let state = if gate.is_enabled() {
                format!("{green}on{reset}")
            } else {
                format!("{dim}off{reset}")
            };
            kv_line("Admin mode", &state);
        }
        AdminCommands::On => {
            gate.set(true).await?;
            success("admin mode on");
        }
        AdminCommands::Off => {
            gate.set(false).await?;
            success("admin mode off");
        }
    }
    Ok(())
}

async fn cmd_check(profile: &Profile, repair: bool) -> Result<()> {
    let broken: Vec<(&'static str, &Origin)> = profile
        .report
        .entries
        .iter()
        .filter(|(_, origin)| {
            matches!(
                origin,
                Origin::Defaulted(DefaultReason::Corrupt(_) | DefaultReason::Unreadable(_))
            )
        })
        .map(|(key, origin)| (*key, origin))
        .collect();

    if broken.is_empty() {
        success("all stored settings decode");
        return Ok(());
    }

    for (key, origin) in &broken {
        warning(&format!("{key}: {origin}"));
    }
    if !repair {
        bail!("{} stored value(s) fail to decode; rerun with --repair to reset them", broken.len());
    }

    for (key, _) in broken {
        repair_key(profile, key).await?;
        success(&format!("{key} reset to default"));
    }
    Ok(())
}

/// Write the in-memory value of the group stored under `key`. After hydration
/// that is the default the corrupt value fell back to.
async fn repair_key(profile: &Profile, key: &str) -> Result<()> {
    if let Some(id) = GroupId::ALL.into_iter().find(|id| id.storage_key() == key) {
        let default = profile.store.default_json(id)?;
        profile.store.replace_json(id, default).await?;
        return Ok(());
    }
    for section in Section::ALL {
        let cell = profile.store.custom_backgrounds(section);
        if cell.storage_key() == key {
            cell.update(cell.default_value()).await?;
            return Ok(());
        }
    }
    bail!("no settings group is stored under '{key}'")
}
