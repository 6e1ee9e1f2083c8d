mod host;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scrollreel_core::{presets, ReelConfig, SiteUpdate};
use scrollreel_player::{
    DrawOutcome, FrameState, ReadyCause, ScrollGeometry, ScrollPlayer, SoftwareSurface,
    ViewportSize,
};

use host::{LoadReport, TokioHost};

#[derive(Parser)]
#[command(
    name = "scrollreel",
    version,
    about = "scrollreel — scroll-driven image-sequence hero",
    long_about = "Manage the hero's site configuration, check that a frame store is reachable,\nand render the frame a given scroll position would show."
)]
struct Cli {
    /// Path to the site configuration
    #[arg(long = "config", global = true, default_value = "scrollreel.toml")]
    config_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit the site configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Print every frame URL of the configured sequence
    Frames,

    /// Load the configured sequence and report how readiness was reached
    Probe {
        /// Maximum simultaneous downloads
        #[arg(long, default_value_t = 16)]
        concurrency: usize,

        /// Keep going after readiness until every frame has loaded or failed
        #[arg(long)]
        wait_all: bool,
    },

    /// Render the frame shown at a scroll position to a PNG
    Preview {
        /// Progress through the hero, 0.0 to 1.0
        #[arg(long, conflicts_with = "scroll_y", required_unless_present = "scroll_y")]
        progress: Option<f64>,

        /// Page scroll offset in pixels, with the hero at the top of the page
        #[arg(long)]
        scroll_y: Option<f64>,

        #[arg(long, default_value_t = 1280)]
        width: u32,

        #[arg(long, default_value_t = 720)]
        height: u32,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum simultaneous downloads
        #[arg(long, default_value_t = 16)]
        concurrency: usize,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the current configuration
    Show,
    /// Change one setting, e.g. `accent-color Blue` or `dark-mode off`
    Set { key: String, value: String },
    /// List the sequence presets and theme colors
    Presets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigCommands::Init { force } => cmd_config_init(&cli.config_path, force),
            ConfigCommands::Show => cmd_config_show(&cli.config_path),
            ConfigCommands::Set { key, value } => cmd_config_set(&cli.config_path, &key, &value),
            ConfigCommands::Presets => cmd_config_presets(),
        },
        Commands::Frames => cmd_frames(&cli.config_path),
        Commands::Probe {
            concurrency,
            wait_all,
        } => cmd_probe(&cli.config_path, concurrency, wait_all),
        Commands::Preview {
            progress,
            scroll_y,
            width,
            height,
            output,
            concurrency,
        } => {
            let geometry = preview_geometry(height, progress, scroll_y)?;
            cmd_preview(&cli.config_path, geometry, width, height, &output, concurrency)
        }
    }
}

/// Read the config file, falling back to defaults when it does not exist yet.
fn load_config(path: &Path) -> Result<ReelConfig> {
    if !path.exists() {
        tracing::info!("{} not found, using defaults", path.display());
        return Ok(ReelConfig::default());
    }
    ReelConfig::load_from_file(path)
        .with_context(|| format!("failed to load config: {}", path.display()))
}

fn cmd_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ReelConfig::default()
        .save_to_file(path)
        .with_context(|| format!("failed to write config: {}", path.display()))?;
    println!("✓ Wrote {}", path.display());
    Ok(())
}

fn cmd_config_show(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let text = toml::to_string_pretty(&config).context("failed to serialize config")?;
    print!("{}", text);
    Ok(())
}

fn cmd_config_set(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = load_config(path)?;
    let update = resolve_update(key, value)?;
    config.site = config.site.updated(update)?;
    config
        .save_to_file(path)
        .with_context(|| format!("failed to write config: {}", path.display()))?;
    println!("✓ Updated {} in {}", key, path.display());
    Ok(())
}

/// Parse a panel edit, letting accent colors and sequences be named by preset.
fn resolve_update(key: &str, value: &str) -> Result<SiteUpdate> {
    let update = match SiteUpdate::parse(key, value)? {
        SiteUpdate::AccentColor(v) => match presets::theme_color(&v) {
            Some(color) => SiteUpdate::AccentColor(color.value.to_string()),
            None => SiteUpdate::AccentColor(v),
        },
        SiteUpdate::SequenceUrl(v) => match presets::SEQUENCE_PRESETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(&v))
        {
            Some(preset) => SiteUpdate::SequenceUrl(preset.url.to_string()),
            None => SiteUpdate::SequenceUrl(v),
        },
        other => other,
    };
    Ok(update)
}

fn cmd_config_presets() -> Result<()> {
    println!("Sequences:");
    for preset in presets::SEQUENCE_PRESETS {
        println!("   {:<24} {}", preset.name, preset.url);
    }
    println!("Theme colors:");
    for color in presets::THEME_COLORS {
        println!("   {:<24} {}", color.name, color.value);
    }
    Ok(())
}

fn cmd_frames(path: &Path) -> Result<()> {
    let sequence = load_config(path)?.sequence_config()?;
    for index in 0..sequence.frame_count {
        println!("{}", sequence.frame_url(index));
    }
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

fn cmd_probe(path: &Path, concurrency: usize, wait_all: bool) -> Result<()> {
    let sequence = load_config(path)?.sequence_config()?;
    println!(
        "Probing {} frames from {} (ready at {})",
        sequence.frame_count,
        sequence.base_url,
        sequence.required_loads()
    );

    let mut player = ScrollPlayer::mount(SoftwareSurface::new(0, 0), ViewportSize::default());
    let report = runtime()?.block_on(async {
        let (mut host, mut events) = TokioHost::new(concurrency, host::FETCH_TIMEOUT)?;
        player.load(sequence, &mut host)?;
        let report = host::drive(&mut player, &mut host, &mut events, |p| {
            p.is_ready() && (!wait_all || p.frames().map(|f| f.is_settled()).unwrap_or(true))
        })
        .await;
        Ok::<_, anyhow::Error>(report)
    })?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &LoadReport) {
    match (report.cause, report.ready_after) {
        (Some(ReadyCause::Threshold), Some(after)) => {
            println!("✓ Ready after {:.2?} (threshold reached)", after)
        }
        (Some(ReadyCause::SafetyTimeout), Some(after)) => {
            println!("⚠️  Ready after {:.2?} (safety timeout)", after)
        }
        _ => println!("✗ Never became ready"),
    }
    println!(
        "   Loaded: {}  Failed: {}  Pending: {}  ({:.2?})",
        report.loaded, report.failed, report.pending, report.elapsed
    );
}

/// Scroll geometry for a hero at the top of a page of the given viewport height.
fn preview_geometry(
    viewport_height: u32,
    progress: Option<f64>,
    scroll_y: Option<f64>,
) -> Result<ScrollGeometry> {
    let height = viewport_height as f64;
    match (progress, scroll_y) {
        (Some(progress), _) => {
            if !(0.0..=1.0).contains(&progress) {
                bail!("--progress must be between 0 and 1, got {}", progress);
            }
            Ok(ScrollGeometry::hero(height, progress))
        }
        (None, Some(scroll_y)) => Ok(ScrollGeometry {
            scroll_y,
            ..ScrollGeometry::hero(height, 0.0)
        }),
        (None, None) => bail!("either --progress or --scroll-y is required"),
    }
}

fn cmd_preview(
    path: &Path,
    geometry: ScrollGeometry,
    width: u32,
    height: u32,
    output: &Path,
    concurrency: usize,
) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("preview size must be non-zero, got {}x{}", width, height);
    }
    let sequence = load_config(path)?.sequence_config()?;
    let target = geometry.frame_index(sequence.frame_count);
    println!(
        "Rendering frame {:03} (progress {:.3}) at {}x{}",
        target,
        geometry.progress(),
        width,
        height
    );

    let mut player =
        ScrollPlayer::mount(SoftwareSurface::new(0, 0), ViewportSize::new(width, height));
    let report = runtime()?.block_on(async {
        let (mut host, mut events) = TokioHost::new(concurrency, host::FETCH_TIMEOUT)?;
        player.load(sequence, &mut host)?;
        // Past readiness, only the frame we are about to draw matters.
        let report = host::drive(&mut player, &mut host, &mut events, |p| {
            p.is_ready()
                && !matches!(
                    p.frames().and_then(|f| f.state(target)),
                    Some(FrameState::Pending)
                )
        })
        .await;
        Ok::<_, anyhow::Error>(report)
    })?;
    print_report(&report);

    match player.on_scroll(geometry) {
        Some(DrawOutcome::Drawn { index, .. }) => println!("✓ Drew frame {:03}", index),
        Some(DrawOutcome::Skipped { index, reason }) => {
            tracing::warn!("frame {:03} not drawn: {:?}", index, reason)
        }
        None => tracing::warn!("player never became ready; writing an empty frame"),
    }

    player
        .surface()
        .save_png(output)
        .with_context(|| format!("failed to write preview: {}", output.display()))?;
    println!("   Preview written to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_update_by_preset_name() {
        assert_eq!(
            resolve_update("accent-color", "purple").unwrap(),
            SiteUpdate::AccentColor("#A855F7".into())
        );
        assert_eq!(
            resolve_update("accent-color", "#123456").unwrap(),
            SiteUpdate::AccentColor("#123456".into())
        );
        assert_eq!(
            resolve_update("sequence-url", "blue data flow").unwrap(),
            SiteUpdate::SequenceUrl(presets::SEQUENCE_PRESETS[1].url.into())
        );
        assert!(resolve_update("font", "serif").is_err());
    }

    #[test]
    fn test_preview_geometry() {
        let g = preview_geometry(720, Some(1.0), None).unwrap();
        assert_eq!(g.frame_index(192), 191);

        let g = preview_geometry(720, None, Some(1080.0)).unwrap();
        assert_eq!(g.progress(), 0.5);

        assert!(preview_geometry(720, Some(1.5), None).is_err());
        assert!(preview_geometry(720, None, None).is_err());
    }

    #[test]
    fn test_cli_parses_preview() {
        let cli = Cli::try_parse_from([
            "scrollreel",
            "preview",
            "--progress",
            "0.25",
            "-o",
            "out.png",
        ])
        .unwrap();
        assert_eq!(cli.config_path, PathBuf::from("scrollreel.toml"));
        match cli.command {
            Commands::Preview {
                progress, width, ..
            } => {
                assert_eq!(progress, Some(0.25));
                assert_eq!(width, 1280);
            }
            _ => panic!("expected preview"),
        }

        assert!(Cli::try_parse_from(["scrollreel", "preview", "-o", "x.png"]).is_err());
    }

    #[test]
    fn test_config_set_round_trip() {
        let path = std::env::temp_dir().join(format!("scrollreel-cli-{}.toml", std::process::id()));
        cmd_config_init(&path, true).unwrap();
        assert!(cmd_config_init(&path, false).is_err());
        cmd_config_set(&path, "dark-mode", "off").unwrap();
        cmd_config_set(&path, "accent-color", "Cyan").unwrap();

        let config = ReelConfig::load_from_file(&path).unwrap();
        assert!(!config.site.is_dark_mode);
        assert_eq!(config.site.accent_color, "#06B6D4");
        std::fs::remove_file(&path).unwrap();
    }
}
