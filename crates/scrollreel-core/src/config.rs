use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::color::Color;
use crate::error::{ReelError, ReelResult};
use crate::presets;

/// Frames in the published hero sequence.
pub const DEFAULT_FRAME_COUNT: usize = 192;
/// Readiness threshold as a fraction of the sequence: 20 of 192 frames.
pub const DEFAULT_LOAD_THRESHOLD: f64 = 20.0 / 192.0;
/// Frame names carry a three-digit index, so a sequence holds at most 1000.
pub const MAX_FRAME_COUNT: usize = 1000;
/// Longest the loading overlay may stay up before playback is forced.
pub const DEFAULT_SAFETY_TIMEOUT_MS: u64 = 2000;

/// Every frame file is `frame_XXX_delay-0.04s.png` under the sequence base URL.
pub const FRAME_PREFIX: &str = "frame_";
pub const FRAME_SUFFIX: &str = "_delay-0.04s.png";

/// Site-wide settings edited from the configuration panel.
///
/// Serialized in camelCase so the same value round-trips through the
/// browser-side panel as JSON.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    pub community_name: String,
    pub tagline: String,
    pub intro_text: String,
    /// CSS hex color, e.g. `#F97316`.
    pub accent_color: String,
    pub is_dark_mode: bool,
    /// Base URL of the frame store, always ending in `/`.
    pub sequence_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            community_name: "Andynocode Community".to_string(),
            tagline: "Shaping the Future of AI-Powered Creation".to_string(),
            intro_text: "A hub where beginners, hobbyists, and professionals learn how to use AI \
                         tools to create stunning animated web experiences, internal tools, and \
                         full web apps."
                .to_string(),
            accent_color: presets::THEME_COLORS[0].value.to_string(),
            is_dark_mode: true,
            sequence_url: presets::SEQUENCE_PRESETS[0].url.to_string(),
        }
    }
}

impl SiteConfig {
    /// Parse a JSON payload from the panel, then validate it.
    pub fn from_json(json: &str) -> ReelResult<Self> {
        let config: SiteConfig = serde_json::from_str(json)?;
        config.normalized()
    }

    pub fn to_json(&self) -> ReelResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The accent color as a parsed [`Color`].
    pub fn accent(&self) -> ReelResult<Color> {
        Ok(Color::from_hex(&self.accent_color)?)
    }

    /// Apply a single panel edit, producing a new validated value.
    pub fn updated(&self, update: SiteUpdate) -> ReelResult<Self> {
        let mut next = self.clone();
        match update {
            SiteUpdate::CommunityName(v) => next.community_name = v,
            SiteUpdate::Tagline(v) => next.tagline = v,
            SiteUpdate::IntroText(v) => next.intro_text = v,
            SiteUpdate::AccentColor(v) => next.accent_color = v,
            SiteUpdate::DarkMode(v) => next.is_dark_mode = v,
            SiteUpdate::SequenceUrl(v) => next.sequence_url = v,
        }
        next.normalized()
    }

    /// Validate the constrained fields and normalize the sequence URL.
    pub fn normalized(mut self) -> ReelResult<Self> {
        self.accent()?;
        self.sequence_url = normalize_sequence_url(&self.sequence_url)?;
        Ok(self)
    }
}

/// One edit from the configuration panel.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteUpdate {
    CommunityName(String),
    Tagline(String),
    IntroText(String),
    AccentColor(String),
    DarkMode(bool),
    SequenceUrl(String),
}

impl SiteUpdate {
    /// Build an update from a field key (kebab-case or camelCase) and a raw value.
    pub fn parse(key: &str, value: &str) -> ReelResult<Self> {
        let update = match key {
            "community-name" | "communityName" => SiteUpdate::CommunityName(value.to_string()),
            "tagline" => SiteUpdate::Tagline(value.to_string()),
            "intro-text" | "introText" => SiteUpdate::IntroText(value.to_string()),
            "accent-color" | "accentColor" => SiteUpdate::AccentColor(value.to_string()),
            "dark-mode" | "isDarkMode" => SiteUpdate::DarkMode(parse_flag(value)?),
            "sequence-url" | "sequenceUrl" => SiteUpdate::SequenceUrl(value.to_string()),
            other => {
                return Err(ReelError::InvalidArgument(format!(
                    "unknown site setting '{}'",
                    other
                )))
            }
        };
        Ok(update)
    }
}

fn parse_flag(value: &str) -> ReelResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "dark" | "1" => Ok(true),
        "false" | "off" | "no" | "light" | "0" => Ok(false),
        other => Err(ReelError::InvalidArgument(format!(
            "expected a boolean, got '{}'",
            other
        ))),
    }
}

/// Check that a sequence base URL is a plain http(s) location and make sure
/// its path ends with `/` so frame names can be appended directly.
///
/// Queries and fragments are rejected: frame names would land after them.
pub fn normalize_sequence_url(raw: &str) -> ReelResult<String> {
    let raw = raw.trim();
    let invalid = |why: &str| ReelError::config(format!("invalid sequence URL '{}': {}", raw, why));

    let mut url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    // The parser folds `https:///x` into host `x`; treat it as hostless.
    let authority_empty = raw
        .split_once("://")
        .is_some_and(|(_, rest)| rest.starts_with('/'));
    if authority_empty || url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query strings and fragments are not supported"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.into())
}

/// Loader tuning that is not exposed in the panel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SequenceTuning {
    pub frame_count: usize,
    /// Fraction of frames, in (0, 1], that must load before playback starts.
    pub load_threshold: f64,
    pub safety_timeout_ms: u64,
}

impl Default for SequenceTuning {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            load_threshold: DEFAULT_LOAD_THRESHOLD,
            safety_timeout_ms: DEFAULT_SAFETY_TIMEOUT_MS,
        }
    }
}

/// Immutable per-session input to the frame loader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceConfig {
    pub base_url: String,
    pub frame_count: usize,
    pub load_threshold: f64,
    pub safety_timeout_ms: u64,
}

impl SequenceConfig {
    /// Combine a base URL with loader tuning, validating both.
    pub fn new(base_url: &str, tuning: &SequenceTuning) -> ReelResult<Self> {
        let config = Self {
            base_url: normalize_sequence_url(base_url)?,
            frame_count: tuning.frame_count,
            load_threshold: tuning.load_threshold,
            safety_timeout_ms: tuning.safety_timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.frame_count == 0 {
            return Err(ReelError::config("frame_count must be at least 1"));
        }
        if self.frame_count > MAX_FRAME_COUNT {
            return Err(ReelError::config(format!(
                "frame_count must be at most {}, got {}",
                MAX_FRAME_COUNT, self.frame_count
            )));
        }
        if !(self.load_threshold > 0.0 && self.load_threshold <= 1.0) {
            return Err(ReelError::config(format!(
                "load_threshold must be in (0, 1], got {}",
                self.load_threshold
            )));
        }
        Ok(())
    }

    /// Loaded frames needed before playback: `ceil(frame_count * load_threshold)`.
    ///
    /// A small tolerance absorbs float error so that a threshold written as
    /// `n / frame_count` requires exactly `n` frames.
    pub fn required_loads(&self) -> usize {
        let raw = self.frame_count as f64 * self.load_threshold;
        let required = (raw - 1e-9).ceil().max(1.0) as usize;
        required.min(self.frame_count)
    }

    pub fn safety_timeout(&self) -> Duration {
        Duration::from_millis(self.safety_timeout_ms)
    }

    /// Remote URL of frame `index`.
    pub fn frame_url(&self, index: usize) -> String {
        format!("{}{}{:03}{}", self.base_url, FRAME_PREFIX, index, FRAME_SUFFIX)
    }
}

/// On-disk configuration: the site panel values plus loader tuning.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct ReelConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub sequence: SequenceTuning,
}

impl ReelConfig {
    pub fn load_from_file(path: &std::path::Path) -> ReelResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ReelConfig = toml::from_str(&contents)?;
        config.validated()
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> ReelResult<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validated(self) -> ReelResult<Self> {
        let site = self.site.normalized()?;
        let config = Self {
            site,
            sequence: self.sequence,
        };
        config.sequence_config()?;
        Ok(config)
    }

    /// The loader input for the currently configured sequence.
    pub fn sequence_config(&self) -> ReelResult<SequenceConfig> {
        SequenceConfig::new(&self.site.sequence_url, &self.sequence)
    }
}
