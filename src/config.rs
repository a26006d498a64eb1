use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::tuning::SceneTunables;

pub const USAGE: &str = "Usage: shadowbloom [--settings <file.json>] [--assets <dir>] [--size WxH] \
[--no-vsync] [--fullscreen] [--bloom | --no-bloom] [--no-shadows] [--summary-only]";

/// Start-up configuration; every field can come from the JSON settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub fullscreen: bool,
    pub assets_dir: PathBuf,
    /// Model file, relative to `assets_dir`.
    pub model: PathBuf,
    pub shadow_map_size: u32,
    /// Width and height covered by orthographic shadow projections.
    pub scene_extent: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "shadowbloom".into(),
            width: 1600,
            height: 900,
            vsync: true,
            fullscreen: false,
            assets_dir: PathBuf::from("assets"),
            model: PathBuf::from("teapot.obj"),
            shadow_map_size: 1024,
            scene_extent: [100.0, 100.0],
        }
    }
}

impl AppConfig {
    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data).context("invalid settings JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_json_str(&data)
            .with_context(|| format!("failed to load settings from {}", path.display()))
    }

    pub fn model_path(&self) -> PathBuf {
        self.assets_dir.join(&self.model)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("window size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.shadow_map_size == 0 {
            bail!("shadow map size must be non-zero");
        }
        if self.scene_extent.iter().any(|extent| !(*extent > 0.0)) {
            bail!("scene extent must be positive, got {:?}", self.scene_extent);
        }
        Ok(())
    }
}

/// Parsed command line. `None` means "keep what the settings file or defaults say".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub settings: Option<PathBuf>,
    pub assets: Option<PathBuf>,
    pub size: Option<(u32, u32)>,
    pub vsync: Option<bool>,
    pub fullscreen: bool,
    pub bloom: Option<bool>,
    pub shadows: Option<bool>,
    pub summary_only: bool,
    pub help: bool,
}

impl CliOptions {
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--settings" => options.settings = Some(PathBuf::from(value_for(&arg, &mut args)?)),
                "--assets" => options.assets = Some(PathBuf::from(value_for(&arg, &mut args)?)),
                "--size" => options.size = Some(parse_size(&value_for(&arg, &mut args)?)?),
                "--no-vsync" => options.vsync = Some(false),
                "--fullscreen" => options.fullscreen = true,
                "--bloom" => options.bloom = Some(true),
                "--no-bloom" => options.bloom = Some(false),
                "--no-shadows" => options.shadows = Some(false),
                "--summary-only" => options.summary_only = true,
                "-h" | "--help" => options.help = true,
                other => return Err(anyhow!("Unknown argument: {other}\n{USAGE}")),
            }
        }
        Ok(options)
    }

    /// Loads the settings file if one was given and layers the flags on top.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.settings {
            Some(path) => AppConfig::from_json_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(assets) = &self.assets {
            config.assets_dir = assets.clone();
        }
        if let Some((width, height)) = self.size {
            config.width = width;
            config.height = height;
        }
        if let Some(vsync) = self.vsync {
            config.vsync = vsync;
        }
        if self.fullscreen {
            config.fullscreen = true;
        }
        Ok(config)
    }

    pub fn apply_tunables(&self, tunables: &mut SceneTunables) {
        if let Some(bloom) = self.bloom {
            tunables.set_bloom_enabled(bloom);
        }
        if let Some(shadows) = self.shadows {
            tunables.set_shadows_enabled(shadows);
        }
    }
}

fn value_for(flag: &str, args: &mut impl Iterator<Item = String>) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value\n{USAGE}"))
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("size must look like 1600x900, got {value:?}"))?;
    let width: u32 = width
        .trim()
        .parse()
        .with_context(|| format!("invalid width in {value:?}"))?;
    let height: u32 = height
        .trim()
        .parse()
        .with_context(|| format!("invalid height in {value:?}"))?;
    if width == 0 || height == 0 {
        bail!("size must be non-zero, got {value:?}");
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_flags() {
        let options = CliOptions::parse(args(&[
            "--size",
            "800x600",
            "--no-vsync",
            "--bloom",
            "--no-shadows",
            "--summary-only",
        ]))
        .unwrap();
        assert_eq!(options.size, Some((800, 600)));
        assert_eq!(options.vsync, Some(false));
        assert_eq!(options.bloom, Some(true));
        assert_eq!(options.shadows, Some(false));
        assert!(options.summary_only);

        let config = options.resolve().unwrap();
        assert_eq!((config.width, config.height), (800, 600));
        assert!(!config.vsync);
        assert_eq!(config.shadow_map_size, 1024);
    }

    #[test]
    fn rejects_unknown_and_malformed_arguments() {
        assert!(CliOptions::parse(args(&["--wat"])).is_err());
        assert!(CliOptions::parse(args(&["--size", "800"])).is_err());
        assert!(CliOptions::parse(args(&["--size", "0x600"])).is_err());
        assert!(CliOptions::parse(args(&["--settings"])).is_err());
    }

    #[test]
    fn settings_file_is_layered_under_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "width": 1024, "height": 768, "shadow_map_size": 2048, "assets_dir": "media" }}"#
        )
        .unwrap();
        let options = CliOptions {
            settings: Some(file.path().to_path_buf()),
            size: Some((640, 480)),
            ..CliOptions::default()
        };
        let config = options.resolve().unwrap();
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.shadow_map_size, 2048);
        assert_eq!(config.model_path(), PathBuf::from("media").join("teapot.obj"));
        assert_eq!(config.title, "shadowbloom");
    }

    #[test]
    fn invalid_settings_are_reported() {
        assert!(AppConfig::from_json_str(r#"{ "shadow_map_size": 0 }"#).is_err());
        assert!(AppConfig::from_json_str(r#"{ "scene_extent": [100.0, -1.0] }"#).is_err());
        assert!(AppConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn flags_override_tunables() {
        let options = CliOptions::parse(args(&["--bloom", "--no-shadows"])).unwrap();
        let mut tunables = SceneTunables::default();
        options.apply_tunables(&mut tunables);
        assert!(tunables.bloom_enabled());
        assert!(!tunables.shadows_enabled());
    }
}
