use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::console::console_warn;

/// Drag the key to the lock.
#[derive(Parser, Debug, Default)]
#[clap(name = "keepsake", version)]
pub struct Args {
    /// YAML file replacing the built-in settings
    #[clap(long, env = "KEEPSAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding `audio/` and `images/`
    #[clap(long, env = "KEEPSAKE_ASSETS")]
    pub assets: Option<String>,

    /// Never play sound
    #[clap(long)]
    pub muted: bool,
}

impl Args {
    /// Loads `--config` if given, falling back to the built-in settings when
    /// it cannot be used, then applies the remaining flags.
    pub fn resolve(&self) -> Config {
        let config = match &self.config {
            Some(path) => Config::load(path).unwrap_or_else(|err| {
                console_warn!("{}; using built-in settings", err);
                Config::embedded()
            }),
            None => Config::embedded(),
        };
        self.apply(config)
    }

    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(root) = &self.assets {
            config.assets.root = root.clone();
        }
        config.audio.muted |= self.muted;
        config
    }

    /// Browser builds read `?muted` and `?assets=<url>` from the page address.
    #[cfg(target_family = "wasm")]
    pub fn from_location() -> Args {
        let search = web_sys::window()
            .and_then(|window| window.location().search().ok())
            .unwrap_or_default();
        match web_sys::UrlSearchParams::new_with_str(&search) {
            Ok(params) => Args {
                config: None,
                assets: params.get("assets"),
                muted: params
                    .get("muted")
                    .map_or(false, |v| v.is_empty() || v == "1" || v == "true"),
            },
            Err(err) => {
                console_warn!("ignoring unreadable query string: {:?}", err);
                Args::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from(["keepsake", "--muted", "--assets", "/srv/greeting"]).unwrap();
        let config = args.apply(Config::default());
        assert!(config.audio.muted);
        assert_eq!(config.assets.root, "/srv/greeting");
        assert_eq!(config.lock, Config::default().lock);
    }

    #[test]
    fn no_flags_keep_defaults() {
        let args = Args::try_parse_from(["keepsake"]).unwrap();
        assert_eq!(args.apply(Config::default()), Config::default());
    }

    #[test]
    fn unreadable_config_falls_back_to_builtin() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/keepsake.yaml")),
            ..Args::default()
        };
        assert_eq!(args.resolve(), Config::embedded());
    }
}
