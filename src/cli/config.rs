//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "search.debounce_ms")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        (None, None) => {
            print!("{}", render_all(&config));
        }

        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("Available keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        },

        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Config(
                "Must specify a key to set a value".to_string(),
            ));
        }
    }

    Ok(())
}

/// Render every key grouped by section
fn render_all(config: &Config) -> String {
    let mut out = String::new();
    let mut current = "";

    for key in Config::available_keys() {
        let (section, name) = key.split_once('.').unwrap_or(("", key));
        if section != current {
            if !current.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section));
            current = section;
        }
        let value = config.get(key).unwrap_or_default();
        out.push_str(&format!("{} = {}\n", name, value));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_all_groups_sections() {
        let rendered = render_all(&Config::default());

        assert!(rendered.starts_with("[gateway]\n"));
        assert!(rendered.contains("\n[search]\ndebounce_ms = 300\n"));
        assert!(rendered.contains("position_source = simulated\n"));
        assert_eq!(rendered.matches('[').count(), 4);
    }
}
