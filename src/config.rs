//! Runtime configuration read from the environment.
//!
//! | variable | meaning |
//! |---|---|
//! | `ZKSCAN_ZKFP_LIBRARY` | path or name of the USB scanner SDK (`libzkfp`) |
//! | `ZKSCAN_ZKEM_LIBRARY` | path or name of the terminal SDK (`zkemsdk`) |
//! | `ZKSCAN_DEFAULT_TIMEOUT` | attempt budget when none is given on the command line |
//! | `ZKSCAN_DEVICE_INDEX` | index of the scanner to open |

use crate::codes;
use crate::types::AttemptBudget;

pub const ENV_ZKFP_LIBRARY: &str = "ZKSCAN_ZKFP_LIBRARY";
pub const ENV_ZKEM_LIBRARY: &str = "ZKSCAN_ZKEM_LIBRARY";
pub const ENV_DEFAULT_TIMEOUT: &str = "ZKSCAN_DEFAULT_TIMEOUT";
pub const ENV_DEVICE_INDEX: &str = "ZKSCAN_DEVICE_INDEX";

#[cfg(windows)]
const ZKFP_CANDIDATES: &[&str] = &["libzkfp.dll"];
#[cfg(not(windows))]
const ZKFP_CANDIDATES: &[&str] = &["libzkfp.so", "/usr/lib/libzkfp.so", "/usr/local/lib/libzkfp.so"];

#[cfg(windows)]
const ZKEM_CANDIDATES: &[&str] = &["zkemsdk.dll"];
#[cfg(not(windows))]
const ZKEM_CANDIDATES: &[&str] = &["libzkemsdk.so", "/usr/local/lib/libzkemsdk.so"];

/// Resolved settings for one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Library names tried in order when loading `libzkfp`.
    pub zkfp_library: Vec<String>,
    /// Library names tried in order when loading `zkemsdk`.
    pub zkem_library: Vec<String>,
    pub default_budget: AttemptBudget,
    pub device_index: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zkfp_library: ZKFP_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            zkem_library: ZKEM_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            default_budget: AttemptBudget::default(),
            device_index: 0,
        }
    }
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = read_string(&lookup, ENV_ZKFP_LIBRARY) {
            config.zkfp_library.insert(0, path);
        }
        if let Some(path) = read_string(&lookup, ENV_ZKEM_LIBRARY) {
            config.zkem_library.insert(0, path);
        }

        if let Some(raw) = read_string(&lookup, ENV_DEFAULT_TIMEOUT) {
            match parse_budget(&raw) {
                Some(budget) => config.default_budget = budget,
                None => log::warn!(
                    "Ignoring {}='{}', using {}",
                    ENV_DEFAULT_TIMEOUT,
                    raw,
                    config.default_budget.get()
                ),
            }
        }

        if let Some(raw) = read_string(&lookup, ENV_DEVICE_INDEX) {
            match raw.parse::<i32>() {
                Ok(index) if index >= 0 => config.device_index = index,
                _ => log::warn!("Ignoring {}='{}', using 0", ENV_DEVICE_INDEX, raw),
            }
        }

        config
    }
}

/// An attempt budget when `raw` is an integer within the accepted range.
fn parse_budget(raw: &str) -> Option<AttemptBudget> {
    let value = raw.trim().parse::<u32>().ok()?;
    (codes::MIN_TIMEOUT_SECONDS..=codes::MAX_TIMEOUT_SECONDS)
        .contains(&value)
        .then(|| AttemptBudget::new(value))
}

fn read_string<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
