//! Runtime settings read from the environment.
//!
//! | var | default |
//! |---|---|
//! | `PORT` | 3000, bound on 0.0.0.0 |
//! | `STATIC_DIR` | `./public` when present, else `../public` |
//! | `MEMORY_TOTAL_PAIRS` | 12, clamped to the image catalog |
//! | `MEMORY_FLIP_BACK_MS` | 1500 |

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::game::deck::IMAGE_COUNT;
use crate::room::manager::RoomSettings;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TOTAL_PAIRS: usize = 12;
pub const DEFAULT_FLIP_BACK_MS: u64 = 1500;

const STATIC_DIR_CANDIDATES: [&str; 2] = ["./public", "../public"];

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub static_dir: PathBuf,
    pub rooms: RoomSettings,
}

impl Config {
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok();
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, parse_port(var("PORT").as_deref()))),
            static_dir: var("STATIC_DIR").map(PathBuf::from).unwrap_or_else(|| {
                pick_static_dir(STATIC_DIR_CANDIDATES.iter().map(PathBuf::from), |p| p.exists())
            }),
            rooms: RoomSettings {
                total_pairs: parse_total_pairs(var("MEMORY_TOTAL_PAIRS").as_deref()),
                flip_back_delay: parse_flip_back(var("MEMORY_FLIP_BACK_MS").as_deref()),
            },
        }
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(DEFAULT_PORT)
}

/// First candidate that exists, or the last one when none do.
fn pick_static_dir(
    candidates: impl Iterator<Item = PathBuf>,
    exists: impl Fn(&PathBuf) -> bool,
) -> PathBuf {
    let mut last = PathBuf::new();
    for dir in candidates {
        if exists(&dir) {
            return dir;
        }
        last = dir;
    }
    last
}

/// Pairs per game; garbage falls back to the default, numbers are clamped to
/// what the image catalog can deal.
fn parse_total_pairs(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_TOTAL_PAIRS)
        .clamp(1, IMAGE_COUNT)
}

fn parse_flip_back(raw: Option<&str>) -> Duration {
    let ms = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_FLIP_BACK_MS);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_count_is_clamped_to_catalog() {
        assert_eq!(parse_total_pairs(None), 12);
        assert_eq!(parse_total_pairs(Some("8")), 8);
        assert_eq!(parse_total_pairs(Some("0")), 1);
        assert_eq!(parse_total_pairs(Some("99")), 45);
        assert_eq!(parse_total_pairs(Some("many")), 12);
    }

    #[test]
    fn port_falls_back_to_default() {
        assert_eq!(parse_port(Some("8080")), 8080);
        assert_eq!(parse_port(Some("http")), DEFAULT_PORT);
        assert_eq!(parse_port(None), DEFAULT_PORT);
    }

    #[test]
    fn static_dir_prefers_first_existing_candidate() {
        let candidates = || ["./public", "../public"].iter().map(PathBuf::from);
        assert_eq!(pick_static_dir(candidates(), |p| p.ends_with("public")), PathBuf::from("./public"));
        assert_eq!(pick_static_dir(candidates(), |p| p.starts_with("..")), PathBuf::from("../public"));
        assert_eq!(pick_static_dir(candidates(), |_| false), PathBuf::from("../public"));
    }

    #[test]
    fn flip_back_delay_parses_millis() {
        assert_eq!(parse_flip_back(None), Duration::from_millis(1500));
        assert_eq!(parse_flip_back(Some(" 250 ")), Duration::from_millis(250));
        assert_eq!(parse_flip_back(Some("-1")), Duration::from_millis(1500));
    }
}
