//! UFMS PREREQUISITE HARVESTER
//! Walks the whole 4-digit code space and keeps every non-empty JSON answer.

mod code;
pub mod config;
mod error;
mod fetch;
mod macros;
pub mod process;

pub use code::Code;
pub use error::{Error, Result};
pub use fetch::{FetchResult, Fetcher};

/// Number of codes in the namespace: 0000 through 9999.
const CODE_SPACE: u16 = 10_000;
/// An absent code prints a progress line only when its numeric value is a
/// multiple of this, to bound log volume.
const PROGRESS_EVERY: u16 = 100;

const DEFAULT_BASE_URL: &str = "https://graduacao.ufms.br/portal/matriz/get-pre-requisitos";
const DEFAULT_REFERER_BASE: &str = "https://graduacao.ufms.br/cursos";
const DEFAULT_OUTPUT_DIR: &str = "json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const CONFIG_FILE: &str = "Harvest.toml";
