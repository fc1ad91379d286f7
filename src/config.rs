use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::geometry::{PageGeometry, A4_HEIGHT_PT, A4_WIDTH_PT};

/// Service configuration loaded from environment variables (and `.env`).
/// Every setting has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub records_path: PathBuf,
    pub fetch_timeout: Duration,
    pub fetch_concurrency: usize,
    pub max_image_bytes: u64,
    pub export_filename: String,
    pub page_margin: f32,
    pub grid_spacing: f32,
    pub cell_height: f32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let fetch_concurrency: usize = env_or("FETCH_CONCURRENCY", 4)?;
        if fetch_concurrency == 0 {
            bail!("FETCH_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            host: env_or("HOST", "127.0.0.1".to_string())?,
            port: env_or("PORT", 3001)?,
            rust_log: env_or("RUST_LOG", "info".to_string())?,
            records_path: env_or("RECORDS_PATH", PathBuf::from("records.json"))?,
            fetch_timeout: Duration::from_millis(env_or("FETCH_TIMEOUT_MS", 5_000)?),
            fetch_concurrency,
            max_image_bytes: env_or("MAX_IMAGE_BYTES", 10 * 1024 * 1024)?,
            export_filename: sanitize_filename(&env_or("EXPORT_FILENAME", "orders.pdf".to_string())?),
            page_margin: env_or("PAGE_MARGIN_PT", 36.0)?,
            grid_spacing: env_or("GRID_SPACING_PT", 12.0)?,
            cell_height: env_or("GRID_CELL_HEIGHT_PT", 230.0)?,
        })
    }

    /// A4 pages with the configured margin and grid cell size.
    pub fn geometry(&self) -> Result<PageGeometry> {
        PageGeometry::new(
            A4_WIDTH_PT,
            A4_HEIGHT_PT,
            self.page_margin,
            self.grid_spacing,
            self.cell_height,
        )
        .context("Invalid page geometry settings")
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Keep the Content-Disposition header well formed.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    if cleaned.trim().is_empty() {
        "orders.pdf".to_string()
    } else {
        cleaned
    }
}
