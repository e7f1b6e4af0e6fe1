use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const API_BASE: &str = "https://amp-api.music.apple.com/v1/catalog";
pub const ORIGIN: &str = "https://music.apple.com";
const TOKEN_PAGE_PATH: &str = "/us/album/positions-deluxe/1553944254";
/// Every token served by the web player is a JWT, so it starts with the
/// base64 of `{"alg`.
pub const TOKEN_PREFIX: &str = "eyJhbGc";
const PROBE_COUNTRY: &str = "in";
const PROBE_ALBUM_ID: &str = "1551901062";

const TOKEN_FILE_NAME: &str = "token.txt";
const OUTPUT_DIR_NAME: &str = "animated";
pub const VIDEO_FILE_NAME: &str = "video.mp4";
pub const LOOP_FILE_NAME: &str = "loop.mp4";
pub const VIDEO_EXTENSION: &str = "mp4";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub origin: String,
    pub token_page: String,
    pub token_prefix: String,
    pub probe_country: String,
    pub probe_album_id: String,
    pub token_file: PathBuf,
    pub output_dir: PathBuf,
    pub work_dir: PathBuf,
    pub ffmpeg: PathBuf,
}

impl Config {
    /// Defaults rooted at `cwd`.
    pub fn new(cwd: &Path) -> Self {
        Self {
            api_base: API_BASE.to_string(),
            origin: ORIGIN.to_string(),
            token_page: format!("{ORIGIN}{TOKEN_PAGE_PATH}"),
            token_prefix: TOKEN_PREFIX.to_string(),
            probe_country: PROBE_COUNTRY.to_string(),
            probe_album_id: PROBE_ALBUM_ID.to_string(),
            token_file: cwd.join(TOKEN_FILE_NAME),
            output_dir: cwd.join(OUTPUT_DIR_NAME),
            work_dir: cwd.to_path_buf(),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }

    /// Loads `.env` if present and applies `MOTIONART_*` overrides.
    pub fn from_env() -> Result<Self> {
        check_env_file(dotenvy::dotenv())?;
        let cwd = std::env::current_dir()?;
        Self::from_lookup(&cwd, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(cwd: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new(cwd);
        let path_var = |key: &str| -> Result<Option<PathBuf>> {
            match lookup(key) {
                None => Ok(None),
                Some(value) if value.trim().is_empty() => {
                    Err(Error::Config(format!("{key} is set but empty")))
                }
                Some(value) => Ok(Some(cwd.join(value.trim()))),
            }
        };

        if let Some(work_dir) = path_var("MOTIONART_WORK_DIR")? {
            config.work_dir = work_dir;
        }
        if let Some(output_dir) = path_var("MOTIONART_OUTPUT_DIR")? {
            config.output_dir = output_dir;
        }
        if let Some(token_file) = path_var("MOTIONART_TOKEN_FILE")? {
            config.token_file = token_file;
        }
        // a bare program name is looked up on PATH, not in cwd
        if let Some(ffmpeg) = lookup("MOTIONART_FFMPEG") {
            let ffmpeg = ffmpeg.trim();
            if ffmpeg.is_empty() {
                return Err(Error::Config("MOTIONART_FFMPEG is set but empty".into()));
            }
            config.ffmpeg = if ffmpeg.contains(std::path::MAIN_SEPARATOR) || ffmpeg.contains('/') {
                cwd.join(ffmpeg)
            } else {
                PathBuf::from(ffmpeg)
            };
        }

        Ok(config)
    }

    pub fn transient_video_path(&self) -> PathBuf {
        self.work_dir.join(VIDEO_FILE_NAME)
    }

    pub fn transient_loop_path(&self) -> PathBuf {
        self.work_dir.join(LOOP_FILE_NAME)
    }
}

/// A missing `.env` is fine, everything has a default; a broken one is not.
fn check_env_file<T>(result: dotenvy::Result<T>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!(".env: {e}"))),
    }
}
