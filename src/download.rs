use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::VIDEO_EXTENSION;
use crate::error::{Error, Result};
use crate::resource::{ResourceAttributes, ResourceKind};

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` to completion and returns its stdout.
    async fn run(&self, program: &Path, args: &[OsString]) -> Result<String>;
}

pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &Path, args: &[OsString]) -> Result<String> {
        debug!(program = %program.display(), ?args, "spawning");
        let output = Command::new(program).args(args).output().await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        // -loglevel quiet leaves stderr empty unless something went wrong
        if !output.status.success() || !stderr.trim().is_empty() {
            let tool_output = if stderr.trim().is_empty() {
                format!("{} exited with {}", program.display(), output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(Error::Extraction { tool_output });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn year_of(date: &Option<String>, field: &str) -> Result<String> {
    date.as_deref()
        .map(|d| d.chars().take(4).collect::<String>())
        .filter(|y| !y.is_empty())
        .ok_or_else(|| Error::Parse(format!("resource has no {field}")))
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::Parse(format!("resource has no {field}")))
}

/// File name for the finished video, e.g. `Ariana Grande - Positions (2020).mp4`.
pub fn output_file_name(kind: ResourceKind, attributes: &ResourceAttributes) -> Result<String> {
    let name = required(&attributes.name, "name")?;
    let stem = match kind {
        ResourceKind::Album => format!(
            "{} - {} ({})",
            required(&attributes.artist_name, "artistName")?,
            name,
            year_of(&attributes.release_date, "releaseDate")?
        ),
        ResourceKind::Artist => name.to_string(),
        ResourceKind::Playlist => format!(
            "{} ({})",
            name,
            year_of(&attributes.last_modified_date, "lastModifiedDate")?
        ),
    };
    Ok(format!("{}.{}", sanitize_filename::sanitize(stem), VIDEO_EXTENSION))
}

pub struct VideoAssembler<'a> {
    runner: &'a dyn ProcessRunner,
    ffmpeg: PathBuf,
    video_path: PathBuf,
    loop_path: PathBuf,
}

impl<'a> VideoAssembler<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        ffmpeg: impl Into<PathBuf>,
        video_path: impl Into<PathBuf>,
        loop_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            ffmpeg: ffmpeg.into(),
            video_path: video_path.into(),
            loop_path: loop_path.into(),
        }
    }

    /// Copies the stream at `source_uri` into `output` without re-encoding.
    pub async fn extract(&self, source_uri: &str, output: &Path) -> Result<()> {
        let args: Vec<OsString> = vec![
            "-loglevel".into(),
            "quiet".into(),
            "-y".into(),
            "-i".into(),
            source_uri.into(),
            "-c".into(),
            "copy".into(),
            output.into(),
        ];
        self.runner.run(&self.ffmpeg, &args).await?;
        Ok(())
    }

    pub async fn apply_loops(&self, input: &Path, loops: u32, output: &Path) -> Result<()> {
        let args: Vec<OsString> = vec![
            "-loglevel".into(),
            "quiet".into(),
            "-y".into(),
            "-stream_loop".into(),
            loops.to_string().into(),
            "-i".into(),
            input.into(),
            "-c".into(),
            "copy".into(),
            output.into(),
        ];
        self.runner.run(&self.ffmpeg, &args).await?;
        Ok(())
    }

    /// Extracts into the transient video file, loops it when asked, and moves
    /// the result to `final_path`. Transient files are left behind on error.
    pub async fn assemble(&self, source_uri: &str, loops: u32, final_path: &Path) -> Result<()> {
        info!("downloading video");
        self.extract(source_uri, &self.video_path).await?;

        if loops > 0 {
            info!(loops, "adding video loops");
            self.apply_loops(&self.video_path, loops, &self.loop_path)
                .await?;
            tokio::fs::rename(&self.loop_path, final_path).await?;
            tokio::fs::remove_file(&self.video_path).await?;
        } else {
            tokio::fs::rename(&self.video_path, final_path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod stub {
    use std::sync::Mutex;

    use super::*;

    /// Records invocations and writes a placeholder file at the last
    /// argument, which is where ffmpeg writes its output.
    #[derive(Default)]
    pub struct RunnerStub {
        pub calls: Mutex<Vec<Vec<String>>>,
        pub fail_with: Option<String>,
    }

    #[async_trait]
    impl ProcessRunner for RunnerStub {
        async fn run(&self, _program: &Path, args: &[OsString]) -> Result<String> {
            let args: Vec<String> = args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect();
            self.calls.lock().unwrap().push(args.clone());
            if let Some(tool_output) = &self.fail_with {
                return Err(Error::Extraction {
                    tool_output: tool_output.clone(),
                });
            }
            if let Some(output) = args.last() {
                std::fs::write(output, b"video")?;
            }
            Ok(String::new())
        }
    }
}
