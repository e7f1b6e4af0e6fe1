use anyhow::{Context, Result};
use tokio::io::AsyncBufRead;
use tracing::info;

use crate::api::{self, Transport};
use crate::args::Args;
use crate::config::Config;
use crate::download::{self, ProcessRunner, VideoAssembler};
use crate::manifest;
use crate::resource::{ResourceRef, VideoShape, resolve_manifest_url};
use crate::token::TokenManager;

pub struct App<'a> {
    config: Config,
    transport: &'a dyn Transport,
    runner: &'a dyn ProcessRunner,
}

impl<'a> App<'a> {
    pub fn new(config: Config, transport: &'a dyn Transport, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            config,
            transport,
            runner,
        }
    }

    pub async fn run<R>(&self, args: &Args, input: &mut R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let shape: VideoShape = args.shape.parse()?;
        let resource = ResourceRef::parse(&args.url)?;

        let token = TokenManager::new(self.transport, &self.config)
            .ensure_token()
            .await?;

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .with_context(|| format!("creating {}", self.config.output_dir.display()))?;

        let attributes =
            api::fetch_attributes(self.transport, &self.config, &resource, &token).await?;
        let manifest_url = resolve_manifest_url(&attributes, shape, resource.kind)?;
        let final_path = self
            .config
            .output_dir
            .join(download::output_file_name(resource.kind, &attributes)?);
        info!(
            kind = %resource.kind,
            name = %resource.name,
            id = %resource.id,
            manifest = %manifest_url,
            "resolved"
        );

        let variants = manifest::fetch_variants(self.transport, &manifest_url).await?;
        let variant = manifest::prompt_variant(&variants, input).await?;

        VideoAssembler::new(
            self.runner,
            &self.config.ffmpeg,
            self.config.transient_video_path(),
            self.config.transient_loop_path(),
        )
        .assemble(&variant.uri, args.loops, &final_path)
        .await?;

        info!(path = %final_path.display(), "video ready");
        Ok(())
    }
}

/// One-line message for the user, including every cause in the chain.
pub fn error_report(error: &anyhow::Error) -> String {
    format!("Error: {error:#}")
}
