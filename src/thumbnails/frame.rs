//! Single-frame extraction from video files through an external tool.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use mediashelf_common::{Error, Result};
use tokio::process::Command;

/// Pulls one decoded frame out of a video file.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Extract the frame at `offset`, scaled to `target_width` pixels wide.
    ///
    /// Returns encoded image bytes. Implementations must give up after
    /// `timeout` and release any process they started.
    async fn extract_frame(
        &self,
        path: &Path,
        offset: Duration,
        target_width: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>>;
}

/// [`FrameExtractor`] backed by the `ffmpeg` command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    program: PathBuf,
}

impl FfmpegFrameExtractor {
    /// Use the given ffmpeg binary.
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Prefer a configured binary, then PATH, then a bare `ffmpeg`.
    pub fn discover(configured: Option<&Path>) -> Self {
        let program = configured
            .filter(|p| p.exists())
            .map(Path::to_path_buf)
            .or_else(|| which::which("ffmpeg").ok())
            .unwrap_or_else(|| PathBuf::from("ffmpeg"));
        Self::new(program)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    fn build_args(path: &Path, offset: Duration, target_width: u32) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-ss".into(),
            format!("{:.3}", offset.as_secs_f64()),
            "-i".into(),
            path.to_string_lossy().into_owned(),
            "-frames:v".into(),
            "1".into(),
            "-vf".into(),
            format!("scale={target_width}:-1"),
            "-f".into(),
            "image2".into(),
            "pipe:1".into(),
        ]
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_frame(
        &self,
        path: &Path,
        offset: Duration,
        target_width: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let tool = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(Self::build_args(path, offset, target_width))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout kills the child; tokio reaps it.
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| Error::tool(&tool, format!("failed to spawn: {e}")))?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::tool(
                    tool,
                    format!("I/O error waiting for process: {e}"),
                ))
            }
            Err(_elapsed) => {
                return Err(Error::tool(tool, format!("timed out after {timeout:?}")));
            }
        };

        if !output.status.success() {
            return Err(Error::tool(
                tool,
                format!(
                    "exited with status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        if output.stdout.is_empty() {
            return Err(Error::tool(tool, "produced no frame"));
        }

        Ok(output.stdout)
    }
}
