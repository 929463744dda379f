//! Video decoding seam.
//!
//! [`VideoDecoder`] opens a container and hands back a [`DecodedVideo`] handle
//! that yields frames by index. Handles release their resources on `Drop`, so
//! every exit path of the sampler closes them.
//!
//! The production decoder shells out to `ffprobe` for the frame count and
//! frame rate, and to `ffmpeg` for each seek-and-decode. With a known frame
//! rate ffmpeg seeks on the input to the frame's timestamp; otherwise it falls
//! back to a `select` filter that decodes from the start. Each frame read runs
//! under a timeout and writes into a scratch directory owned by the handle.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use image::RgbImage;
use tempfile::TempDir;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::media::SampleError;

/// Opens video containers for frame-by-index access.
pub trait VideoDecoder: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn DecodedVideo>, SampleError>;
}

/// An open video. Dropping the handle releases everything it acquired.
pub trait DecodedVideo {
    /// Total number of frames, if the container reports or yields one.
    fn frame_count(&self) -> Option<u64>;

    /// Seeks to `index` and decodes it. `None` on any read failure.
    fn read_frame(&mut self, index: u64) -> Option<RgbImage>;
}

/// Decoder backed by the `ffmpeg` / `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    frame_timeout: Duration,
}

impl FfmpegDecoder {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>, frame_timeout: Duration) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            frame_timeout,
        }
    }

    /// Runs ffprobe against the first video stream and returns trimmed stdout.
    fn probe(&self, path: &Path, extra: &[&str], entries: &str) -> Result<String, SampleError> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-select_streams", "v:0"])
            .args(extra)
            .args(["-show_entries", entries])
            .args(["-of", "default=nokey=1:noprint_wrappers=1"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SampleError::Decode(format!("failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SampleError::Decode(format!(
                "ffprobe rejected the container: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn open(&self, path: &Path) -> Result<Box<dyn DecodedVideo>, SampleError> {
        let len = std::fs::metadata(path)
            .map_err(|e| SampleError::Decode(format!("cannot stat {}: {e}", path.display())))?
            .len();
        if len == 0 {
            return Err(SampleError::Decode("asset is empty".to_string()));
        }

        // Header-declared count first; many containers (webm, some mkv) leave it N/A
        let declared = self.probe(path, &[], "stream=nb_frames")?;
        let frame_count = match parse_frame_count(&declared) {
            Some(n) => Some(n),
            None => {
                debug!("nb_frames unavailable for {}, counting packets", path.display());
                let counted = self.probe(path, &["-count_packets"], "stream=nb_read_packets")?;
                parse_frame_count(&counted)
            }
        };

        let rate = self.probe(path, &[], "stream=r_frame_rate")?;
        let frame_rate = parse_frame_rate(&rate);
        if frame_rate.is_none() {
            debug!("frame rate unknown for {}, reads will decode from the start", path.display());
        }

        let scratch = tempfile::Builder::new().prefix("adlens-frames-").tempdir()?;

        Ok(Box::new(FfmpegVideo {
            source: path.to_path_buf(),
            ffmpeg: self.ffmpeg.clone(),
            frame_timeout: self.frame_timeout,
            frame_count,
            frame_rate,
            scratch,
        }))
    }
}

struct FfmpegVideo {
    source: PathBuf,
    ffmpeg: PathBuf,
    frame_timeout: Duration,
    frame_count: Option<u64>,
    frame_rate: Option<f64>,
    scratch: TempDir,
}

impl FfmpegVideo {
    fn decode_to(&self, index: u64, out: &Path) -> Result<(), String> {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-v", "error", "-nostdin", "-y"]);
        match self.frame_rate {
            Some(fps) => {
                cmd.arg("-ss")
                    .arg(format!("{:.6}", index as f64 / fps))
                    .arg("-i")
                    .arg(&self.source);
            }
            None => {
                cmd.arg("-i")
                    .arg(&self.source)
                    .arg("-vf")
                    .arg(format!("select=eq(n\\,{index})"));
            }
        }

        let mut child = cmd
            .args(["-frames:v", "1", "-f", "image2", "-vcodec", "png"])
            .arg(out)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("failed to spawn ffmpeg: {e}"))?;

        match child.wait_timeout(self.frame_timeout) {
            Ok(Some(status)) if status.success() => Ok(()),
            Ok(Some(status)) => Err(format!("ffmpeg exited with {status}")),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(format!("ffmpeg timed out after {:?}", self.frame_timeout))
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(format!("failed waiting on ffmpeg: {e}"))
            }
        }
    }
}

impl DecodedVideo for FfmpegVideo {
    fn frame_count(&self) -> Option<u64> {
        self.frame_count
    }

    fn read_frame(&mut self, index: u64) -> Option<RgbImage> {
        let out = self.scratch.path().join(format!("frame-{index}.png"));

        if let Err(reason) = self.decode_to(index, &out) {
            warn!("frame {index} of {}: {reason}", self.source.display());
            return None;
        }

        // ffmpeg exits 0 without writing when the seek or filter lands past the end
        let image = match image::open(&out) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                warn!("frame {index} of {}: unreadable output: {e}", self.source.display());
                return None;
            }
        };
        let _ = std::fs::remove_file(&out);
        Some(image)
    }
}

/// Parses an ffprobe count line. `N/A`, empty and zero yield `None`.
fn parse_frame_count(raw: &str) -> Option<u64> {
    raw.lines()
        .next()
        .and_then(|line| line.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

/// Parses ffprobe's `r_frame_rate` (`30000/1001`, `25/1`). `0/0` yields `None`.
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let line = raw.lines().next()?.trim();
    let (num, den) = line.split_once('/').unwrap_or((line, "1"));
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    let fps = num / den;
    (fps.is_finite() && fps > 0.0).then_some(fps)
}
