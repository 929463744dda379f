//! Media handling for uploaded assets.
//!
//! Uploads are sniffed by magic bytes, never by filename or client-declared
//! content type. Video assets go through [`sampler::FrameSampler`] to become a
//! [`FrameSet`] of still RGB frames; images pass through untouched.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage};
use thiserror::Error;

pub mod decoder;
pub mod sampler;

#[derive(Debug, Error)]
pub enum SampleError {
    /// The container could not be opened, is empty or reports no frames.
    #[error("video could not be decoded: {0}")]
    Decode(String),

    /// The container opened but not a single frame could be read.
    #[error("no frames could be extracted from the video")]
    NoFramesExtracted,

    #[error("I/O error while staging video: {0}")]
    Io(#[from] std::io::Error),
}

/// What kind of media an upload turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Result of sniffing an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedMedia {
    pub kind: MediaKind,
    pub mime_type: &'static str,
}

/// Sniffs the leading bytes of an upload. Returns `None` for anything that is
/// neither an image nor a video (documents, archives, empty input).
pub fn detect_media(bytes: &[u8]) -> Option<DetectedMedia> {
    let detected = infer::get(bytes)?;
    let kind = match detected.matcher_type() {
        infer::MatcherType::Image => MediaKind::Image,
        infer::MatcherType::Video => MediaKind::Video,
        _ => return None,
    };
    Some(DetectedMedia {
        kind,
        mime_type: detected.mime_type(),
    })
}

/// A single decoded still, tagged with the source frame index it was read from.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub image: RgbImage,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encodes the RGB buffer as PNG for transport to the model.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Cursor::new(Vec::new());
        PngEncoder::new(&mut buf).write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            ColorType::Rgb8,
        )?;
        Ok(buf.into_inner())
    }
}

/// Ordered, non-empty set of sampled frames. Indices are strictly increasing.
#[derive(Debug, Clone)]
pub struct FrameSet {
    frames: Vec<Frame>,
}

impl FrameSet {
    /// Builds a set from frames already in temporal order. `None` when empty.
    pub(crate) fn new(frames: Vec<Frame>) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        debug_assert!(frames.windows(2).all(|w| w[0].index < w[1].index));
        Some(Self { frames })
    }

    pub fn first(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn indices(&self) -> Vec<u64> {
        self.frames.iter().map(|f| f.index).collect()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}
