//! FrameSampler: reduces a video to a bounded set of evenly spaced stills.
//!
//! Algorithm:
//! 1. Open the asset; unopenable containers fail with `SampleError::Decode`.
//! 2. Read the total frame count T; unknown or zero is also `Decode`.
//! 3. stride = max(T / count, 1).
//! 4. Read indices 0, stride, 2·stride, … (< T, at most `count` of them).
//!    The first failed read stops the walk; frames gathered so far are kept.
//! 5. The decoder handle is dropped on every path.
//! 6. Nothing read → `SampleError::NoFramesExtracted`.
//!
//! Sampling is synchronous and blocking. Async callers run it on the blocking pool.

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::media::decoder::VideoDecoder;
use crate::media::{Frame, FrameSet, SampleError};

/// Number of frames sampled when the caller does not ask for a specific count.
pub const DEFAULT_FRAME_COUNT: usize = 5;

pub struct FrameSampler {
    decoder: Arc<dyn VideoDecoder>,
}

impl FrameSampler {
    pub fn new(decoder: Arc<dyn VideoDecoder>) -> Self {
        Self { decoder }
    }

    /// Samples an in-memory asset. The bytes are staged in a temporary file
    /// for the decoder; the file is removed when this returns, on any path.
    pub fn sample_bytes(&self, bytes: &[u8], count: NonZeroUsize) -> Result<FrameSet, SampleError> {
        if bytes.is_empty() {
            return Err(SampleError::Decode("asset is empty".to_string()));
        }

        let mut staged = tempfile::Builder::new()
            .prefix("adlens-upload-")
            .suffix(".video")
            .tempfile()?;
        staged.write_all(bytes)?;
        staged.flush()?;

        self.sample_path(staged.path(), count)
    }

    /// Samples an asset already on disk.
    pub fn sample_path(&self, path: &Path, count: NonZeroUsize) -> Result<FrameSet, SampleError> {
        let mut video = self.decoder.open(path)?;

        let total = match video.frame_count() {
            Some(t) if t > 0 => t,
            _ => {
                return Err(SampleError::Decode(
                    "container reports no frame count".to_string(),
                ))
            }
        };

        let indices = sample_indices(total, count);
        debug!(
            "sampling {} of {total} frames from {}: {indices:?}",
            indices.len(),
            path.display()
        );

        let mut frames = Vec::with_capacity(indices.len());
        for index in indices {
            match video.read_frame(index) {
                Some(image) => frames.push(Frame { index, image }),
                None => {
                    warn!(
                        "read failed at frame {index} of {total}; keeping {} frame(s)",
                        frames.len()
                    );
                    break;
                }
            }
        }
        drop(video);

        FrameSet::new(frames).ok_or(SampleError::NoFramesExtracted)
    }
}

/// Source frame indices sampled for a video of `total` frames.
///
/// Evenly spaced from 0 with stride `max(total / count, 1)`, capped at `count`
/// entries. Pure, so the same inputs always pick the same indices.
pub fn sample_indices(total: u64, count: NonZeroUsize) -> Vec<u64> {
    let count = count.get() as u64;
    let stride = (total / count).max(1);
    (0..count)
        .map(|k| k * stride)
        .take_while(|i| *i < total)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use image::RgbImage;

    use super::*;
    use crate::media::decoder::DecodedVideo;
    use crate::media::test_support::solid_image;

    fn n(count: usize) -> NonZeroUsize {
        NonZeroUsize::new(count).unwrap()
    }

    /// Shared observations from a fake decoder run.
    #[derive(Default)]
    struct Probe {
        opened: AtomicUsize,
        released: AtomicUsize,
        reads: Mutex<Vec<u64>>,
        paths: Mutex<Vec<PathBuf>>,
    }

    struct FakeDecoder {
        total: Option<u64>,
        fail_at: Option<u64>,
        unopenable: bool,
        probe: Arc<Probe>,
    }

    impl FakeDecoder {
        fn with_frames(total: u64) -> Self {
            Self {
                total: Some(total),
                fail_at: None,
                unopenable: false,
                probe: Arc::new(Probe::default()),
            }
        }
    }

    struct FakeVideo {
        total: Option<u64>,
        fail_at: Option<u64>,
        probe: Arc<Probe>,
    }

    impl VideoDecoder for FakeDecoder {
        fn open(&self, path: &Path) -> Result<Box<dyn DecodedVideo>, SampleError> {
            self.probe.paths.lock().unwrap().push(path.to_path_buf());
            if self.unopenable {
                return Err(SampleError::Decode("corrupt container".to_string()));
            }
            self.probe.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeVideo {
                total: self.total,
                fail_at: self.fail_at,
                probe: Arc::clone(&self.probe),
            }))
        }
    }

    impl DecodedVideo for FakeVideo {
        fn frame_count(&self) -> Option<u64> {
            self.total
        }

        fn read_frame(&mut self, index: u64) -> Option<RgbImage> {
            self.probe.reads.lock().unwrap().push(index);
            match self.fail_at {
                Some(bad) if index >= bad => None,
                _ => Some(solid_image((index % 256) as u8)),
            }
        }
    }

    impl Drop for FakeVideo {
        fn drop(&mut self) {
            self.probe.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sampler_for(decoder: FakeDecoder) -> (FrameSampler, Arc<Probe>) {
        let probe = Arc::clone(&decoder.probe);
        (FrameSampler::new(Arc::new(decoder)), probe)
    }

    #[test]
    fn test_hundred_frames_five_samples() {
        let (sampler, probe) = sampler_for(FakeDecoder::with_frames(100));
        let set = sampler.sample_path(Path::new("clip.mp4"), n(5)).unwrap();
        assert_eq!(set.indices(), vec![0, 20, 40, 60, 80]);
        assert_eq!(*probe.reads.lock().unwrap(), vec![0, 20, 40, 60, 80]);
    }

    #[test]
    fn test_short_video_yields_every_frame() {
        let (sampler, _) = sampler_for(FakeDecoder::with_frames(3));
        let set = sampler.sample_path(Path::new("clip.mp4"), n(5)).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_uneven_total_still_returns_requested_count() {
        let (sampler, _) = sampler_for(FakeDecoder::with_frames(11));
        let set = sampler.sample_path(Path::new("clip.mp4"), n(5)).unwrap();
        assert_eq!(set.indices(), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_single_frame_request() {
        let (sampler, _) = sampler_for(FakeDecoder::with_frames(240));
        let set = sampler.sample_path(Path::new("clip.mp4"), n(1)).unwrap();
        assert_eq!(set.indices(), vec![0]);
    }

    #[test]
    fn test_frames_carry_decoded_pixels() {
        let (sampler, _) = sampler_for(FakeDecoder::with_frames(100));
        let set = sampler.sample_path(Path::new("clip.mp4"), n(5)).unwrap();
        let reds: Vec<u8> = set
            .into_frames()
            .iter()
            .map(|f| f.image.get_pixel(0, 0).0[0])
            .collect();
        assert_eq!(reds, vec![0, 20, 40, 60, 80]);
    }

    #[test]
    fn test_zero_frame_count_is_decode_error() {
        let (sampler, probe) = sampler_for(FakeDecoder::with_frames(0));
        let err = sampler.sample_path(Path::new("clip.mp4"), n(5)).unwrap_err();
        assert!(matches!(err, SampleError::Decode(_)));
        assert!(probe.reads.lock().unwrap().is_empty());
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_frame_count_is_decode_error() {
        let mut decoder = FakeDecoder::with_frames(0);
        decoder.total = None;
        let (sampler, _) = sampler_for(decoder);
        let err = sampler.sample_path(Path::new("clip.mp4"), n(5)).unwrap_err();
        assert!(matches!(err, SampleError::Decode(_)));
    }

    #[test]
    fn test_unopenable_container_is_decode_error() {
        let mut decoder = FakeDecoder::with_frames(100);
        decoder.unopenable = true;
        let (sampler, probe) = sampler_for(decoder);
        let err = sampler.sample_path(Path::new("broken.mp4"), n(5)).unwrap_err();
        assert!(matches!(err, SampleError::Decode(_)));
        assert!(probe.reads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_no_readable_frames_is_reported() {
        let mut decoder = FakeDecoder::with_frames(100);
        decoder.fail_at = Some(0);
        let (sampler, probe) = sampler_for(decoder);
        let err = sampler.sample_path(Path::new("clip.mp4"), n(5)).unwrap_err();
        assert!(matches!(err, SampleError::NoFramesExtracted));
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_read_truncates_instead_of_skipping() {
        let mut decoder = FakeDecoder::with_frames(100);
        decoder.fail_at = Some(50);
        let (sampler, probe) = sampler_for(decoder);
        let set = sampler.sample_path(Path::new("clip.mp4"), n(5)).unwrap();
        assert_eq!(set.indices(), vec![0, 20, 40]);
        // Stops at the first failure: 80 is never attempted
        assert_eq!(*probe.reads.lock().unwrap(), vec![0, 20, 40, 60]);
    }

    #[test]
    fn test_decoder_released_on_success() {
        let (sampler, probe) = sampler_for(FakeDecoder::with_frames(100));
        sampler.sample_path(Path::new("clip.mp4"), n(5)).unwrap();
        assert_eq!(probe.opened.load(Ordering::SeqCst), 1);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_calls_pick_same_indices() {
        let (sampler, _) = sampler_for(FakeDecoder::with_frames(1234));
        let first = sampler.sample_path(Path::new("clip.mp4"), n(7)).unwrap();
        let second = sampler.sample_path(Path::new("clip.mp4"), n(7)).unwrap();
        assert_eq!(first.indices(), second.indices());
    }

    #[test]
    fn test_sample_bytes_removes_staged_file_on_success() {
        let (sampler, probe) = sampler_for(FakeDecoder::with_frames(10));
        sampler.sample_bytes(b"opaque container bytes", n(2)).unwrap();
        let paths = probe.paths.lock().unwrap();
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].exists(), "staged upload must be deleted");
    }

    #[test]
    fn test_sample_bytes_removes_staged_file_on_failure() {
        let mut decoder = FakeDecoder::with_frames(10);
        decoder.unopenable = true;
        let (sampler, probe) = sampler_for(decoder);
        assert!(sampler.sample_bytes(b"garbage", n(2)).is_err());
        let paths = probe.paths.lock().unwrap();
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].exists(), "staged upload must be deleted");
    }

    #[test]
    fn test_zero_byte_asset_fails_before_decoder() {
        let (sampler, probe) = sampler_for(FakeDecoder::with_frames(10));
        let err = sampler.sample_bytes(&[], n(5)).unwrap_err();
        assert!(matches!(err, SampleError::Decode(_)));
        assert!(probe.paths.lock().unwrap().is_empty());
        assert!(probe.reads.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sample_indices_properties() {
        for total in 1..60u64 {
            for count in 1..12usize {
                let idx = sample_indices(total, n(count));
                assert!(!idx.is_empty());
                assert!(idx.windows(2).all(|w| w[0] < w[1]));
                assert!(idx.iter().all(|i| *i < total));
                let expected = (count as u64).min(total) as usize;
                assert_eq!(idx.len(), expected, "total={total} count={count}");
            }
        }
    }
}
