//! Multi-frame encoding on a bounded worker pool.
//!
//! Frames are pulled one at a time from a caller-supplied source (which may
//! block, e.g. a video demuxer), prepared and encoded on a fixed number of
//! worker threads, and recorded in the output slot matching their position in
//! the source. Completion order does not affect slot order. A failing frame
//! only fills its own slot with an error.

use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::num::NonZeroUsize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use enough::Stop;

use crate::encode::encode;
use crate::error::FramebufferError;
use crate::format::ColorFormat;
use crate::framebuffer::FramebufferImage;
use crate::layout::{Layout, ResolvedLayout, StrideWarning};
use crate::limits::{Limits, check_limits};
use crate::pixel::PixelGrid;

/// Upper bound on the default worker count. Frames can be large.
const MAX_DEFAULT_WORKERS: usize = 8;

/// Receives each encoded frame on the worker thread that produced it.
pub trait FrameSink: Sync {
    type Output: Send;

    fn accept(&self, index: usize, image: FramebufferImage) -> Result<Self::Output, FramebufferError>;
}

/// Keeps every encoded frame in memory.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectFrames;

impl FrameSink for CollectFrames {
    type Output = FramebufferImage;

    fn accept(&self, _index: usize, image: FramebufferImage) -> Result<FramebufferImage, FramebufferError> {
        Ok(image)
    }
}

/// Writes frame `i` verbatim to `<dir>/<i>.bin`.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Use `dir`, creating it if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, FramebufferError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.bin"))
    }
}

impl FrameSink for DirectorySink {
    type Output = PathBuf;

    fn accept(&self, index: usize, image: FramebufferImage) -> Result<PathBuf, FramebufferError> {
        let path = self.path_for(index);
        image.write_to(BufWriter::new(File::create(&path)?))?;
        log::trace!("wrote frame {index} to {}", path.display());
        Ok(path)
    }
}

/// Result for one source frame.
#[derive(Debug)]
pub struct FrameOutcome<O> {
    pub index: usize,
    pub result: Result<O, FramebufferError>,
}

/// Per-frame results in source order, plus why the source stopped early (if it did).
#[derive(Debug)]
pub struct BatchReport<E, O> {
    frames: Vec<FrameOutcome<O>>,
    source_error: Option<E>,
    stopped: bool,
    stride_warning: Option<StrideWarning>,
}

impl<E, O> BatchReport<E, O> {
    /// All pulled frames; `frames()[i].index == i`.
    pub fn frames(&self) -> &[FrameOutcome<O>] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = (usize, &O)> {
        self.frames
            .iter()
            .filter_map(|f| f.result.as_ref().ok().map(|o| (f.index, o)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &FramebufferError)> {
        self.frames
            .iter()
            .filter_map(|f| f.result.as_ref().err().map(|e| (f.index, e)))
    }

    /// Error the source returned, after which no more frames were pulled.
    pub fn source_error(&self) -> Option<&E> {
        self.source_error.as_ref()
    }

    /// Whether the stop token ended the batch before the source was drained.
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// Set when the encoder had no stride and assumed a packed one.
    pub fn stride_warning(&self) -> Option<StrideWarning> {
        self.stride_warning
    }

    /// Every frame succeeded and the source was fully drained.
    pub fn is_success(&self) -> bool {
        !self.stopped && self.source_error.is_none() && self.frames.iter().all(|f| f.result.is_ok())
    }

    pub fn into_frames(self) -> Vec<FrameOutcome<O>> {
        self.frames
    }

    /// Results in source order, dropping indices.
    pub fn into_outputs(self) -> Vec<Result<O, FramebufferError>> {
        self.frames.into_iter().map(|f| f.result).collect()
    }
}

struct WorkQueue<I, E> {
    source: I,
    next_index: usize,
    source_error: Option<E>,
    exhausted: bool,
    stopped: bool,
}

/// Encodes a sequence of same-sized frames on a fixed-size worker pool.
///
/// ```
/// use core::num::NonZeroUsize;
/// use zenfb::{BatchEncoder, ColorFormat, PixelGrid, RGBA8, Unstoppable};
///
/// let frames = (0..4u8).map(|i| PixelGrid::filled(RGBA8::new(i, i, i, 255), 2, 2).unwrap());
/// let report = BatchEncoder::new(2, 2, ColorFormat::Rgb565)
///     .with_stride(4)
///     .with_workers(NonZeroUsize::new(2).unwrap())
///     .encode_frames(frames, &Unstoppable)?;
/// assert!(report.is_success());
/// assert_eq!(report.len(), 4);
/// # Ok::<(), zenfb::FramebufferError>(())
/// ```
#[derive(Clone, Debug)]
pub struct BatchEncoder<'a> {
    width: u32,
    height: u32,
    format: ColorFormat,
    stride: Option<u32>,
    force_opaque_alpha: bool,
    limits: Option<&'a Limits>,
    workers: NonZeroUsize,
}

impl<'a> BatchEncoder<'a> {
    /// Target frame size and format. Workers default to the available
    /// parallelism, capped at 8.
    pub fn new(width: u32, height: u32, format: ColorFormat) -> Self {
        Self {
            width,
            height,
            format,
            stride: None,
            force_opaque_alpha: false,
            limits: None,
            workers: default_workers(),
        }
    }

    /// Row stride in bytes, as reported by the device. Used verbatim.
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn with_force_opaque_alpha(mut self, force: bool) -> Self {
        self.force_opaque_alpha = force;
        self
    }

    /// Limits apply to each frame's output buffer.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Target layout. Logs a warning if the stride had to be guessed.
    pub fn layout(&self) -> Result<ResolvedLayout, FramebufferError> {
        Layout::resolve(self.width, self.height, self.format, self.stride)
    }

    /// Encode already-sized frames and keep the results in memory.
    pub fn encode_frames<I, S>(
        &self,
        frames: I,
        stop: &S,
    ) -> Result<BatchReport<Infallible, FramebufferImage>, FramebufferError>
    where
        I: IntoIterator<Item = PixelGrid>,
        I::IntoIter: Send,
        S: Stop + Sync,
    {
        self.run(
            frames.into_iter().map(Ok::<_, Infallible>),
            |_, grid: PixelGrid| Ok(grid),
            &CollectFrames,
            stop,
        )
    }

    /// Pull items from `source`, turn each into a [`PixelGrid`] with `prepare`
    /// on a worker, encode it, and hand the result to `sink`.
    ///
    /// A source error stops further pulls and is kept in the report. A
    /// triggered `stop` also stops pulls; frames already in flight may end up
    /// as [`FramebufferError::Cancelled`]. Only pool construction and an
    /// invalid target layout fail the whole call.
    pub fn run<T, E, I, P, K, S>(
        &self,
        source: I,
        prepare: P,
        sink: &K,
        stop: &S,
    ) -> Result<BatchReport<E, K::Output>, FramebufferError>
    where
        I: IntoIterator<Item = Result<T, E>>,
        I::IntoIter: Send,
        E: Send,
        P: Fn(usize, T) -> Result<PixelGrid, FramebufferError> + Sync,
        K: FrameSink,
        S: Stop + Sync,
    {
        let resolved = self.layout()?;
        let layout = resolved.layout;
        check_limits(self.limits, layout.width(), layout.height(), layout.buffer_len()?)?;

        let workers = self.workers.get();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("zenfb-batch-{i}"))
            .build()
            .map_err(|e| FramebufferError::WorkerPool(e.to_string()))?;

        let queue = Mutex::new(WorkQueue {
            source: source.into_iter(),
            next_index: 0,
            source_error: None,
            exhausted: false,
            stopped: false,
        });
        let slots: Mutex<Vec<Option<FrameOutcome<K::Output>>>> = Mutex::new(Vec::new());

        log::debug!(
            "batch encode {}x{} {} (stride {}) on {workers} workers",
            layout.width(),
            layout.height(),
            layout.format(),
            layout.stride()
        );

        pool.scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|_| self.work(&queue, &slots, &prepare, sink, &layout, stop));
            }
        });

        let queue = queue.into_inner().unwrap_or_else(PoisonError::into_inner);
        let frames: Vec<_> = slots
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .flatten()
            .collect();
        debug_assert_eq!(frames.len(), queue.next_index);

        let report = BatchReport {
            frames,
            source_error: queue.source_error,
            stopped: queue.stopped,
            stride_warning: resolved.warning(),
        };
        log::debug!(
            "batch finished: {} frames, {} failed, source error: {}, stopped: {}",
            report.len(),
            report.failures().count(),
            report.source_error.is_some(),
            report.stopped
        );
        Ok(report)
    }

    fn work<T, E, I, P, K, S>(
        &self,
        queue: &Mutex<WorkQueue<I, E>>,
        slots: &Mutex<Vec<Option<FrameOutcome<K::Output>>>>,
        prepare: &P,
        sink: &K,
        layout: &Layout,
        stop: &S,
    ) where
        I: Iterator<Item = Result<T, E>>,
        P: Fn(usize, T) -> Result<PixelGrid, FramebufferError>,
        K: FrameSink,
        S: Stop,
    {
        while let Some((index, item)) = next_item(queue, stop) {
            let result = prepare(index, item)
                .and_then(|grid| encode(&grid, layout, self.force_opaque_alpha, stop))
                .and_then(|image| sink.accept(index, image));
            match &result {
                Ok(_) => log::trace!("frame {index} encoded"),
                Err(e) => log::debug!("frame {index} failed: {e}"),
            }

            let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
            if slots.len() <= index {
                slots.resize_with(index + 1, || None);
            }
            slots[index] = Some(FrameOutcome { index, result });
        }
    }
}

/// Take the next item and its index, or `None` once the source is done.
fn next_item<T, E, I, S>(queue: &Mutex<WorkQueue<I, E>>, stop: &S) -> Option<(usize, T)>
where
    I: Iterator<Item = Result<T, E>>,
    S: Stop,
{
    let mut q = queue.lock().unwrap_or_else(PoisonError::into_inner);
    if q.exhausted {
        return None;
    }
    if stop.check().is_err() {
        log::debug!("batch stop requested after {} frames", q.next_index);
        q.stopped = true;
        q.exhausted = true;
        return None;
    }
    match q.source.next() {
        Some(Ok(item)) => {
            let index = q.next_index;
            q.next_index += 1;
            Some((index, item))
        }
        Some(Err(e)) => {
            log::debug!("frame source failed after {} frames", q.next_index);
            q.source_error = Some(e);
            q.exhausted = true;
            None
        }
        None => {
            q.exhausted = true;
            None
        }
    }
}

fn default_workers() -> NonZeroUsize {
    let n = std::thread::available_parallelism()
        .map(|n| n.get().min(MAX_DEFAULT_WORKERS))
        .unwrap_or(1);
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}
