#![cfg(feature = "batch")]

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use zenfb::*;

fn solid(v: u8, w: u32, h: u32) -> PixelGrid {
    PixelGrid::filled(RGBA8::new(v, v.wrapping_mul(3), v.wrapping_mul(7), v), w, h).unwrap()
}

fn workers(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

struct Flag(AtomicBool);

impl Flag {
    fn new() -> Self {
        Flag(AtomicBool::new(false))
    }

    fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Stop for Flag {
    fn check(&self) -> Result<(), StopReason> {
        if self.0.load(Ordering::SeqCst) {
            Err(StopReason::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[test]
fn slow_first_frame_keeps_slot_order() {
    let frames = vec![solid(10, 4, 2), solid(20, 4, 2), solid(30, 4, 2)];
    let expected: Vec<FramebufferImage> = {
        let layout = Layout::new(4, 2, 20, ColorFormat::Argb8888).unwrap();
        frames
            .iter()
            .map(|g| encode(g, &layout, false, &Unstoppable).unwrap())
            .collect()
    };

    let encoder = BatchEncoder::new(4, 2, ColorFormat::Argb8888)
        .with_stride(20)
        .with_workers(workers(3));
    let report = encoder
        .run(
            frames.into_iter().map(Ok::<_, String>),
            |index, grid: PixelGrid| {
                if index == 0 {
                    thread::sleep(Duration::from_millis(150));
                }
                Ok(grid)
            },
            &CollectFrames,
            &Unstoppable,
        )
        .unwrap();

    assert!(report.is_success());
    let outputs: Vec<FramebufferImage> = report
        .into_outputs()
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(outputs, expected);
}

#[test]
fn many_frames_map_to_their_slots() {
    let frames: Vec<PixelGrid> = (0..64u8).map(|i| solid(i, 3, 3)).collect();
    let report = BatchEncoder::new(3, 3, ColorFormat::Rgba8888)
        .with_stride(12)
        .with_workers(workers(4))
        .encode_frames(frames, &Unstoppable)
        .unwrap();

    assert_eq!(report.len(), 64);
    for (i, frame) in report.frames().iter().enumerate() {
        assert_eq!(frame.index, i);
        let image = frame.result.as_ref().unwrap();
        assert_eq!(image.as_bytes()[0], i as u8);
    }
}

#[test]
fn failed_frame_does_not_affect_siblings() {
    let frames = vec![solid(1, 2, 2), solid(2, 3, 2), solid(3, 2, 2), solid(4, 2, 2)];
    let report = BatchEncoder::new(2, 2, ColorFormat::Rgb565)
        .with_stride(4)
        .with_workers(workers(2))
        .encode_frames(frames, &Unstoppable)
        .unwrap();

    assert_eq!(report.len(), 4);
    assert!(!report.is_success());
    let failures: Vec<usize> = report.failures().map(|(i, _)| i).collect();
    assert_eq!(failures, vec![1]);
    assert!(matches!(
        report.frames()[1].result,
        Err(FramebufferError::GridMismatch { .. })
    ));
    let ok: Vec<usize> = report.successes().map(|(i, _)| i).collect();
    assert_eq!(ok, vec![0, 2, 3]);
}

#[test]
fn prepare_errors_are_per_frame() {
    let report = BatchEncoder::new(2, 1, ColorFormat::Bgra8888)
        .with_workers(workers(2))
        .run(
            (0..5u8).map(Ok::<_, String>),
            |index, v: u8| {
                if index == 2 {
                    Err(FramebufferError::InvalidDimensions { width: 0, height: 1 })
                } else {
                    PixelGrid::filled(RGBA8::new(v, v, v, v), 2, 1)
                }
            },
            &CollectFrames,
            &Unstoppable,
        )
        .unwrap();

    assert_eq!(report.len(), 5);
    let failures: Vec<usize> = report.failures().map(|(i, _)| i).collect();
    assert_eq!(failures, vec![2]);
    assert!(matches!(
        report.frames()[2].result,
        Err(FramebufferError::InvalidDimensions { .. })
    ));
}

#[test]
fn source_error_stops_pulling() {
    let pulled = AtomicUsize::new(0);
    let source = (0..10u8).map(|i| {
        pulled.fetch_add(1, Ordering::SeqCst);
        if i == 3 {
            Err("demuxer failed")
        } else {
            Ok(solid(i, 2, 2))
        }
    });

    let report = BatchEncoder::new(2, 2, ColorFormat::Argb8888)
        .with_stride(8)
        .with_workers(workers(2))
        .run(source, |_, grid: PixelGrid| Ok(grid), &CollectFrames, &Unstoppable)
        .unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.source_error(), Some(&"demuxer failed"));
    assert!(!report.is_success());
    assert!(report.frames().iter().all(|f| f.result.is_ok()));
    assert_eq!(pulled.load(Ordering::SeqCst), 4);
}

#[test]
fn stop_token_ends_batch() {
    let flag = Flag::new();
    let report = BatchEncoder::new(2, 2, ColorFormat::Rgb565)
        .with_stride(4)
        .with_workers(workers(1))
        .run(
            (0..10u8).map(Ok::<_, String>),
            |index, v: u8| {
                if index == 1 {
                    flag.raise();
                }
                PixelGrid::filled(RGBA8::new(v, v, v, 255), 2, 2)
            },
            &CollectFrames,
            &flag,
        )
        .unwrap();

    assert!(report.stopped());
    assert_eq!(report.len(), 2);
    assert!(report.frames()[0].result.is_ok());
    assert!(matches!(
        report.frames()[1].result,
        Err(FramebufferError::Cancelled(_))
    ));
}

#[test]
fn empty_source() {
    let report = BatchEncoder::new(1, 1, ColorFormat::Rgb565)
        .with_stride(2)
        .encode_frames(Vec::new(), &Unstoppable)
        .unwrap();
    assert!(report.is_empty());
    assert!(report.is_success());
}

#[test]
fn invalid_target_layout_fails_whole_batch() {
    let result = BatchEncoder::new(4, 4, ColorFormat::Argb8888)
        .with_stride(8)
        .encode_frames(vec![solid(0, 4, 4)], &Unstoppable);
    assert!(matches!(
        result,
        Err(FramebufferError::InvalidLayout { stride: 8, min_stride: 16 })
    ));
}

#[test]
fn directory_sink_writes_indexed_files() {
    let dir = std::env::temp_dir().join(format!("zenfb-batch-{}", std::process::id()));
    let sink = DirectorySink::create(&dir).unwrap();
    let frames: Vec<PixelGrid> = (0..3u8).map(|i| solid(i, 2, 1)).collect();

    let report = BatchEncoder::new(2, 1, ColorFormat::Rgba8888)
        .with_stride(12)
        .with_workers(workers(2))
        .run(
            frames.into_iter().map(Ok::<_, String>),
            |_, grid: PixelGrid| Ok(grid),
            &sink,
            &Unstoppable,
        )
        .unwrap();

    assert!(report.is_success());
    for (i, path) in report.successes() {
        assert_eq!(*path, dir.join(format!("{i}.bin")));
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes[0], i as u8);
        assert_eq!(&bytes[8..], &[0, 0, 0, 0]);
    }
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_stride_is_reported() {
    let frames: Vec<PixelGrid> = (0..3u8).map(|i| solid(i, 5, 2)).collect();
    let report = BatchEncoder::new(5, 2, ColorFormat::Bgra8888)
        .with_workers(workers(2))
        .encode_frames(frames.clone(), &Unstoppable)
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.stride_warning(), Some(StrideWarning { assumed_stride: 20 }));
    for frame in report.into_frames() {
        assert_eq!(frame.result.unwrap().layout().stride(), 20);
    }

    let explicit = BatchEncoder::new(5, 2, ColorFormat::Bgra8888)
        .with_stride(24)
        .encode_frames(frames, &Unstoppable)
        .unwrap();
    assert_eq!(explicit.stride_warning(), None);
}
