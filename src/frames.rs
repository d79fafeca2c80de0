//! Frame sequence loading.
//!
//! A store owns the ordered frame set for one device class and loads it on
//! a small worker pool. Loads are independent and complete in any order;
//! each outcome (success or failure) is posted back over a channel and
//! counted toward completion, so a failed frame never stalls the pipeline.
//! `ready` fires exactly once, when every index has reported back; failed
//! indices simply stay empty and are skipped at draw time.
//!
//! Switching device class restarts the load under a new generation number.
//! Results still in flight from the previous generation are discarded when
//! they arrive. One attempt per frame; no retry, no timeout.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{anyhow, Context, Result};
use image::ImageReader;
use tiny_skia::{IntSize, Pixmap, PixmapRef};

use crate::schema::FrameSequence;
use crate::viewport::DeviceClass;

const LOADER_THREADS: usize = 4;

/// One decoded frame, premultiplied RGBA8, immutable once loaded.
#[derive(Debug)]
pub struct Frame {
    pixmap: Pixmap,
}

impl Frame {
    pub fn from_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> Result<Self> {
        premultiply_rgba8(&mut data);
        let size = IntSize::from_wh(width, height)
            .ok_or_else(|| anyhow!("invalid frame dimensions {width}x{height}"))?;
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or_else(|| anyhow!("frame pixel data does not match {width}x{height}"))?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn aspect(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    pub fn as_ref(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}

struct LoadEvent {
    generation: u64,
    /// 1-based file index.
    index: u32,
    outcome: Result<Frame>,
}

/// What changed while draining load events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorePoll {
    pub progress_changed: bool,
    pub became_ready: bool,
}

pub struct FrameStore {
    sequence: FrameSequence,
    class: DeviceClass,
    generation: Arc<AtomicU64>,
    sender: Sender<LoadEvent>,
    receiver: Receiver<LoadEvent>,
    slots: Vec<Option<Frame>>,
    completed: u32,
    loading_progress: u8,
    ready: bool,
}

impl FrameStore {
    /// Start loading the sequence for `class`. The sequence's directories
    /// must already be resolved against the scene location.
    pub fn start(sequence: FrameSequence, class: DeviceClass) -> Self {
        let store = Self::idle(sequence, class);
        store.spawn_workers();
        store
    }

    /// A store whose slots are already populated. Benches and tests use
    /// this to skip disk loading.
    pub fn preloaded(
        sequence: FrameSequence,
        class: DeviceClass,
        frames: Vec<Option<Frame>>,
    ) -> Self {
        let mut store = Self::idle(sequence, class);
        store.completed = store.sequence.count;
        store.loading_progress = 100;
        store.ready = true;
        store.slots = frames;
        store.slots.resize_with(store.sequence.count as usize, || None);
        store
    }

    fn idle(sequence: FrameSequence, class: DeviceClass) -> Self {
        let (sender, receiver) = mpsc::channel();
        let slots = (0..sequence.count).map(|_| None).collect();
        Self {
            sequence,
            class,
            generation: Arc::new(AtomicU64::new(1)),
            sender,
            receiver,
            slots,
            completed: 0,
            loading_progress: 0,
            ready: false,
        }
    }

    /// Drop everything loaded so far and reload for a new device class.
    /// In-flight results from the previous class arrive tagged with the old
    /// generation and are discarded.
    pub fn restart(&mut self, class: DeviceClass) {
        self.class = class;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.slots = (0..self.sequence.count).map(|_| None).collect();
        self.completed = 0;
        self.loading_progress = 0;
        self.ready = false;
        self.spawn_workers();
    }

    fn spawn_workers(&self) {
        let generation = self.generation.load(Ordering::SeqCst);
        let queue: Arc<Mutex<VecDeque<u32>>> =
            Arc::new(Mutex::new((1..=self.sequence.count).collect()));
        let workers = LOADER_THREADS.min(self.sequence.count as usize).max(1);

        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let live_generation = Arc::clone(&self.generation);
            let sender = self.sender.clone();
            let sequence = self.sequence.clone();
            let class = self.class;

            let spawned = thread::Builder::new()
                .name(format!("brew-loader-{worker}"))
                .spawn(move || loop {
                    if live_generation.load(Ordering::SeqCst) != generation {
                        break;
                    }
                    let index = queue.lock().ok().and_then(|mut queue| queue.pop_front());
                    let Some(index) = index else { break };
                    let path = sequence.frame_path(class, index);
                    let outcome = decode_frame(&path);
                    if sender
                        .send(LoadEvent {
                            generation,
                            index,
                            outcome,
                        })
                        .is_err()
                    {
                        break;
                    }
                });
            if let Err(error) = spawned {
                eprintln!("[brew] failed to spawn frame loader: {error}");
            }
        }
    }

    /// Drain pending load events without blocking. Call once per tick.
    pub fn poll(&mut self) -> StorePoll {
        let mut poll = StorePoll::default();
        while let Ok(event) = self.receiver.try_recv() {
            self.apply(event, &mut poll);
        }
        poll
    }

    /// Block until the current generation finishes loading. Used by the
    /// one-shot render path; the interactive loop polls instead.
    pub fn wait_ready(&mut self) -> Result<()> {
        let mut poll = StorePoll::default();
        while !self.ready {
            let event = self
                .receiver
                .recv()
                .map_err(|_| anyhow!("frame loaders stopped before the sequence completed"))?;
            self.apply(event, &mut poll);
        }
        Ok(())
    }

    fn apply(&mut self, event: LoadEvent, poll: &mut StorePoll) {
        if event.generation != self.generation.load(Ordering::SeqCst) {
            return;
        }

        match event.outcome {
            Ok(frame) => {
                let slot = (event.index - 1) as usize;
                if let Some(slot) = self.slots.get_mut(slot) {
                    *slot = Some(frame);
                }
            }
            Err(error) => {
                eprintln!("[brew] failed to load frame {}: {error:#}", event.index);
            }
        }

        self.completed = (self.completed + 1).min(self.sequence.count);
        let progress =
            ((self.completed as f32 / self.sequence.count as f32) * 100.0).round() as u8;
        if progress != self.loading_progress {
            self.loading_progress = progress;
            poll.progress_changed = true;
        }
        if self.completed == self.sequence.count && !self.ready {
            self.ready = true;
            poll.became_ready = true;
        }
    }

    /// Frame by 0-based render index. `None` for indices whose load failed
    /// or has not finished.
    pub fn frame(&self, index: u32) -> Option<&Frame> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }

    pub fn frame_count(&self) -> u32 {
        self.sequence.count
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Percentage of load callbacks that have fired, rounded.
    pub fn loading_progress(&self) -> u8 {
        self.loading_progress
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn device_class(&self) -> DeviceClass {
        self.class
    }
}

fn decode_frame(path: &Path) -> Result<Frame> {
    let image = ImageReader::open(path)
        .with_context(|| format!("failed opening {}", path.display()))?
        .decode()
        .with_context(|| format!("failed decoding {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Frame::from_rgba8(width, height, image.into_raw())
        .with_context(|| format!("failed preparing {}", path.display()))
}

fn premultiply_rgba8(data: &mut [u8]) {
    for pixel in data.chunks_exact_mut(4) {
        let alpha = pixel[3] as u16;
        if alpha == 255 {
            continue;
        }
        pixel[0] = ((pixel[0] as u16 * alpha) / 255) as u8;
        pixel[1] = ((pixel[1] as u16 * alpha) / 255) as u8;
        pixel[2] = ((pixel[2] as u16 * alpha) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameStore, LoadEvent, StorePoll};
    use crate::schema::FrameSequence;
    use crate::viewport::DeviceClass;

    fn sequence(count: u32) -> FrameSequence {
        serde_yaml::from_str(&format!(
            "{{count: {count}, file_prefix: frame-, extension: png, compact_dir: m, regular_dir: w}}"
        ))
        .expect("sequence should parse")
    }

    fn test_frame() -> Frame {
        Frame::from_rgba8(2, 2, vec![255; 16]).expect("frame should build")
    }

    #[test]
    fn from_rgba8_premultiplies_alpha() {
        let frame = Frame::from_rgba8(1, 1, vec![255, 0, 0, 128]).expect("frame should build");
        let pixel = frame.as_ref().pixels()[0];
        assert_eq!(pixel.red(), 128);
        assert_eq!(pixel.alpha(), 128);
    }

    #[test]
    fn completion_counts_successes_and_failures() {
        let mut store = FrameStore::idle(sequence(2), DeviceClass::Regular);
        let mut poll = StorePoll::default();

        store.apply(
            LoadEvent {
                generation: 1,
                index: 1,
                outcome: Ok(test_frame()),
            },
            &mut poll,
        );
        assert_eq!(store.loading_progress(), 50);
        assert!(poll.progress_changed);
        assert!(!store.is_ready());

        store.apply(
            LoadEvent {
                generation: 1,
                index: 2,
                outcome: Err(anyhow::anyhow!("synthetic decode failure")),
            },
            &mut poll,
        );
        assert_eq!(store.loading_progress(), 100);
        assert!(store.is_ready());
        assert!(poll.became_ready);

        // The failed slot stays empty; the loaded one is present.
        assert!(store.frame(0).is_some());
        assert!(store.frame(1).is_none());
    }

    #[test]
    fn ready_fires_exactly_once() {
        let mut store = FrameStore::idle(sequence(1), DeviceClass::Regular);
        let mut first = StorePoll::default();
        store.apply(
            LoadEvent {
                generation: 1,
                index: 1,
                outcome: Ok(test_frame()),
            },
            &mut first,
        );
        assert!(first.became_ready);

        let mut second = StorePoll::default();
        store.apply(
            LoadEvent {
                generation: 1,
                index: 1,
                outcome: Ok(test_frame()),
            },
            &mut second,
        );
        assert!(!second.became_ready);
    }

    #[test]
    fn stale_generation_events_are_discarded() {
        let mut store = FrameStore::idle(sequence(2), DeviceClass::Regular);
        store.restart(DeviceClass::Compact);

        let mut poll = StorePoll::default();
        store.apply(
            LoadEvent {
                generation: 1,
                index: 1,
                outcome: Ok(test_frame()),
            },
            &mut poll,
        );

        assert_eq!(poll, StorePoll::default());
        assert_eq!(store.loading_progress(), 0);
        assert!(store.frame(0).is_none());
        assert_eq!(store.device_class(), DeviceClass::Compact);
    }

    #[test]
    fn preloaded_store_reports_ready() {
        let store = FrameStore::preloaded(
            sequence(2),
            DeviceClass::Regular,
            vec![Some(test_frame()), None],
        );
        assert!(store.is_ready());
        assert_eq!(store.loading_progress(), 100);
        assert_eq!(store.loaded_count(), 1);
    }
}
