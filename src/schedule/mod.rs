//! Superpatch wavefront scheduler.
//!
//! The valid target-center rectangle is tiled into superpatches stored
//! in a contiguous array with index-based neighbor links. A tile is
//! released to the shared FIFO queue once its scan-order prerequisites
//! are processed: left and top neighbors for the direct scan, right and
//! bottom for the reverse one. That preserves propagation's
//! read-from-neighbor dependency across tile boundaries while unrelated
//! tiles run concurrently; a single worker draining the same queue is
//! the serial degenerate of the schedule.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::util::rect::Rect;

#[cfg(feature = "rayon")]
use {
    crate::pixel::Pixel,
    crate::search::{process_span, FieldCtx},
    crate::trace::wavefront_span,
    rand::rngs::StdRng,
    rand::SeedableRng,
};

/// Sentinel for an absent neighbor link.
pub(crate) const NO_NEIGHBOR: usize = usize::MAX;

/// One unit of worker processing: a tile of target patch centers.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SuperPatch {
    pub span: Rect,
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

/// Regular grid of superpatches covering the target-center rectangle.
pub(crate) struct TileGrid {
    tiles: Vec<SuperPatch>,
    cols: usize,
    rows: usize,
}

impl TileGrid {
    /// Partitions `rect` (non-empty) into tiles of side `tile_size`;
    /// the last row and column absorb the remainder.
    pub(crate) fn build(rect: Rect, tile_size: usize) -> Self {
        let tile = tile_size.max(1) as i32;
        let cols = ((rect.width() + tile - 1) / tile) as usize;
        let rows = ((rect.height() + tile - 1) / tile) as usize;

        let mut tiles = Vec::with_capacity(cols * rows);
        for ty in 0..rows {
            for tx in 0..cols {
                let left = rect.left + tx as i32 * tile;
                let top = rect.top + ty as i32 * tile;
                let span = Rect::new(
                    left,
                    top,
                    (left + tile).min(rect.right),
                    (top + tile).min(rect.bottom),
                );
                let idx = ty * cols + tx;
                tiles.push(SuperPatch {
                    span,
                    left: if tx > 0 { idx - 1 } else { NO_NEIGHBOR },
                    top: if ty > 0 { idx - cols } else { NO_NEIGHBOR },
                    right: if tx + 1 < cols { idx + 1 } else { NO_NEIGHBOR },
                    bottom: if ty + 1 < rows { idx + cols } else { NO_NEIGHBOR },
                });
            }
        }
        Self { tiles, cols, rows }
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub(crate) fn tiles(&self) -> &[SuperPatch] {
        &self.tiles
    }

    /// Entry tile for the direct scan.
    fn top_left(&self) -> usize {
        0
    }

    /// Entry tile for the reverse scan.
    fn bottom_right(&self) -> usize {
        self.tiles.len() - 1
    }
}

struct WavefrontState {
    queue: VecDeque<usize>,
    enqueued: Vec<bool>,
    processed: Vec<bool>,
    remaining: usize,
}

/// Shared release queue for one iteration over the tile grid.
pub(crate) struct Wavefront<'g> {
    grid: &'g TileGrid,
    reverse: bool,
    state: Mutex<WavefrontState>,
    ready: Condvar,
}

impl<'g> Wavefront<'g> {
    pub(crate) fn new(grid: &'g TileGrid, reverse: bool) -> Self {
        let len = grid.len();
        let seed = if reverse {
            grid.bottom_right()
        } else {
            grid.top_left()
        };
        let mut enqueued = vec![false; len];
        enqueued[seed] = true;
        let mut queue = VecDeque::with_capacity(grid.cols + grid.rows);
        queue.push_back(seed);
        Self {
            grid,
            reverse,
            state: Mutex::new(WavefrontState {
                queue,
                enqueued,
                processed: vec![false; len],
                remaining: len,
            }),
            ready: Condvar::new(),
        }
    }

    /// Blocks until a tile is released; returns `None` once every tile
    /// has been processed.
    pub(crate) fn next(&self) -> Option<usize> {
        let mut state = self.state.lock().expect("wavefront lock poisoned");
        loop {
            if state.remaining == 0 {
                return None;
            }
            if let Some(idx) = state.queue.pop_front() {
                return Some(idx);
            }
            state = self.ready.wait(state).expect("wavefront lock poisoned");
        }
    }

    /// Marks a tile processed and releases any neighbor whose
    /// prerequisites just completed.
    pub(crate) fn complete(&self, idx: usize) {
        let mut state = self.state.lock().expect("wavefront lock poisoned");
        state.processed[idx] = true;
        state.remaining -= 1;

        let tile = self.grid.tiles[idx];
        for neighbor in [tile.left, tile.top, tile.right, tile.bottom] {
            if neighbor == NO_NEIGHBOR || state.enqueued[neighbor] {
                continue;
            }
            if self.prerequisites_met(&state, neighbor) {
                state.enqueued[neighbor] = true;
                state.queue.push_back(neighbor);
            }
        }
        self.ready.notify_all();
    }

    fn prerequisites_met(&self, state: &WavefrontState, idx: usize) -> bool {
        let tile = self.grid.tiles[idx];
        let (first, second) = if self.reverse {
            (tile.right, tile.bottom)
        } else {
            (tile.left, tile.top)
        };
        let done = |n: usize| n == NO_NEIGHBOR || state.processed[n];
        done(first) && done(second)
    }
}

/// Runs one iteration over the tile grid with one worker per pool thread.
#[cfg(feature = "rayon")]
pub(crate) fn run_parallel<P: Pixel>(
    ctx: &FieldCtx<'_, P>,
    grid: &TileGrid,
    reverse: bool,
    seed: u64,
) {
    let wavefront = Wavefront::new(grid, reverse);
    let workers = rayon::current_num_threads().max(1);
    let _span = wavefront_span(workers, grid.len());
    rayon::scope(|scope| {
        for worker in 0..workers {
            let wavefront = &wavefront;
            scope.spawn(move |_| {
                let mut rng = StdRng::seed_from_u64(
                    seed ^ (worker as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15),
                );
                while let Some(idx) = wavefront.next() {
                    process_span(ctx, wavefront.grid.tiles[idx].span, reverse, &mut rng);
                    wavefront.complete(idx);
                }
            });
        }
    });
}
