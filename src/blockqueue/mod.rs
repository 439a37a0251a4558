//! Provides a queue of image tiles for the estimator's worker
//! threads. The queue itself is not changed after creation, the
//! workers pull tiles through an atomic counter holding the index of
//! the next tile to work on.

use log::warn;
// std
use std::sync::atomic::{AtomicUsize, Ordering};

// see github/tray_rust/src/sampler/block_queue.rs

/// Pixel rectangle `[x0, x1) x [y0, y1)` of one tile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Tile {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Tile {
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> {
        let (x0, x1) = (self.x0, self.x1);
        (self.y0..self.y1).flat_map(move |y| (x0..x1).map(move |x| (x, y)))
    }
    pub fn area(&self) -> usize {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}

/// The queue of tiles to be worked on shared immutably between worker threads.
pub struct BlockQueue {
    /// Tile indices in Morton order
    blocks: Vec<(u32, u32)>,
    /// Size of a full tile in pixels
    block_dimensions: (u32, u32),
    image_dimensions: (u32, u32),
    /// Index of the next tile to be worked on
    next: AtomicUsize,
}

impl BlockQueue {
    /// Cover an image of `image` pixels with tiles of `block` pixels;
    /// tiles on the right and bottom border are cropped to the image.
    pub fn new(image: (u32, u32), block: (u32, u32)) -> BlockQueue {
        let block: (u32, u32) = (block.0.max(1), block.1.max(1));
        let num_blocks: (u32, u32) = (
            (image.0 + block.0 - 1) / block.0,
            (image.1 + block.1 - 1) / block.1,
        );
        let mut blocks: Vec<(u32, u32)> = (0..num_blocks.0 * num_blocks.1)
            .map(|i| (i % num_blocks.0, i / num_blocks.0))
            .collect();
        blocks.sort_by_key(|b| morton2(*b));
        if blocks.is_empty() {
            warn!("Block queue for {:?} is empty", image);
        }
        BlockQueue {
            blocks,
            block_dimensions: block,
            image_dimensions: image,
            next: AtomicUsize::new(0),
        }
    }
    pub fn block_dim(&self) -> (u32, u32) {
        self.block_dimensions
    }
    /// Get the next tile in the queue or None if the queue is finished
    pub fn next(&self) -> Option<Tile> {
        let i = self.next.fetch_add(1, Ordering::AcqRel);
        let (bx, by) = *self.blocks.get(i)?;
        let (w, h) = self.block_dimensions;
        Some(Tile {
            x0: (bx * w) as usize,
            y0: (by * h) as usize,
            x1: ((bx + 1) * w).min(self.image_dimensions.0) as usize,
            y1: ((by + 1) * h).min(self.image_dimensions.1) as usize,
        })
    }
    /// Get an iterator to work through the queue
    pub fn iter(&self) -> BlockQueueIterator {
        BlockQueueIterator { queue: self }
    }
    pub fn len(&self) -> usize {
        self.blocks.len()
    }
    /// Check if all tiles have been handed out
    pub fn is_empty(&self) -> bool {
        self.next.load(Ordering::Acquire) >= self.blocks.len()
    }
}

/// Iterator to work through the queue safely
pub struct BlockQueueIterator<'a> {
    queue: &'a BlockQueue,
}

impl<'a> Iterator for BlockQueueIterator<'a> {
    type Item = Tile;
    fn next(&mut self) -> Option<Tile> {
        self.queue.next()
    }
}

// see github/tray_rust/src/sampler/morton.rs

/// Insert a 0 bit between each of the low 16 bits of x
fn part1_by1(mut x: u32) -> u32 {
    // x = ---- ---- ---- ---- fedc ba98 7654 3210
    x &= 0x0000_ffff;
    // x = ---- ---- fedc ba98 ---- ---- 7654 3210
    x = (x ^ (x << 8)) & 0x00ff_00ff;
    // x = ---- fedc ---- ba98 ---- 7654 ---- 3210
    x = (x ^ (x << 4)) & 0x0f0f_0f0f;
    // x = --fe --dc --ba --98 --76 --54 --32 --10
    x = (x ^ (x << 2)) & 0x3333_3333;
    // x = -f-e -d-c -b-a -9-8 -7-6 -5-4 -3-2 -1-0
    (x ^ (x << 1)) & 0x5555_5555
}

/// Compute the Morton code for the `(x, y)` position.
fn morton2(p: (u32, u32)) -> u32 {
    (part1_by1(p.1) << 1) + part1_by1(p.0)
}
