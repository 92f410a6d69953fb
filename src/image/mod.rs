pub mod sixel;

use std::sync::Arc;

/// A decoded raster image (currently only produced by the Sixel
/// subsystem; the iTerm2/Kitty inline-image protocols carry pre-encoded
/// pixel data the embedder decodes itself and hand back as one of
/// these). Reference-counted because one image can span many grid cells.
#[derive(Debug, PartialEq)]
pub struct RasterizedImage {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels.
    pub rgba: Vec<u8>,
}

/// A per-cell reference into a `RasterizedImage`: which pixel rectangle
/// of the source image this cell displays. `(0,0)` is the image's
/// top-left tile; cells covering the same image carry increasing
/// `tile_col`/`tile_row` so the renderer can slice the right rectangle
/// without re-deriving cell geometry from pixel geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFragment {
    pub image: Arc<RasterizedImage>,
    pub tile_col: u32,
    pub tile_row: u32,
    pub cell_width_px: u32,
    pub cell_height_px: u32,
}

/// Owns every image referenced by the currently live grid (both screens)
/// so that images scrolled out of history but still referenced by a
/// scrollback cell stay alive, and are dropped once the last cell
/// referencing them is overwritten or scrolled out of the retention
/// window.
#[derive(Debug, Default)]
pub struct ImagePool {
    next_id: u64,
    images: Vec<Arc<RasterizedImage>>,
}

impl ImagePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, width: u32, height: u32, rgba: Vec<u8>) -> Arc<RasterizedImage> {
        let id = self.next_id;
        self.next_id += 1;
        let img = Arc::new(RasterizedImage {
            id,
            width,
            height,
            rgba,
        });
        self.images.push(img.clone());
        img
    }

    /// Drops images with no external reference besides the pool's own
    /// bookkeeping copy (strong count 1). Called periodically by the
    /// facade after a scroll or an erase that may have dropped the only
    /// cell references to an image.
    pub fn collect_garbage(&mut self) -> usize {
        let before = self.images.len();
        self.images.retain(|img| Arc::strong_count(img) > 1);
        before - self.images.len()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_images_get_increasing_ids() {
        let mut pool = ImagePool::new();
        let a = pool.insert(1, 1, vec![0; 4]);
        let b = pool.insert(1, 1, vec![0; 4]);
        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
    }

    #[test]
    fn garbage_collection_drops_unreferenced_images() {
        let mut pool = ImagePool::new();
        let kept = pool.insert(1, 1, vec![0; 4]);
        let _dropped = pool.insert(1, 1, vec![0; 4]);
        let collected = pool.collect_garbage();
        assert_eq!(collected, 1);
        assert_eq!(pool.len(), 1);
        drop(kept);
    }
}
