use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eclipse_platform::{RenderBackend, Result, Rgba};
use glam::Vec2;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};
use tracing::{info, warn};

/// When presented frames are written to disk.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPolicy {
    pub dir: Option<PathBuf>,
    /// Write every n-th frame; `None` only writes on request.
    pub every: Option<u64>,
    /// Set from the shell to capture the next presented frame.
    pub requested: Arc<AtomicBool>,
}

/// Software rasterizer over a `tiny-skia` pixmap.
pub struct PixmapBackend {
    pixmap: Pixmap,
    transform: Transform,
    clear_color: Color,
    snapshots: SnapshotPolicy,
    frames: u64,
}

fn to_skia_color(color: Rgba) -> Color {
    let c = color.clamp(Rgba::ZERO, Rgba::ONE);
    Color::from_rgba(c.x, c.y, c.z, c.w).unwrap_or(Color::BLACK)
}

impl PixmapBackend {
    pub fn new(width: u32, height: u32, snapshots: SnapshotPolicy) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| format!("cannot allocate a {width}x{height} framebuffer"))?;
        Ok(Self {
            pixmap,
            transform: Transform::identity(),
            clear_color: Color::BLACK,
            snapshots,
            frames: 0,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Copy the framebuffer as top-down BGRA rows, the layout GDI DIBs expect.
    pub fn copy_bgra(&self, out: &mut Vec<u8>) {
        let data = self.pixmap.data();
        out.clear();
        out.reserve(data.len());
        for px in data.chunks_exact(4) {
            out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
        }
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.pixmap.save_png(path)?;
        Ok(())
    }

    /// Write the current framebuffer into the snapshot directory, if any.
    pub fn write_snapshot(&self) -> Result<Option<PathBuf>> {
        let Some(dir) = &self.snapshots.dir else {
            return Ok(None);
        };
        let path = dir.join(format!("frame-{:06}.png", self.frames));
        self.save_png(&path)?;
        info!("Wrote snapshot {}", path.display());
        Ok(Some(path))
    }

    fn snapshot_due(&self) -> bool {
        let requested = self.snapshots.requested.swap(false, Ordering::Relaxed);
        let periodic = self
            .snapshots
            .every
            .is_some_and(|n| n > 0 && self.frames % n == 0);
        requested || periodic
    }
}

impl RenderBackend for PixmapBackend {
    fn clear(&mut self) -> Result<()> {
        self.pixmap.fill(self.clear_color);
        Ok(())
    }

    fn set_projection(&mut self, width: f32, height: f32) -> Result<()> {
        if width <= 0.0 || height <= 0.0 {
            return Err(format!("degenerate projection {width}x{height}").into());
        }
        self.transform = Transform::from_scale(
            self.pixmap.width() as f32 / width,
            self.pixmap.height() as f32 / height,
        );
        Ok(())
    }

    /// The fan is filled as its outline polygon, which matches the fan for
    /// convex shapes like triangles and star discs.
    fn fill_triangle_fan(&mut self, vertices: &[Vec2], color: Rgba) -> Result<()> {
        let [first, rest @ ..] = vertices else {
            return Ok(());
        };
        if rest.len() < 2 {
            return Ok(());
        }

        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for v in rest {
            pb.line_to(v.x, v.y);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            // zero-area fans (e.g. collapsed triangles) have no path
            return Ok(());
        };

        let mut paint = Paint::default();
        paint.set_color(to_skia_color(color));
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.frames += 1;
        if self.snapshot_due() {
            if let Err(err) = self.write_snapshot() {
                warn!("snapshot of frame {} failed: {err}", self.frames);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(backend: &PixmapBackend, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let p = backend.pixmap().pixel(x, y).unwrap();
        (p.red(), p.green(), p.blue(), p.alpha())
    }

    #[test]
    fn clear_paints_opaque_black() {
        let mut backend = PixmapBackend::new(8, 8, SnapshotPolicy::default()).unwrap();
        backend.clear().unwrap();
        assert_eq!(pixel(&backend, 3, 3), (0, 0, 0, 255));
    }

    #[test]
    fn triangle_fills_through_projection() {
        let mut backend = PixmapBackend::new(200, 200, SnapshotPolicy::default()).unwrap();
        backend.clear().unwrap();
        backend.set_projection(100.0, 100.0).unwrap();
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        backend
            .fill_triangle_fan(
                &[Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0)],
                red,
            )
            .unwrap();
        // upper-right half is red in pixel space too
        assert_eq!(pixel(&backend, 180, 40), (255, 0, 0, 255));
        assert_eq!(pixel(&backend, 20, 160), (0, 0, 0, 255));
    }

    #[test]
    fn short_and_flat_fans_are_skipped() {
        let mut backend = PixmapBackend::new(4, 4, SnapshotPolicy::default()).unwrap();
        backend.clear().unwrap();
        let white = Rgba::ONE;
        backend
            .fill_triangle_fan(&[Vec2::ZERO, Vec2::ONE], white)
            .unwrap();
        backend
            .fill_triangle_fan(&[Vec2::ZERO, Vec2::ZERO, Vec2::ZERO], white)
            .unwrap();
        assert_eq!(pixel(&backend, 0, 0), (0, 0, 0, 255));
    }

    #[test]
    fn bgra_copy_swaps_red_and_blue() {
        let mut backend = PixmapBackend::new(2, 1, SnapshotPolicy::default()).unwrap();
        backend.clear().unwrap();
        backend
            .fill_triangle_fan(
                &[Vec2::new(1.0, -1.0), Vec2::new(3.0, -1.0), Vec2::new(3.0, 3.0), Vec2::new(1.0, 3.0)],
                Rgba::new(1.0, 0.0, 0.0, 1.0),
            )
            .unwrap();
        let mut bgra = Vec::new();
        backend.copy_bgra(&mut bgra);
        assert_eq!(bgra, vec![0, 0, 0, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn zero_sized_projection_is_an_error() {
        let mut backend = PixmapBackend::new(4, 4, SnapshotPolicy::default()).unwrap();
        assert!(backend.set_projection(0.0, 10.0).is_err());
    }

    #[test]
    fn periodic_snapshots_land_in_the_directory() {
        let dir = std::env::temp_dir().join(format!("eclipse-snapshots-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let policy = SnapshotPolicy {
            dir: Some(dir.clone()),
            every: Some(2),
            ..Default::default()
        };
        let requested = Arc::clone(&policy.requested);
        let mut backend = PixmapBackend::new(4, 4, policy).unwrap();

        for _ in 0..4 {
            backend.clear().unwrap();
            backend.present().unwrap();
        }
        assert!(dir.join("frame-000002.png").exists());
        assert!(dir.join("frame-000004.png").exists());
        assert!(!dir.join("frame-000003.png").exists());

        requested.store(true, Ordering::Relaxed);
        backend.present().unwrap();
        assert!(dir.join("frame-000005.png").exists());
        assert!(!requested.load(Ordering::Relaxed));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
