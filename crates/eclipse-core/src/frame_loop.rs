//! One frame: poll, advance, triangulate, color, draw, present, pace.

use std::time::{Duration, Instant};

use eclipse_platform::{DesktopSession, InputSource, RenderBackend, Result};
use glam::Vec2;
use tracing::{debug, info, trace};

use crate::gradient::Gradient;
use crate::mesh::{triangle_color, Triangulator};
use crate::pacer::FramePacer;
use crate::settings::Settings;
use crate::star::{spawn_stars, Bounds, MotionPolicy, RenderPolicy, Star, StarRng};

/// What one call to [`Starfield::render`] put on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub triangles: usize,
    pub stars_drawn: usize,
}

/// Stars plus everything needed to turn them into a frame.
pub struct Starfield {
    stars: Vec<Star>,
    viewport: Vec2,
    bounds: Bounds,
    gradient: Gradient,
    motion: MotionPolicy,
    render: RenderPolicy,
    triangulator: Triangulator,
    fan: Vec<Vec2>,
}

impl Starfield {
    pub fn new(settings: &Settings, viewport: Vec2, rng: &mut StarRng) -> Self {
        let bounds = Bounds::around_viewport(viewport, settings.offset_bounds);
        let stars = spawn_stars(&settings.spawn_params(), &bounds, rng);
        Self::from_stars(stars, settings, viewport)
    }

    pub fn from_stars(stars: Vec<Star>, settings: &Settings, viewport: Vec2) -> Self {
        let mut triangulator = Triangulator::with_capacity(stars.len());
        triangulator.load(stars.iter().map(|s| s.pos));
        Self {
            viewport,
            bounds: Bounds::around_viewport(viewport, settings.offset_bounds),
            gradient: settings.background_colors.clone(),
            motion: settings.motion_policy(),
            render: settings.render_policy(),
            triangulator,
            fan: Vec::new(),
            stars,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Move every star, steer targets back toward the bounds, and feed the
    /// new positions to the triangulator.
    pub fn advance(&mut self, dt: f32, pointer: Option<Vec2>) {
        for star in &mut self.stars {
            star.advance(dt, pointer, self.motion);
            star.correct_heading(&self.bounds);
        }
        self.triangulator.load(self.stars.iter().map(|s| s.pos));
    }

    /// Draw the gradient mesh, then the stars on top of it.
    pub fn render<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> Result<FrameReport> {
        let extent = self.bounds.gradient_extent();
        let triangles = match self.triangulator.triangulate() {
            Ok(mesh) => {
                for &triangle in &mesh.triangles {
                    let corners = mesh.corners(triangle);
                    let color = triangle_color(corners, &self.gradient, extent);
                    backend.fill_triangle_fan(&corners, color)?;
                }
                mesh.triangles.len()
            }
            Err(err) => {
                debug!("skipping mesh this frame: {err}");
                0
            }
        };

        let mut stars_drawn = 0;
        if let RenderPolicy::Disc { segments } = self.render {
            for star in &self.stars {
                star.disc_fan(segments, &mut self.fan);
                backend.fill_triangle_fan(&self.fan, star.color)?;
            }
            stars_drawn = self.stars.len();
        }

        Ok(FrameReport {
            triangles,
            stars_drawn,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminating,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    /// Frames drawn without a mesh.
    pub empty_meshes: u64,
}

/// Drives a [`Starfield`] against a backend until the input asks to stop.
pub struct FrameLoop<B, I> {
    starfield: Starfield,
    backend: B,
    input: I,
    pacer: FramePacer,
    state: LoopState,
    stats: FrameStats,
}

impl<B: RenderBackend, I: InputSource> FrameLoop<B, I> {
    pub fn new(starfield: Starfield, backend: B, input: I, pacer: FramePacer) -> Self {
        Self {
            starfield,
            backend,
            input,
            pacer,
            state: LoopState::Running,
            stats: FrameStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    /// One frame without pacing. Nothing is drawn once shutdown has been seen.
    pub fn tick(&mut self, dt: f32) -> Result<LoopState> {
        if self.state == LoopState::Terminating {
            return Ok(self.state);
        }
        if self.input.poll_shutdown() {
            info!("Shutdown requested after {} frames", self.stats.frames);
            self.state = LoopState::Terminating;
            return Ok(self.state);
        }

        let viewport = self.starfield.viewport();
        self.backend.clear()?;
        self.backend.set_projection(viewport.x, viewport.y)?;

        let pointer = self.input.pointer_position();
        self.starfield.advance(dt, pointer);
        let report = self.starfield.render(&mut self.backend)?;
        self.backend.present()?;

        self.stats.frames += 1;
        if report.triangles == 0 {
            self.stats.empty_meshes += 1;
        }
        Ok(self.state)
    }

    /// Run paced frames until shutdown. Returns the totals.
    pub fn run(&mut self) -> Result<FrameStats> {
        info!(
            "Frame loop starting: {} stars, {:.2} ms target interval",
            self.starfield.stars().len(),
            self.pacer.interval() * 1e3
        );
        let mut previous = Instant::now();
        while self.state == LoopState::Running {
            let frame_start = Instant::now();
            let dt = frame_start.duration_since(previous).as_secs_f32();
            previous = frame_start;

            if self.tick(dt)? == LoopState::Terminating {
                break;
            }

            let frame_time = frame_start.elapsed().as_secs_f32();
            let sleep = self.pacer.pace(frame_time);
            trace!(
                "frame {} took {:.3} ms, sleeping {} ms",
                self.stats.frames,
                frame_time * 1e3,
                sleep.as_millis()
            );
            if sleep > Duration::ZERO {
                std::thread::sleep(sleep);
            }
        }
        info!(
            "Frame loop finished: {} frames, {} without a mesh",
            self.stats.frames, self.stats.empty_meshes
        );
        Ok(self.stats)
    }

    /// Attach `session`, run until shutdown, then restore it.
    ///
    /// `restore` is called exactly once, also when attaching or a frame
    /// fails. `on_stop` sees the backend after a clean stop, before the
    /// desktop is handed back.
    pub fn run_attached<S, F>(&mut self, session: &mut S, on_stop: F) -> Result<FrameStats>
    where
        S: DesktopSession + ?Sized,
        F: FnOnce(&B, &FrameStats),
    {
        let outcome = session.attach().and_then(|()| self.run());
        if let Ok(stats) = &outcome {
            on_stop(&self.backend, stats);
        }
        let restored = session.restore();
        let stats = outcome?;
        restored?;
        Ok(stats)
    }
}
