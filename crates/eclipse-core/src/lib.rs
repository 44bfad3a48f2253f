//! Eclipse core: star simulation, per-frame Delaunay mesh, gradient coloring and frame pacing.
//!
//! Nothing here knows about windows or desktops; drawing and input go through
//! the traits in `eclipse-platform`.

pub mod error;
pub mod frame_loop;
pub mod gradient;
pub mod mesh;
pub mod pacer;
pub mod settings;
pub mod star;

pub use error::{SettingsError, TriangulationError};
pub use frame_loop::{FrameLoop, FrameReport, FrameStats, LoopState, Starfield};
pub use gradient::Gradient;
pub use mesh::{triangle_color, Mesh, Triangulator};
pub use pacer::{pace, FramePacer, Pace};
pub use settings::{Settings, StarSettings};
pub use star::{Bounds, MotionPolicy, RenderPolicy, Star, StarRng};
