//! Per-frame Delaunay mesh over star positions, and its background coloring.

use delaunator::Point;
use eclipse_platform::Rgba;
use glam::Vec2;

use crate::error::TriangulationError;
use crate::gradient::Gradient;

/// Triangles of one frame. Indices address `vertices`; nothing survives the frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec2>,
    pub triangles: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn corners(&self, triangle: [usize; 3]) -> [Vec2; 3] {
        triangle.map(|i| self.vertices[i])
    }

    pub fn area(&self) -> f32 {
        self.triangles
            .iter()
            .map(|&t| {
                let [a, b, c] = self.corners(t);
                (b - a).perp_dot(c - a).abs() * 0.5
            })
            .sum()
    }
}

/// Owns the point buffer handed to `delaunator` and the mesh it produces.
/// Both are reused across frames.
#[derive(Default)]
pub struct Triangulator {
    points: Vec<Point>,
    mesh: Mesh,
}

impl Triangulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(points: usize) -> Self {
        Self {
            points: Vec::with_capacity(points),
            mesh: Mesh {
                vertices: Vec::with_capacity(points),
                triangles: Vec::with_capacity(points * 2),
            },
        }
    }

    /// Replace the input point set.
    pub fn load<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec2>,
    {
        self.points.clear();
        self.points.extend(positions.into_iter().map(|p| Point {
            x: f64::from(p.x),
            y: f64::from(p.y),
        }));
    }

    /// Triangulate the loaded points. On error the mesh is left empty.
    pub fn triangulate(&mut self) -> Result<&Mesh, TriangulationError> {
        self.mesh.clear();
        if self.points.len() < 3 {
            return Err(TriangulationError::TooFewPoints(self.points.len()));
        }

        let triangulation = delaunator::triangulate(&self.points);
        if triangulation.triangles.is_empty() {
            return Err(TriangulationError::Degenerate(self.points.len()));
        }

        self.mesh
            .vertices
            .extend(self.points.iter().map(|p| Vec2::new(p.x as f32, p.y as f32)));
        self.mesh.triangles.extend(
            triangulation
                .triangles
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]]),
        );
        Ok(&self.mesh)
    }

    /// Last successful mesh, or an empty one.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

/// Gradient color for a triangle, keyed by its centroid height over `extent`.
/// The ratio is not clamped here; the gradient clamps it.
pub fn triangle_color(corners: [Vec2; 3], gradient: &Gradient, extent: f32) -> Rgba {
    let centroid_y = (corners[0].y + corners[1].y + corners[2].y) / 3.0;
    gradient.sample(centroid_y / extent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hull_area(points: &[Vec2]) -> f32 {
        // points given in hull order
        let n = points.len();
        (0..n)
            .map(|i| points[i].perp_dot(points[(i + 1) % n]))
            .sum::<f32>()
            .abs()
            * 0.5
    }

    #[test]
    fn square_yields_two_triangles() {
        let mut triangulator = Triangulator::new();
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        triangulator.load(square);
        let mesh = triangulator.triangulate().unwrap();
        assert_eq!(mesh.triangles.len(), 2);
        assert!((mesh.area() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn indices_stay_in_range_and_cover_the_hull() {
        let mut points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(200.0, 0.0),
            Vec2::new(260.0, 120.0),
            Vec2::new(100.0, 220.0),
            Vec2::new(-40.0, 120.0),
        ];
        let hull = hull_area(&points);
        points.extend([
            Vec2::new(100.0, 100.0),
            Vec2::new(50.0, 40.0),
            Vec2::new(150.0, 60.0),
            Vec2::new(120.0, 160.0),
        ]);

        let mut triangulator = Triangulator::with_capacity(points.len());
        triangulator.load(points.iter().copied());
        let mesh = triangulator.triangulate().unwrap();
        assert_eq!(mesh.vertices.len(), points.len());
        for t in &mesh.triangles {
            assert!(t.iter().all(|&i| i < mesh.vertices.len()));
        }
        assert!((mesh.area() - hull).abs() < hull * 1e-4);
    }

    #[test]
    fn duplicates_are_tolerated() {
        let mut triangulator = Triangulator::new();
        triangulator.load([
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(0.0, 5.0),
        ]);
        let mesh = triangulator.triangulate().unwrap();
        assert_eq!(mesh.triangles.len(), 1);
    }

    #[test]
    fn degenerate_inputs_produce_no_triangles() {
        let mut triangulator = Triangulator::new();

        triangulator.load([Vec2::ZERO, Vec2::ONE]);
        assert_eq!(
            triangulator.triangulate(),
            Err(TriangulationError::TooFewPoints(2))
        );
        assert!(triangulator.mesh().is_empty());

        triangulator.load((0..5).map(|i| Vec2::splat(i as f32)));
        assert_eq!(
            triangulator.triangulate(),
            Err(TriangulationError::Degenerate(5))
        );

        triangulator.load([Vec2::new(3.0, 3.0); 4]);
        assert!(triangulator.triangulate().is_err());
        assert!(triangulator.mesh().is_empty());
    }

    #[test]
    fn color_follows_centroid_height() {
        let gradient = Gradient::new(vec![Rgba::ZERO, Rgba::ONE]);
        let corners = [Vec2::new(0.0, 0.0), Vec2::new(3.0, 30.0), Vec2::new(6.0, 60.0)];
        let color = triangle_color(corners, &gradient, 120.0);
        assert!((color - Rgba::splat(0.25)).abs().max_element() < 1e-5);

        let below = [Vec2::new(0.0, 200.0), Vec2::new(1.0, 210.0), Vec2::new(2.0, 220.0)];
        assert_eq!(triangle_color(below, &gradient, 120.0), Rgba::ONE);
        let above = [Vec2::new(0.0, -50.0), Vec2::new(1.0, -40.0), Vec2::new(2.0, -60.0)];
        assert_eq!(triangle_color(above, &gradient, 120.0), Rgba::ZERO);
    }
}
