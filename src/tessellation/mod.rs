//! Triangulation and Voronoi tessellation over the active point buffer

pub mod triangulation;
pub mod voronoi;

pub use triangulation::Triangulation;
pub use voronoi::Voronoi;

use crate::core::Result;
use crate::math::Rect;

/// Coordinate buffer, its triangulation, and a lazily built Voronoi diagram.
///
/// `revision` increases whenever the triangulation is rebuilt or updated; a
/// cached Voronoi diagram is dropped at the same time.
pub struct Tessellation {
    triangulation: Triangulation,
    bounds: Rect,
    voronoi: Option<Voronoi>,
    revision: u64,
}

impl Tessellation {
    /// Triangulate `coords`; the Voronoi diagram will be clipped to `bounds`.
    pub fn build(coords: Vec<f64>, bounds: Rect) -> Result<Self> {
        let triangulation = Triangulation::build(coords)?;
        log::debug!(
            "Built tessellation: {} points, {} triangles",
            triangulation.len(),
            triangulation.triangle_count()
        );
        Ok(Self {
            triangulation,
            bounds,
            voronoi: None,
            revision: 0,
        })
    }

    /// Replace the point set.
    ///
    /// Same point count: in-place update. Otherwise a new triangulation is
    /// allocated. On error nothing changes.
    pub fn set_points(&mut self, coords: Vec<f64>, bounds: Rect) -> Result<()> {
        if coords.len() == self.triangulation.coords().len() {
            self.triangulation.update(&coords)?;
            log::debug!("Updated tessellation in place: {} points", self.triangulation.len());
        } else {
            let previous = self.triangulation.len();
            self.triangulation = Triangulation::build(coords)?;
            log::debug!(
                "Rebuilt tessellation: {} -> {} points",
                previous,
                self.triangulation.len()
            );
        }

        self.bounds = bounds;
        self.voronoi = None;
        self.revision += 1;
        Ok(())
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// Flat `[x0, y0, x1, y1, ...]` buffer backing the triangulation
    pub fn coords(&self) -> &[f64] {
        self.triangulation.coords()
    }

    /// Clip bounds for the Voronoi diagram
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_voronoi_stale(&self) -> bool {
        self.voronoi.is_none()
    }

    /// Voronoi diagram, built on first access after each change
    pub fn voronoi(&mut self) -> &Voronoi {
        let triangulation = &self.triangulation;
        let bounds = self.bounds;
        self.voronoi.get_or_insert_with(|| {
            log::trace!("Building voronoi for {} points", triangulation.len());
            Voronoi::new(triangulation, bounds)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;

    fn ring(count: usize, radius: f64) -> Vec<f64> {
        let mut coords = Vec::with_capacity(count * 2 + 2);
        coords.extend([0.0, 0.0]);
        for i in 0..count {
            let angle = i as f64 / count as f64 * std::f64::consts::TAU + 0.1;
            coords.push(angle.cos() * radius);
            coords.push(angle.sin() * radius * 0.8);
        }
        coords
    }

    #[test]
    fn test_voronoi_lazy_and_invalidated() {
        let bounds = Rect::new(-20.0, 20.0, -20.0, 20.0);
        let mut tess = Tessellation::build(ring(7, 10.0), bounds).unwrap();
        assert!(tess.is_voronoi_stale());
        assert_eq!(tess.voronoi().len(), 8);
        assert!(!tess.is_voronoi_stale());

        tess.set_points(ring(7, 12.0), bounds).unwrap();
        assert!(tess.is_voronoi_stale());
        assert_eq!(tess.revision(), 1);
    }

    #[test]
    fn test_set_points_same_and_new_size() {
        let bounds = Rect::new(-20.0, 20.0, -20.0, 20.0);
        let mut tess = Tessellation::build(ring(7, 10.0), bounds).unwrap();

        tess.set_points(ring(7, 11.0), bounds).unwrap();
        assert_eq!(tess.coords().len(), 16);

        let wider = Rect::new(-30.0, 30.0, -30.0, 30.0);
        tess.set_points(ring(11, 11.0), wider).unwrap();
        assert_eq!(tess.coords().len(), 24);
        assert_eq!(tess.triangulation().len(), 12);
        assert_eq!(tess.bounds(), wider);
        assert_eq!(tess.voronoi().bounds(), wider);
        assert_eq!(tess.revision(), 2);
    }

    #[test]
    fn test_degenerate_keeps_previous() {
        let bounds = Rect::new(-20.0, 20.0, -20.0, 20.0);
        let mut tess = Tessellation::build(ring(7, 10.0), bounds).unwrap();
        tess.voronoi();

        let result = tess.set_points(vec![0.0, 0.0, 1.0, 1.0], bounds);
        assert!(matches!(result, Err(Error::DegenerateTessellation { points: 2 })));
        assert_eq!(tess.coords(), ring(7, 10.0).as_slice());
        assert_eq!(tess.revision(), 0);
        assert!(!tess.is_voronoi_stale());
    }
}
