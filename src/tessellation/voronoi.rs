//! Voronoi diagram derived from a triangulation, clipped to a rectangle

use voronoice::{BoundingBox, ClipBehavior, Point, VoronoiBuilder};

use super::triangulation::Triangulation;
use crate::core::DVec2;
use crate::math::Rect;

/// Voronoi cells for every triangulation point, clipped to `bounds`.
///
/// Sites on or outside the bounds are left out of the diagram and own no cell.
#[derive(Clone, Debug)]
pub struct Voronoi {
    bounds: Rect,
    circumcenters: Vec<DVec2>,
    /// Convex cell polygon per point; empty when the cell misses the bounds
    cells: Vec<Vec<DVec2>>,
}

impl Voronoi {
    pub fn new(triangulation: &Triangulation, bounds: Rect) -> Self {
        let mut cells = vec![Vec::new(); triangulation.len()];

        // Diagram site k is triangulation point inside[k].
        let inside: Vec<usize> = (0..triangulation.len())
            .filter(|&i| bounds.interior_contains(triangulation.point(i)))
            .collect();
        let sites: Vec<Point> = inside
            .iter()
            .map(|&i| {
                let p = triangulation.point(i);
                Point { x: p.x, y: p.y }
            })
            .collect();

        let center = bounds.center();
        let diagram = (sites.len() >= 3)
            .then(|| {
                VoronoiBuilder::default()
                    .set_sites(sites)
                    .set_bounding_box(BoundingBox::new(
                        Point { x: center.x, y: center.y },
                        bounds.width(),
                        bounds.height(),
                    ))
                    .set_clip_behavior(ClipBehavior::Clip)
                    .build()
            })
            .flatten();

        let Some(diagram) = diagram else {
            log::debug!(
                "No voronoi diagram: {} of {} sites inside bounds",
                inside.len(),
                triangulation.len()
            );
            return Self {
                bounds,
                circumcenters: Vec::new(),
                cells,
            };
        };

        for cell in diagram.iter_cells() {
            let Some(&index) = inside.get(cell.site()) else {
                continue;
            };
            let polygon: Vec<DVec2> = cell
                .iter_vertices()
                .map(|v| DVec2::new(v.x, v.y))
                .collect();
            if polygon.len() >= 3 {
                cells[index] = polygon;
            }
        }

        // Leading vertices are the circumcenters, one per diagram triangle.
        let triangle_count = diagram.triangulation().triangles.len() / 3;
        let circumcenters = diagram
            .vertices()
            .iter()
            .take(triangle_count)
            .map(|v| DVec2::new(v.x, v.y))
            .collect();

        Self {
            bounds,
            circumcenters,
            cells,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Number of cells (one per point)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Voronoi vertices, one per Delaunay triangle of the in-bounds sites
    pub fn circumcenters(&self) -> &[DVec2] {
        &self.circumcenters
    }

    /// Clipped polygon of cell `i`, if it intersects the bounds
    pub fn cell_polygon(&self, i: usize) -> Option<&[DVec2]> {
        self.cells
            .get(i)
            .filter(|cell| cell.len() >= 3)
            .map(|cell| cell.as_slice())
    }

    /// Non-empty cells with their point index
    pub fn cells(&self) -> impl Iterator<Item = (usize, &[DVec2])> {
        (0..self.cells.len()).filter_map(move |i| self.cell_polygon(i).map(|cell| (i, cell)))
    }

    /// Check if `p` lies inside cell `i` (edges inclusive)
    pub fn contains(&self, i: usize, p: DVec2) -> bool {
        let Some(cell) = self.cell_polygon(i) else {
            return false;
        };

        let mut sign = 0.0;
        for (k, &a) in cell.iter().enumerate() {
            let b = cell[(k + 1) % cell.len()];
            let cross = (b - a).perp_dot(p - a);
            if cross == 0.0 {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }
}
