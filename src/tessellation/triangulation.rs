//! Delaunay triangulation over a flat `[x0, y0, x1, y1, ...]` coordinate buffer

use delaunator::{next_halfedge, triangulate, Point, EMPTY};

use crate::core::{DVec2, Error, Result};

/// Delaunay triangulation plus a per-point neighbor index.
#[derive(Clone, Debug)]
pub struct Triangulation {
    coords: Vec<f64>,
    /// Flat vertex indices, three per triangle
    triangles: Vec<usize>,
    /// Opposite halfedge for each halfedge, `EMPTY` on the hull
    halfedges: Vec<usize>,
    hull: Vec<usize>,
    // CSR layout: neighbors of point i are
    // neighbor_indices[neighbor_offsets[i]..neighbor_offsets[i + 1]]
    neighbor_offsets: Vec<usize>,
    neighbor_indices: Vec<usize>,
}

impl Triangulation {
    /// Triangulate a fresh coordinate buffer.
    pub fn build(coords: Vec<f64>) -> Result<Self> {
        let raw = Self::triangulate(&coords)?;
        let mut triangulation = Self {
            coords,
            triangles: raw.triangles,
            halfedges: raw.halfedges,
            hull: raw.hull,
            neighbor_offsets: Vec::new(),
            neighbor_indices: Vec::new(),
        };
        triangulation.index_neighbors();
        Ok(triangulation)
    }

    /// Recompute in place from new coordinates, reusing this object's buffers.
    ///
    /// On error the previous triangulation is left untouched.
    pub fn update(&mut self, coords: &[f64]) -> Result<()> {
        let raw = Self::triangulate(coords)?;
        self.coords.clear();
        self.coords.extend_from_slice(coords);
        self.triangles = raw.triangles;
        self.halfedges = raw.halfedges;
        self.hull = raw.hull;
        self.index_neighbors();
        Ok(())
    }

    fn triangulate(coords: &[f64]) -> Result<delaunator::Triangulation> {
        debug_assert!(coords.len() % 2 == 0, "odd coordinate buffer length");
        let count = coords.len() / 2;
        if count < 3 {
            return Err(Error::DegenerateTessellation { points: count });
        }

        let points: Vec<Point> = coords
            .chunks_exact(2)
            .map(|c| Point { x: c[0], y: c[1] })
            .collect();
        let raw = triangulate(&points);

        // delaunator yields no triangles for collinear input
        if raw.triangles.is_empty() {
            return Err(Error::DegenerateTessellation { points: count });
        }
        Ok(raw)
    }

    fn index_neighbors(&mut self) {
        let count = self.len();

        // Every interior edge appears once in each direction; hull edges only
        // once, so they are recorded for both endpoints.
        let mut degree = vec![0usize; count];
        for e in 0..self.triangles.len() {
            degree[self.triangles[e]] += 1;
            if self.halfedges[e] == EMPTY {
                degree[self.triangles[next_halfedge(e)]] += 1;
            }
        }

        self.neighbor_offsets.clear();
        self.neighbor_offsets.reserve(count + 1);
        self.neighbor_offsets.push(0);
        let mut total = 0;
        for d in &degree {
            total += d;
            self.neighbor_offsets.push(total);
        }

        self.neighbor_indices.clear();
        self.neighbor_indices.resize(total, 0);
        let mut cursor: Vec<usize> = self.neighbor_offsets[..count].to_vec();
        for e in 0..self.triangles.len() {
            let a = self.triangles[e];
            let b = self.triangles[next_halfedge(e)];
            self.neighbor_indices[cursor[a]] = b;
            cursor[a] += 1;
            if self.halfedges[e] == EMPTY {
                self.neighbor_indices[cursor[b]] = a;
                cursor[b] += 1;
            }
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.coords.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn point(&self, i: usize) -> DVec2 {
        DVec2::new(self.coords[2 * i], self.coords[2 * i + 1])
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Flat triangle vertex indices
    pub fn triangle_indices(&self) -> &[usize] {
        &self.triangles
    }

    pub fn halfedges(&self) -> &[usize] {
        &self.halfedges
    }

    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.triangles.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Convex hull point indices
    pub fn hull(&self) -> &[usize] {
        &self.hull
    }

    /// Points sharing a triangle edge with point `i`
    pub fn neighbors(&self, i: usize) -> &[usize] {
        match (self.neighbor_offsets.get(i), self.neighbor_offsets.get(i + 1)) {
            (Some(&start), Some(&end)) => &self.neighbor_indices[start..end],
            _ => &[],
        }
    }

    /// Each undirected edge once, as point index pairs
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.triangles.len())
            .filter(move |&e| self.halfedges[e] > e)
            .map(move |e| (self.triangles[e], self.triangles[next_halfedge(e)]))
    }

    pub fn centroid(&self, t: usize) -> DVec2 {
        let a = self.point(self.triangles[3 * t]);
        let b = self.point(self.triangles[3 * t + 1]);
        let c = self.point(self.triangles[3 * t + 2]);
        (a + b + c) / 3.0
    }

    pub fn centroids(&self) -> Vec<DVec2> {
        (0..self.triangle_count()).map(|t| self.centroid(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x3 grid with small deterministic offsets so no four points are cocircular
    fn grid_coords() -> Vec<f64> {
        let mut coords = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                let wobble = ((row * 3 + col) as f64 * 0.37).sin() * 0.1;
                coords.push(col as f64 * 10.0 + wobble);
                coords.push(row as f64 * 10.0 - wobble * 0.5);
            }
        }
        coords
    }

    #[test]
    fn test_build_triangle_count() {
        let t = Triangulation::build(grid_coords()).unwrap();
        assert_eq!(t.len(), 9);
        // planar bound: 2n - 2 - h
        assert_eq!(t.triangle_count(), 2 * t.len() - 2 - t.hull().len());
        assert!(t.hull().len() >= 4);
    }

    #[test]
    fn test_too_few_points() {
        let result = Triangulation::build(vec![0.0, 0.0, 1.0, 1.0]);
        assert!(matches!(result, Err(Error::DegenerateTessellation { points: 2 })));
    }

    #[test]
    fn test_collinear_points() {
        let coords = vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        let result = Triangulation::build(coords);
        assert!(matches!(result, Err(Error::DegenerateTessellation { points: 4 })));
    }

    #[test]
    fn test_neighbors_symmetric() {
        let t = Triangulation::build(grid_coords()).unwrap();
        for i in 0..t.len() {
            assert!(!t.neighbors(i).is_empty());
            for &j in t.neighbors(i) {
                assert!(t.neighbors(j).contains(&i), "{} -> {} not mirrored", i, j);
            }
        }
        // center point touches every other point of the 3x3 grid but at most 8
        assert!(t.neighbors(4).len() >= 4);
        assert!(t.neighbors(99).is_empty());
    }

    #[test]
    fn test_edges_unique() {
        let t = Triangulation::build(grid_coords()).unwrap();
        let edges: Vec<_> = t.edges().collect();
        // Euler: E = 3n - 3 - h
        assert_eq!(edges.len(), 3 * t.len() - 3 - t.hull().len());
        let total_degree: usize = (0..t.len()).map(|i| t.neighbors(i).len()).sum();
        assert_eq!(total_degree, 2 * edges.len());
    }

    #[test]
    fn test_update_in_place() {
        let mut t = Triangulation::build(grid_coords()).unwrap();
        let shifted: Vec<f64> = grid_coords().iter().map(|v| v + 100.0).collect();
        t.update(&shifted).unwrap();
        assert_eq!(t.coords(), shifted.as_slice());
        assert_eq!(t.triangle_count(), 2 * t.len() - 2 - t.hull().len());
    }

    #[test]
    fn test_failed_update_keeps_previous() {
        let mut t = Triangulation::build(grid_coords()).unwrap();
        let before = t.triangle_indices().to_vec();
        assert!(t.update(&[0.0, 0.0, 1.0, 0.0, 2.0, 0.0]).is_err());
        assert_eq!(t.triangle_indices(), before.as_slice());
        assert_eq!(t.coords(), grid_coords().as_slice());
    }

    #[test]
    fn test_single_triangle_centroid() {
        let t = Triangulation::build(vec![0.0, 0.0, 4.0, 0.0, 0.0, 3.0]).unwrap();
        assert_eq!(t.triangle_count(), 1);
        let centroid = t.centroids()[0];
        assert!((centroid - DVec2::new(4.0 / 3.0, 1.0)).length() < 1e-9);
    }
}
