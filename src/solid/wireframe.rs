// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;

/// A renderable line segment in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
}

/// Summary counters of a solid, suitable for status lines and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidStats {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
}

impl std::fmt::Display for SolidStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} vertices, {} edges, {} faces",
            self.vertices, self.edges, self.faces
        )
    }
}

impl Body {
    /// Flattens the solid into one line segment per edge, ready to be
    /// uploaded as a wireframe line list. Each edge contributes a single
    /// segment even though both of its halfedges are visited.
    #[profiling::function]
    pub fn generate_wireframe(&self) -> Result<Vec<LineSegment>> {
        let mut visited_edges = HashSet::new();
        let mut segments = Vec::with_capacity(self.edge_num());

        for face in self.faces()? {
            for l in self.face_loops(face)? {
                for h in self.loop_halfedges(l)? {
                    let edge = self.at_halfedge(h).edge().try_end()?;
                    if !visited_edges.insert(edge) {
                        continue;
                    }
                    let (src, dst) = self.at_halfedge(h).src_dst_pair()?;
                    segments.push(LineSegment {
                        start: self.at_vertex(src).point()?,
                        end: self.at_vertex(dst).point()?,
                    });
                }
            }
        }
        Ok(segments)
    }

    /// The rotation center a renderer orbits around: the average of all
    /// wireframe segment endpoints. Isolated vertices are not part of the
    /// rendered model and do not contribute. Origin for a body with no
    /// edges.
    pub fn centroid(&self) -> Result<Vec3> {
        let segments = self.generate_wireframe()?;
        if segments.is_empty() {
            return Ok(Vec3::ZERO);
        }
        let sum = segments
            .iter()
            .fold(Vec3::ZERO, |acc, s| acc + s.start + s.end);
        Ok(sum / (segments.len() * 2) as f32)
    }

    pub fn stats(&self) -> SolidStats {
        SolidStats {
            vertices: self.vertex_num(),
            edges: self.edge_num(),
            faces: self.face_num(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_triangle() -> EulerOps {
        let mut ops = EulerOps::new();
        let v0 = ops.mvfs(Vec3::ZERO);
        let body = ops.body().unwrap();
        let face = body.first_face().unwrap();
        let l = body.face_loops(face).unwrap()[0];
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        ops.mev(v0, v1, l).unwrap();
        let v2 = ops.new_vertex(Vec3::Y).unwrap();
        ops.mev(v1, v2, l).unwrap();
        ops
    }

    #[test]
    fn seed_body_has_an_empty_wireframe() {
        let mut ops = EulerOps::new();
        ops.mvfs(Vec3::ZERO);
        let segments = ops.body().unwrap().generate_wireframe().unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn each_edge_yields_one_segment() {
        let ops = wire_triangle();
        let body = ops.body().unwrap();
        let segments = body.generate_wireframe().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments.len(), body.edge_num());
        // Both wire edges hang off the path 0 -> X -> Y.
        assert!(segments
            .iter()
            .any(|s| (s.start, s.end) == (Vec3::ZERO, Vec3::X)
                || (s.start, s.end) == (Vec3::X, Vec3::ZERO)));
        assert!(segments
            .iter()
            .any(|s| (s.start, s.end) == (Vec3::X, Vec3::Y)
                || (s.start, s.end) == (Vec3::Y, Vec3::X)));
    }

    #[test]
    fn centroid_averages_wireframe_endpoints() {
        let mut ops = wire_triangle();
        // Two segments, four endpoints: 0->X and X->Y.
        let expected = (Vec3::ZERO + Vec3::X + Vec3::X + Vec3::Y) / 4.0;
        let centroid = ops.body().unwrap().centroid().unwrap();
        assert!(centroid.abs_diff_eq(expected, 1e-6));

        // An isolated vertex is not part of the rendered model and must
        // not pull the rotation center.
        ops.new_vertex(Vec3::splat(100.0)).unwrap();
        let centroid = ops.body().unwrap().centroid().unwrap();
        assert!(centroid.abs_diff_eq(expected, 1e-6));

        assert_eq!(Body::new().centroid().unwrap(), Vec3::ZERO);
    }

    #[test]
    fn stats_mirror_the_counters() {
        let ops = wire_triangle();
        let body = ops.body().unwrap();
        let stats = body.stats();
        assert_eq!(stats.vertices, 3);
        assert_eq!(stats.edges, 2);
        assert_eq!(stats.faces, 1);
        assert_eq!(stats.to_string(), "3 vertices, 2 edges, 1 faces");
    }
}
