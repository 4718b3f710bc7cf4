// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;

/// The outcome of [`Body::validate`]. Every broken invariant produces one
/// human-readable entry, so a single run reports all problems at once.
#[derive(Debug, Default, Clone)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "valid body")
        } else {
            writeln!(f, "{} invariant violations:", self.errors.len())?;
            for err in &self.errors {
                writeln!(f, "  - {err}")?;
            }
            Ok(())
        }
    }
}

impl Body {
    /// Cross-checks the full connectivity graph and the redundant counters.
    /// Cheap enough to run after every operator in tests; production code
    /// typically runs it only behind a debug flag.
    #[profiling::function]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        self.validate_halfedges(&mut result);
        self.validate_edges(&mut result);
        self.validate_vertices(&mut result);
        self.validate_face_list(&mut result);
        self.validate_counters(&mut result);
        result
    }

    fn validate_halfedges(&self, result: &mut ValidationResult) {
        for (h, he) in self.iter_halfedges() {
            // Twin involution and endpoint mirroring.
            match he.twin().and_then(|t| self.halfedge(t).map(|he_t| (t, he_t))) {
                None => result
                    .errors
                    .push(format!("halfedge {h:?} has no valid twin")),
                Some((t, he_t)) => {
                    if he_t.twin() != Some(h) {
                        result
                            .errors
                            .push(format!("twin of {h:?} points back at {:?}", he_t.twin()));
                    }
                    if he_t.src() != he.dst() || he_t.dst() != he.src() {
                        result.errors.push(format!(
                            "halfedge {h:?} and twin {t:?} do not mirror endpoints"
                        ));
                    }
                }
            }

            // next/prev coherence.
            match he.next().and_then(|n| self.halfedge(n)) {
                None => result
                    .errors
                    .push(format!("halfedge {h:?} has no valid next")),
                Some(he_n) => {
                    if he_n.prev() != Some(h) {
                        result
                            .errors
                            .push(format!("prev of next({h:?}) is {:?}", he_n.prev()));
                    }
                }
            }

            if he.loop_id().and_then(|l| self.lp(l)).is_none() {
                result
                    .errors
                    .push(format!("halfedge {h:?} has no valid loop"));
            }
        }

        // Every halfedge must be reachable by walking the loop it claims,
        // and everything a loop walk visits must claim that loop.
        let mut reached = 0;
        for (l, lp) in self.iter_loops() {
            if lp.halfedge().is_none() {
                if !self.edges.is_empty() {
                    result
                        .errors
                        .push(format!("loop {l:?} is empty in a body with edges"));
                }
                continue;
            }
            match self.loop_halfedges(l) {
                Err(err) => result
                    .errors
                    .push(format!("loop {l:?} does not close: {err}")),
                Ok(cycle) => {
                    for h in cycle.iter_cpy() {
                        if self.halfedge(h).and_then(|he| he.loop_id()) != Some(l) {
                            result
                                .errors
                                .push(format!("halfedge {h:?} walked in {l:?} but claims another loop"));
                        }
                    }
                    reached += cycle.len();
                }
            }
            if lp.face().and_then(|f| self.face(f)).is_none() {
                result.errors.push(format!("loop {l:?} has no valid face"));
            }
        }
        if reached != self.halfedges.len() {
            result.errors.push(format!(
                "{} halfedges allocated but {reached} reachable through loops",
                self.halfedges.len()
            ));
        }
    }

    fn validate_edges(&self, result: &mut ValidationResult) {
        for (e, edge) in self.iter_edges() {
            let (he0, he1) = edge.halfedges();
            let twins_pair = self.halfedge(he0).map(|he| he.twin()) == Some(Some(he1))
                && self.halfedge(he1).map(|he| he.twin()) == Some(Some(he0));
            if !twins_pair {
                result
                    .errors
                    .push(format!("edge {e:?} does not own a twin halfedge pair"));
            }
            for h in [he0, he1] {
                if self.halfedge(h).map(|he| he.edge()) != Some(Some(e)) {
                    result
                        .errors
                        .push(format!("halfedge {h:?} does not point back at edge {e:?}"));
                }
            }
        }
    }

    fn validate_vertices(&self, result: &mut ValidationResult) {
        for (v, vertex) in self.iter_vertices() {
            if let Some(h) = vertex.halfedge() {
                if self.halfedge(h).and_then(|he| he.src()) != Some(v) {
                    result.errors.push(format!(
                        "vertex {v:?} points at halfedge {h:?} which does not leave it"
                    ));
                }
            }
        }
    }

    fn validate_face_list(&self, result: &mut ValidationResult) {
        match self.faces() {
            Err(err) => result.errors.push(format!("broken face list: {err}")),
            Ok(listed) => {
                if listed.len() != self.faces.len() {
                    result.errors.push(format!(
                        "{} faces allocated but {} on the face list",
                        self.faces.len(),
                        listed.len()
                    ));
                }
                for f in listed.iter_cpy() {
                    if let Err(err) = self.face_loops(f) {
                        result
                            .errors
                            .push(format!("broken loop list of face {f:?}: {err}"));
                    }
                }
            }
        }
    }

    fn validate_counters(&self, result: &mut ValidationResult) {
        if self.edge_num != self.edges.len() {
            result.errors.push(format!(
                "edge_num is {} but {} edges are allocated",
                self.edge_num,
                self.edges.len()
            ));
        }

        // Faces stay allocated after kfmrh empties them; only faces that
        // still own a loop count.
        let live_faces = self
            .iter_faces()
            .filter(|(_, face)| face.first_loop().is_some())
            .count();
        if self.face_num != live_faces {
            result.errors.push(format!(
                "face_num is {} but {live_faces} faces own a loop",
                self.face_num
            ));
        }

        // A vertex counts once it is referenced by a halfedge. The seeded
        // vertex of a body with no edges yet counts too.
        let referenced = self
            .iter_halfedges()
            .flat_map(|(_, he)| [he.src(), he.dst()])
            .flatten()
            .unique()
            .count();
        let expected = if self.halfedges.is_empty() {
            self.vertices.len().min(1)
        } else {
            referenced
        };
        if self.vertex_num != expected {
            result.errors.push(format!(
                "vertex_num is {} but {expected} vertices are part of the solid",
                self.vertex_num
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_seeded_bodies_are_valid() {
        assert!(Body::new().validate().is_valid());

        let mut ops = EulerOps::new();
        ops.mvfs(Vec3::ZERO);
        let result = ops.body().unwrap().validate();
        assert!(result.is_valid(), "{result}");
        assert_eq!(result.to_string(), "valid body");
    }

    #[test]
    fn detects_a_broken_counter() {
        let mut ops = EulerOps::new();
        ops.mvfs(Vec3::ZERO);
        let mut body = ops.take_body().unwrap();
        body.vertex_num = 7;
        let result = body.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("vertex_num")));
    }

    #[test]
    fn detects_a_severed_cycle() {
        let mut ops = EulerOps::new();
        let v0 = ops.mvfs(Vec3::ZERO);
        let body = ops.body().unwrap();
        let face = body.first_face().unwrap();
        let l = body.face_loops(face).unwrap()[0];
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        let he = ops.mev(v0, v1, l).unwrap();

        let mut body = ops.take_body().unwrap();
        body[he].next = None;
        let result = body.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("no valid next") || e.contains("does not close")));
    }

    #[test]
    fn detects_a_mismatched_twin() {
        let mut ops = EulerOps::new();
        let v0 = ops.mvfs(Vec3::ZERO);
        let body = ops.body().unwrap();
        let face = body.first_face().unwrap();
        let l = body.face_loops(face).unwrap()[0];
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        let he = ops.mev(v0, v1, l).unwrap();

        let mut body = ops.take_body().unwrap();
        body[he].twin = Some(he);
        let result = body.validate();
        assert!(!result.is_valid());
    }
}
