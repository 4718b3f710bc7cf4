// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;

/// The Euler operator engine. Owns at most one [`Body`] and exposes the
/// five classical Euler operators as the only legal way to mutate it.
///
/// Every operator either performs a complete, invariant-preserving edit or
/// fails without touching the body: all fallible searches run before the
/// first allocation, and relinking only starts once it is guaranteed to
/// complete.
///
/// One engine handles one solid at a time. Calling [`EulerOps::mvfs`]
/// discards the current body; use [`EulerOps::take_body`] first if the old
/// solid should survive.
#[derive(Debug, Default)]
pub struct EulerOps {
    body: Option<Body>,
}

impl EulerOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the current solid, if any.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Detaches and returns the current solid, leaving the engine empty.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    fn body_mut(&mut self) -> Result<&mut Body> {
        self.body
            .as_mut()
            .ok_or_else(|| anyhow!("no active body: call mvfs first"))
    }

    /// Make-Vertex-Face-Solid. Seeds the minimal valid solid: one vertex at
    /// `point`, one face owning a single empty loop, counts {vertex: 1,
    /// edge: 0, face: 1}. Any previously owned body is dropped.
    pub fn mvfs(&mut self, point: Vec3) -> VertexId {
        if self.body.take().is_some() {
            log::debug!("mvfs: discarding previous body");
        }

        let mut body = Body::new();
        let v = body.alloc_vertex(point, None);
        let face = body.alloc_face();
        let l = body.alloc_loop(Some(face));
        body[face].first_loop = Some(l);
        body.first_face = Some(face);
        body.vertex_num = 1;
        body.edge_num = 0;
        body.face_num = 1;
        self.body = Some(body);

        log::debug!("mvfs: seeded solid with vertex {v:?} at {point}");
        v
    }

    /// Make-Edge-Vertex. Inserts a new edge between the existing vertices
    /// `v0` and `v1` into the boundary of `l`, and returns the halfedge
    /// directed v0 → v1.
    ///
    /// If `l` is empty the two twin halfedges become its entire boundary (a
    /// 2-cycle). Otherwise the new pair is spliced in right after a
    /// halfedge of `l` ending at `v0`; if no such halfedge exists the call
    /// fails and nothing is allocated.
    ///
    /// `edge_num` increments. `vertex_num` increments only when `v1` was
    /// still isolated: that is the moment the vertex enters the solid. An
    /// internal `mev` issued by [`EulerOps::mef`] between two vertices that
    /// are already part of the boundary therefore leaves the vertex count
    /// alone, keeping it equal to what a traversal finds.
    pub fn mev(&mut self, v0: VertexId, v1: VertexId, l: LoopId) -> Result<HalfEdgeId> {
        let body = self.body_mut()?;

        // --- Validate arguments ---
        if body.vertex(v0).is_none() {
            bail!("mev: vertex {v0:?} is not part of this body");
        }
        let v1_was_isolated = match body.vertex(v1) {
            Some(vertex) => vertex.halfedge.is_none(),
            None => bail!("mev: vertex {v1:?} is not part of this body"),
        };
        let head = body
            .lp(l)
            .ok_or_else(|| anyhow!("mev: loop {l:?} is not part of this body"))?
            .halfedge;

        // --- Find the splice point ---
        // Done before allocating so a failed search is a clean no-op.
        let splice = match head {
            None => {
                log::trace!("mev: loop {l:?} is empty, the new edge becomes its boundary");
                None
            }
            Some(_) => {
                let after = body.at_loop(l).halfedge_ending_at(v0).try_end()?;
                let before = body.at_halfedge(after).next().try_end()?;
                log::trace!("mev: splicing after {after:?}");
                Some((after, before))
            }
        };

        // --- Allocate ---
        let he0 = body.alloc_halfedge(HalfEdge {
            src: Some(v0),
            dst: Some(v1),
            loop_: Some(l),
            ..Default::default()
        });
        let he1 = body.alloc_halfedge(HalfEdge {
            src: Some(v1),
            dst: Some(v0),
            loop_: Some(l),
            ..Default::default()
        });
        let edge = body.alloc_edge(he0, he1);
        body[he0].edge = Some(edge);
        body[he1].edge = Some(edge);
        body[he0].twin = Some(he1);
        body[he1].twin = Some(he0);

        // --- Fix connectivity ---
        match splice {
            None => {
                body[he0].next = Some(he1);
                body[he0].prev = Some(he1);
                body[he1].next = Some(he0);
                body[he1].prev = Some(he0);
                body[l].halfedge = Some(he0);
            }
            Some((after, before)) => {
                body[he0].prev = Some(after);
                body[he0].next = Some(he1);
                body[he1].prev = Some(he0);
                body[he1].next = Some(before);
                body[after].next = Some(he0);
                body[before].prev = Some(he1);
            }
        }
        body[v0].halfedge = Some(he0);
        body[v1].halfedge = Some(he1);

        body.edge_num += 1;
        if v1_was_isolated {
            body.vertex_num += 1;
        }

        log::debug!("mev: created edge {edge:?} between {v0:?} and {v1:?}");
        Ok(he0)
    }

    /// Make-Edge-Face. Splits `l` in two at the edge joining `v0` and `v1`,
    /// moving one of the resulting cycles into a brand new face. If the
    /// loop has no halfedge directed v0 → v1 yet, one is created with an
    /// internal [`EulerOps::mev`].
    ///
    /// Returns the new loop. Its face sits at the head of the body's face
    /// list. `face_num` increments; `edge_num` only changes if the internal
    /// `mev` ran.
    pub fn mef(&mut self, v0: VertexId, v1: VertexId, l: LoopId) -> Result<LoopId> {
        {
            let body = self.body_mut()?;
            if body.vertex(v0).is_none() {
                bail!("mef: vertex {v0:?} is not part of this body");
            }
            if body.vertex(v1).is_none() {
                bail!("mef: vertex {v1:?} is not part of this body");
            }
            if body.lp(l).is_none() {
                bail!("mef: loop {l:?} is not part of this body");
            }
        }

        // --- Locate the dividing halfedge, creating it if needed ---
        let found = {
            let body = self.body_mut()?;
            match body.at_loop(l).halfedge_between(v0, v1).try_end() {
                Ok(h) => Some(h),
                Err(TraversalError::NoHalfEdgeBetween(..)) | Err(TraversalError::LoopIsEmpty(_)) => {
                    None
                }
                Err(err) => return Err(err.into()),
            }
        };
        let target = match found {
            Some(h) => h,
            None => {
                log::trace!("mef: no halfedge {v0:?} -> {v1:?} in {l:?}, calling mev");
                self.mev(v0, v1, l)?
            }
        };

        let body = self.body_mut()?;

        // --- Collect handles ---
        let twin = body.at_halfedge(target).twin().try_end()?;
        if body[twin].loop_ != Some(l) {
            bail!("mef: the twin of {target:?} lies outside loop {l:?}");
        }
        // Walking the full cycle up front also proves it is well formed, so
        // the relinking below cannot get stuck halfway.
        let cycle_len = body.at_loop(l).halfedges()?.len();
        let t_prev = body.at_halfedge(target).prev().try_end()?;
        let o_prev = body.at_halfedge(twin).prev().try_end()?;

        // --- Allocate the new face and loop ---
        let new_face = body.alloc_face();
        let new_loop = body.alloc_loop(Some(new_face));
        body[new_face].first_loop = Some(new_loop);
        if let Some(old_head) = body.first_face {
            body[new_face].next_face = Some(old_head);
            body[old_head].prev_face = Some(new_face);
        }
        body.first_face = Some(new_face);

        // --- Fix connectivity ---
        // The edge's own links are the cut point: closing each chain onto
        // its own side of the edge bisects the cycle into two cycles.
        body[o_prev].next = Some(target);
        body[target].prev = Some(o_prev);
        body[t_prev].next = Some(twin);
        body[twin].prev = Some(t_prev);

        // Heads come from the post-split successors, so each lands in its
        // own cycle.
        body[l].halfedge = body[target].next;
        body[new_loop].halfedge = body[twin].next;

        // Everything on the twin's side now belongs to the new loop.
        let mut h = twin;
        for _ in 0..=cycle_len {
            body[h].loop_ = Some(new_loop);
            h = body
                .at_halfedge(h)
                .next()
                .try_end()
                .map_err(|err| anyhow!("mef: split produced a broken cycle: {err}"))?;
            if h == twin {
                break;
            }
        }

        body.face_num += 1;

        log::debug!("mef: split {l:?}, new loop {new_loop:?} in face {new_face:?}");
        Ok(new_loop)
    }

    /// Kill-Edge-Make-Ring. Removes the edge joining `v0` and `v1` from `l`
    /// and turns the halfedge chain it cut off into a new inner loop (ring)
    /// of the same face. Returns the ring.
    ///
    /// Both halfedges of the doomed edge must belong to `l`, and removing
    /// them must leave two non-empty cycles; otherwise the call fails with
    /// the body untouched. `edge_num` decrements, floored at zero.
    pub fn kemr(&mut self, v0: VertexId, v1: VertexId, l: LoopId) -> Result<LoopId> {
        let body = self.body_mut()?;

        // --- Validate arguments ---
        if body.vertex(v0).is_none() {
            bail!("kemr: vertex {v0:?} is not part of this body");
        }
        if body.vertex(v1).is_none() {
            bail!("kemr: vertex {v1:?} is not part of this body");
        }
        if body.lp(l).is_none() {
            bail!("kemr: loop {l:?} is not part of this body");
        }

        // --- Collect handles ---
        let target = body.at_loop(l).halfedge_joining(v0, v1).try_end()?;
        let twin = body.at_halfedge(target).twin().try_end()?;
        if body[twin].loop_ != Some(l) {
            bail!("kemr: the twin of {target:?} lies outside loop {l:?}; kemr cannot form a ring");
        }
        let edge = body.at_halfedge(target).edge().try_end()?;
        let face = body.at_loop(l).face().try_end()?;
        let (a, b) = body.at_halfedge(target).src_dst_pair()?;

        // Proves the cycle is closed before any relinking happens.
        let cycle_len = body.at_loop(l).halfedges()?.len();

        let t_prev = body.at_halfedge(target).prev().try_end()?;
        let t_next = body.at_halfedge(target).next().try_end()?;
        let o_prev = body.at_halfedge(twin).prev().try_end()?;
        let o_next = body.at_halfedge(twin).next().try_end()?;

        // Removing the edge must leave a closed cycle on both sides.
        if t_next == twin || o_next == target {
            bail!("kemr: removing {edge:?} from {l:?} would not leave a ring behind");
        }

        // --- Fix connectivity ---
        // Bridge the gap in the outer loop and close the detached ring.
        body[t_prev].next = Some(o_next);
        body[o_next].prev = Some(t_prev);
        body[o_prev].next = Some(t_next);
        body[t_next].prev = Some(o_prev);

        // The endpoint vertices must not keep pointing at the halfedges
        // that die with the edge.
        if body[a].halfedge == Some(target) || body[a].halfedge == Some(twin) {
            body[a].halfedge = Some(o_next);
        }
        if body[b].halfedge == Some(target) || body[b].halfedge == Some(twin) {
            body[b].halfedge = Some(t_next);
        }

        // --- Form the ring ---
        // Seeded at the twin's former predecessor, as inherited convention.
        let ring = body.alloc_loop(Some(face));
        body[ring].halfedge = Some(o_prev);
        let old_head = body[face].first_loop;
        body[ring].next_loop = old_head;
        if let Some(old_head) = old_head {
            body[old_head].prev_loop = Some(ring);
        }
        body[face].first_loop = Some(ring);

        let mut h = o_prev;
        for _ in 0..=cycle_len {
            body[h].loop_ = Some(ring);
            h = body
                .at_halfedge(h)
                .next()
                .try_end()
                .map_err(|err| anyhow!("kemr: detached ring is not closed: {err}"))?;
            if h == o_prev {
                break;
            }
        }

        // The outer loop head must survive on the outer side: it may have
        // been the dying halfedge itself, or a halfedge that just moved
        // into the ring. `t_prev` is always on the outer side.
        let head = body[l]
            .halfedge
            .ok_or_else(|| anyhow!("kemr: loop {l:?} lost its head"))?;
        if head == target || head == twin || body[head].loop_ == Some(ring) {
            body[l].halfedge = Some(t_prev);
        }

        // --- Remove the edge ---
        body.delete_edge(edge);
        body.edge_num = body.edge_num.saturating_sub(1);

        log::debug!("kemr: killed edge {edge:?}, ring {ring:?} in face {face:?}");
        Ok(ring)
    }

    /// Kill-Face-Make-Ring-Hole. Re-parents `l` from its current face into
    /// `out_loop`'s face as an inner loop, used when two previously
    /// separate faces merge so that one boundary becomes a hole inside the
    /// other's face.
    ///
    /// A no-op when both loops already share a face. The face `l` leaves is
    /// not deleted even if it ends up loop-less; cleaning it up is the
    /// caller's responsibility. `face_num` decrements, floored at zero.
    pub fn kfmrh(&mut self, out_loop: LoopId, l: LoopId) -> Result<()> {
        let body = self.body_mut()?;

        // --- Validate arguments ---
        let dst_face = body.at_loop(out_loop).face().try_end()?;
        let src_face = body.at_loop(l).face().try_end()?;
        if dst_face == src_face {
            log::trace!("kfmrh: {out_loop:?} and {l:?} already share {dst_face:?}, nothing to do");
            return Ok(());
        }

        // --- Fix connectivity ---
        // Detach from the old face's loop list.
        let prev = body[l].prev_loop;
        let next = body[l].next_loop;
        if let Some(prev) = prev {
            body[prev].next_loop = next;
        }
        if let Some(next) = next {
            body[next].prev_loop = prev;
        }
        if body[src_face].first_loop == Some(l) {
            body[src_face].first_loop = next;
        }

        // Insert at the head of the destination face's loop list.
        let old_head = body[dst_face].first_loop;
        body[l].face = Some(dst_face);
        body[l].prev_loop = None;
        body[l].next_loop = old_head;
        if let Some(old_head) = old_head {
            body[old_head].prev_loop = Some(l);
        }
        body[dst_face].first_loop = Some(l);

        body.face_num = body.face_num.saturating_sub(1);

        log::debug!("kfmrh: loop {l:?} became a ring of face {dst_face:?}");
        Ok(())
    }

    /// Allocates a new isolated vertex at `point` in the current body. The
    /// vertex only becomes part of the solid (and part of `vertex_num`)
    /// once a [`EulerOps::mev`] links it in.
    pub fn new_vertex(&mut self, point: Vec3) -> Result<VertexId> {
        let body = self.body_mut()?;
        Ok(body.alloc_vertex(point, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Seeds a solid and returns the engine plus the ids of the seed
    /// vertex, face and (empty) loop.
    fn seeded() -> (EulerOps, VertexId, FaceId, LoopId) {
        let mut ops = EulerOps::new();
        let v0 = ops.mvfs(Vec3::ZERO);
        let body = ops.body().unwrap();
        let face = body.first_face().unwrap();
        let l = body[face].first_loop().unwrap();
        (ops, v0, face, l)
    }

    /// Builds a square boundary v0 -> v1 -> v2 -> v3 in the seed loop.
    fn square() -> (EulerOps, [VertexId; 4], LoopId) {
        let (mut ops, v0, _, l) = seeded();
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        let v2 = ops.new_vertex(Vec3::new(1.0, 1.0, 0.0)).unwrap();
        let v3 = ops.new_vertex(Vec3::Y).unwrap();
        ops.mev(v0, v1, l).unwrap();
        ops.mev(v1, v2, l).unwrap();
        ops.mev(v2, v3, l).unwrap();
        (ops, [v0, v1, v2, v3], l)
    }

    fn assert_valid(body: &Body) {
        let result = body.validate();
        assert!(result.is_valid(), "invalid body: {:?}", result.errors);
    }

    #[test]
    fn mvfs_seeds_minimal_solid() {
        init_log();
        let (ops, _v0, face, l) = seeded();
        let body = ops.body().unwrap();
        assert_eq!(body.vertex_num(), 1);
        assert_eq!(body.edge_num(), 0);
        assert_eq!(body.face_num(), 1);
        assert_eq!(body[face].first_loop(), Some(l));
        assert!(body[l].halfedge().is_none());
        assert_valid(body);
    }

    #[test]
    fn mvfs_discards_previous_body() {
        let (mut ops, v0, _, l) = seeded();
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        ops.mev(v0, v1, l).unwrap();

        let v = ops.mvfs(Vec3::ONE);
        let body = ops.body().unwrap();
        assert_eq!(body.vertex_num(), 1);
        assert_eq!(body.edge_num(), 0);
        assert_eq!(body.iter_halfedges().count(), 0);
        assert_eq!(body[v].point(), Vec3::ONE);
    }

    #[test]
    fn take_body_rescues_the_solid() {
        let (mut ops, _, _, _) = seeded();
        let old = ops.take_body().unwrap();
        assert_eq!(old.vertex_num(), 1);
        assert!(ops.body().is_none());
    }

    #[test]
    fn mev_on_empty_loop_builds_a_two_cycle() {
        init_log();
        let (mut ops, v0, _, l) = seeded();
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        let he0 = ops.mev(v0, v1, l).unwrap();

        let body = ops.body().unwrap();
        let he1 = body[he0].twin().unwrap();
        assert_eq!(body[he0].next(), Some(he1));
        assert_eq!(body[he1].next(), Some(he0));
        assert_eq!(body[he0].prev(), Some(he1));
        assert_eq!(body[he1].prev(), Some(he0));
        assert_eq!(body[l].halfedge(), Some(he0));
        assert_eq!(body.at_halfedge(he0).src_dst_pair().unwrap(), (v0, v1));
        assert_eq!(body.edge_num(), 1);
        assert_eq!(body.vertex_num(), 2);
        assert_valid(body);
    }

    #[test]
    fn mev_grows_cycle_by_one_edge_pair() {
        let (mut ops, v0, _, l) = seeded();
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        ops.mev(v0, v1, l).unwrap();
        let before = ops.body().unwrap().loop_halfedges(l).unwrap().len();

        let v2 = ops.new_vertex(Vec3::Y).unwrap();
        ops.mev(v1, v2, l).unwrap();
        let body = ops.body().unwrap();
        assert_eq!(body.loop_halfedges(l).unwrap().len(), before + 2);
        assert_valid(body);
    }

    #[test]
    fn mev_fails_without_splice_point() {
        let (mut ops, v0, _, l) = seeded();
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        ops.mev(v0, v1, l).unwrap();

        // v3 was never linked in, so no halfedge of the loop ends at it.
        let v3 = ops.new_vertex(Vec3::Z).unwrap();
        let v4 = ops.new_vertex(Vec3::ONE).unwrap();
        let counts = {
            let body = ops.body().unwrap();
            (body.vertex_num(), body.edge_num(), body.face_num())
        };
        let halfedges_before = ops.body().unwrap().iter_halfedges().count();

        assert!(ops.mev(v3, v4, l).is_err());

        let body = ops.body().unwrap();
        assert_eq!(
            counts,
            (body.vertex_num(), body.edge_num(), body.face_num())
        );
        assert_eq!(body.iter_halfedges().count(), halfedges_before);
        assert_valid(body);
    }

    #[test]
    fn mev_fails_on_stale_arguments() {
        let (mut ops, v0, _, l) = seeded();
        // An id from a bigger arena of another engine: guaranteed absent
        // in this body.
        let stale = {
            let mut other = EulerOps::new();
            other.mvfs(Vec3::ZERO);
            other.new_vertex(Vec3::X).unwrap();
            other.new_vertex(Vec3::Y).unwrap()
        };
        assert!(ops.mev(v0, stale, l).is_err());
        let body = ops.body().unwrap();
        assert_eq!(body.vertex_num(), 1);
        assert_eq!(body.edge_num(), 0);
    }

    #[test]
    fn mef_splits_a_loop_into_two_faces() {
        init_log();
        let (mut ops, [v0, _, _, v3], l) = square();
        let faces_before = ops.body().unwrap().faces().unwrap().len();

        let new_loop = ops.mef(v3, v0, l).unwrap();

        let body = ops.body().unwrap();
        assert_eq!(body.face_num(), 2);
        assert_eq!(body.faces().unwrap().len(), faces_before + 1);
        // The new face sits at the head of the face list.
        let head_face = body.first_face().unwrap();
        assert_eq!(body[head_face].first_loop(), Some(new_loop));

        // The two loops are disjoint closed cycles.
        let outer: Vec<_> = body.loop_halfedges(l).unwrap().into_iter().collect();
        let inner: Vec<_> = body.loop_halfedges(new_loop).unwrap().into_iter().collect();
        assert!(outer.iter().all(|h| !inner.contains(h)));
        for &h in &outer {
            assert_eq!(body[h].loop_id(), Some(l));
        }
        for &h in &inner {
            assert_eq!(body[h].loop_id(), Some(new_loop));
        }
        assert_valid(body);
    }

    #[test]
    fn mef_on_existing_edge_does_not_call_mev() {
        let (mut ops, v0, _, l) = seeded();
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        ops.mev(v0, v1, l).unwrap();
        let edges_before = ops.body().unwrap().edge_num();

        ops.mef(v0, v1, l).unwrap();

        let body = ops.body().unwrap();
        assert_eq!(body.edge_num(), edges_before);
        assert_valid(body);
    }

    #[test]
    fn mef_round_trip_split_property() {
        // After mvfs -> mev, the dividing edge's two halfedges split into
        // two loops whose combined length equals the pre-edge loop length
        // (zero) plus one per halfedge.
        let (mut ops, v0, _, l) = seeded();
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        ops.mev(v0, v1, l).unwrap();
        let new_loop = ops.mef(v0, v1, l).unwrap();

        let body = ops.body().unwrap();
        let outer = body.loop_halfedges(l).unwrap();
        let inner = body.loop_halfedges(new_loop).unwrap();
        assert_eq!(outer.len() + inner.len(), 2);
        assert_valid(body);
    }

    #[test]
    fn mef_fails_on_absent_vertex() {
        let (mut ops, v0, _, l) = seeded();
        let stale = {
            let mut other = EulerOps::new();
            other.mvfs(Vec3::ZERO);
            other.new_vertex(Vec3::X).unwrap();
            other.new_vertex(Vec3::Y).unwrap()
        };
        let face_num = ops.body().unwrap().face_num();
        assert!(ops.mef(v0, stale, l).is_err());
        assert_eq!(ops.body().unwrap().face_num(), face_num);
    }

    #[test]
    fn kemr_detaches_a_ring() {
        init_log();
        let (mut ops, [v0, v1, v2, v3], l) = square();
        // Close the square into two faces, then kill the v1-v2 edge on the
        // big loop the split produced.
        let big = ops.mef(v3, v0, l).unwrap();
        let edges_before = ops.body().unwrap().edge_num();
        let len_before = ops.body().unwrap().loop_halfedges(big).unwrap().len();

        let ring = ops.kemr(v1, v2, big).unwrap();

        let body = ops.body().unwrap();
        assert_eq!(body.edge_num(), edges_before - 1);
        // The ring heads the face's loop list.
        let face = body[big].face().unwrap();
        assert_eq!(body[face].first_loop(), Some(ring));
        let ring_halfedges = body.loop_halfedges(ring).unwrap();
        let big_halfedges = body.loop_halfedges(big).unwrap();
        // The dying pair is gone; everything else moved to one of the two
        // cycles.
        assert_eq!(ring_halfedges.len() + big_halfedges.len(), len_before - 2);
        for &h in ring_halfedges.iter() {
            assert_eq!(body[h].loop_id(), Some(ring));
        }
        for &h in big_halfedges.iter() {
            assert_eq!(body[h].loop_id(), Some(big));
        }
        assert_valid(body);
    }

    #[test]
    fn kemr_fails_when_edge_not_in_loop() {
        let (mut ops, [v0, _, v2, _], l) = square();
        let counts = {
            let body = ops.body().unwrap();
            (body.vertex_num(), body.edge_num(), body.face_num())
        };
        // v0 and v2 are not joined by an edge.
        assert!(ops.kemr(v0, v2, l).is_err());
        let body = ops.body().unwrap();
        assert_eq!(
            counts,
            (body.vertex_num(), body.edge_num(), body.face_num())
        );
        assert_valid(body);
    }

    #[test]
    fn kemr_refuses_degenerate_ring() {
        // A lone edge in a loop: killing it would leave nothing behind.
        let (mut ops, v0, _, l) = seeded();
        let v1 = ops.new_vertex(Vec3::X).unwrap();
        ops.mev(v0, v1, l).unwrap();
        assert!(ops.kemr(v0, v1, l).is_err());
        let body = ops.body().unwrap();
        assert_eq!(body.edge_num(), 1);
        assert_valid(body);
    }

    #[test]
    fn kfmrh_reparents_a_loop() {
        init_log();
        let (mut ops, [v0, _, _, v3], l) = square();
        let new_loop = ops.mef(v3, v0, l).unwrap();
        let body = ops.body().unwrap();
        let old_face = body[new_loop].face().unwrap();
        let dst_face = body[l].face().unwrap();
        let face_num = body.face_num();

        ops.kfmrh(l, new_loop).unwrap();

        let body = ops.body().unwrap();
        assert_eq!(body.face_num(), face_num - 1);
        assert_eq!(body[new_loop].face(), Some(dst_face));
        // The moved loop heads the destination face's loop list.
        assert_eq!(body[dst_face].first_loop(), Some(new_loop));
        // The old face survives, empty.
        assert!(body.face(old_face).is_some());
        assert_eq!(body[old_face].first_loop(), None);
        assert_valid(body);
    }

    #[test]
    fn kfmrh_same_face_is_a_noop() {
        let (mut ops, [v0, v1, v2, v3], l) = square();
        let big = ops.mef(v3, v0, l).unwrap();
        let ring = ops.kemr(v1, v2, big).unwrap();
        // big and ring share a face now.
        let snapshot = {
            let body = ops.body().unwrap();
            let face = body[big].face().unwrap();
            (
                body.face_num(),
                body[face].first_loop(),
                body[big].next_loop(),
                body[ring].next_loop(),
            )
        };

        ops.kfmrh(big, ring).unwrap();

        let body = ops.body().unwrap();
        let face = body[big].face().unwrap();
        assert_eq!(
            snapshot,
            (
                body.face_num(),
                body[face].first_loop(),
                body[big].next_loop(),
                body[ring].next_loop(),
            )
        );
        assert_valid(body);
    }

    #[test]
    fn counters_track_traversal_counts() {
        // A longer operator sequence; validation cross-checks every counter
        // against the reachable graph after each step.
        init_log();
        let (mut ops, [v0, v1, _v2, v3], l) = square();
        assert_valid(ops.body().unwrap());

        let big = ops.mef(v3, v0, l).unwrap();
        assert_valid(ops.body().unwrap());

        // Hang a wire off v1 inside the big loop and retract it into a
        // ring, punching a hole.
        let v4 = ops.new_vertex(Vec3::new(0.5, 0.5, 0.0)).unwrap();
        ops.mev(v1, v4, big).unwrap();
        assert_valid(ops.body().unwrap());
        let v5 = ops.new_vertex(Vec3::new(0.5, 0.25, 0.0)).unwrap();
        ops.mev(v4, v5, big).unwrap();
        assert_valid(ops.body().unwrap());
        let spur_loop = ops.mef(v5, v4, big).unwrap();
        assert_valid(ops.body().unwrap());
        ops.kemr(v1, v4, big).unwrap();
        assert_valid(ops.body().unwrap());
        ops.kfmrh(big, spur_loop).unwrap();
        assert_valid(ops.body().unwrap());

        let body = ops.body().unwrap();
        assert_eq!(body.vertex_num(), 6);
        assert_eq!(body.edge_num(), body.iter_edges().count());
        // Every surviving edge shows up exactly once in the wireframe.
        let segments = body.generate_wireframe().unwrap();
        assert_eq!(segments.len(), body.edge_num());
    }

    #[test]
    fn operators_require_a_body() {
        let mut ops = EulerOps::new();
        let stale_v = {
            let mut other = EulerOps::new();
            other.mvfs(Vec3::ZERO)
        };
        assert!(ops.new_vertex(Vec3::ZERO).is_err());
        assert!(ops.mev(stale_v, stale_v, LoopId::default()).is_err());
        assert!(ops.mef(stale_v, stale_v, LoopId::default()).is_err());
        assert!(ops.kemr(stale_v, stale_v, LoopId::default()).is_err());
        assert!(ops
            .kfmrh(LoopId::default(), LoopId::default())
            .is_err());
    }
}
