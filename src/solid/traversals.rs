// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

pub trait Location {}

impl Location for VertexId {}
impl Location for HalfEdgeId {}
impl Location for EdgeId {}
impl Location for LoopId {}
impl Location for FaceId {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraversalError {
    VertexAbsent(VertexId),
    HalfEdgeAbsent(HalfEdgeId),
    EdgeAbsent(EdgeId),
    LoopAbsent(LoopId),
    FaceAbsent(FaceId),
    VertexHasNoHalfEdge(VertexId),
    LoopIsEmpty(LoopId),
    LoopHasNoFace(LoopId),
    FaceHasNoLoop(FaceId),
    HalfEdgeHasNoNext(HalfEdgeId),
    HalfEdgeHasNoPrev(HalfEdgeId),
    HalfEdgeHasNoTwin(HalfEdgeId),
    HalfEdgeHasNoLoop(HalfEdgeId),
    HalfEdgeHasNoEdge(HalfEdgeId),
    HalfEdgeHasNoSrc(HalfEdgeId),
    HalfEdgeHasNoDst(HalfEdgeId),
    NoHalfEdgeEndingAt(VertexId),
    NoHalfEdgeBetween(VertexId, VertexId),
    MaxIterationsReached,
}
impl std::fmt::Display for TraversalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{self:?}"))
    }
}
impl std::error::Error for TraversalError {}

#[derive(Clone, Copy)]
pub struct ValidTraversal<'a, L>
where
    L: Location,
{
    inner: &'a Body,
    location: L,
}

pub type Traversal<'a, L> = Result<ValidTraversal<'a, L>, TraversalError>;

fn step<'a, L: Location>(inner: &'a Body, location: L) -> Traversal<'a, L> {
    Ok(ValidTraversal { inner, location })
}

/* ===================== */
/* Traversal on vertices */
/* ===================== */

pub trait VertexTraversal<'a> {
    fn halfedge(&'a self) -> Traversal<'a, HalfEdgeId>;
    fn point(&'a self) -> Result<Vec3, TraversalError>;
}

impl<'a> VertexTraversal<'a> for Traversal<'a, VertexId> {
    fn halfedge(&'a self) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            let v = valid
                .inner
                .vertex(valid.location)
                .ok_or(TraversalError::VertexAbsent(valid.location))?;
            step(
                valid.inner,
                v.halfedge
                    .ok_or(TraversalError::VertexHasNoHalfEdge(valid.location))?,
            )
        })
    }

    fn point(&'a self) -> Result<Vec3, TraversalError> {
        self.and_then(|valid| {
            Ok(valid
                .inner
                .vertex(valid.location)
                .ok_or(TraversalError::VertexAbsent(valid.location))?
                .point)
        })
    }
}

/* ====================== */
/* Traversal on halfedges */
/* ====================== */

pub trait HalfEdgeTraversal<'a> {
    fn next(&'a self) -> Traversal<'a, HalfEdgeId>;
    fn prev(&'a self) -> Traversal<'a, HalfEdgeId>;
    fn twin(&'a self) -> Traversal<'a, HalfEdgeId>;
    fn edge(&'a self) -> Traversal<'a, EdgeId>;
    fn in_loop(&'a self) -> Traversal<'a, LoopId>;
    fn src_vertex(&'a self) -> Traversal<'a, VertexId>;
    fn dst_vertex(&'a self) -> Traversal<'a, VertexId>;
    fn src_dst_pair(&'a self) -> Result<(VertexId, VertexId), TraversalError>;
}

macro_rules! halfedge_step {
    ($fn_name:ident, $field:ident, $err:ident, $out:ty) => {
        fn $fn_name(&'a self) -> Traversal<'a, $out> {
            self.and_then(|valid| {
                let he = valid
                    .inner
                    .halfedge(valid.location)
                    .ok_or(TraversalError::HalfEdgeAbsent(valid.location))?;
                step(
                    valid.inner,
                    he.$field.ok_or(TraversalError::$err(valid.location))?,
                )
            })
        }
    };
}

impl<'a> HalfEdgeTraversal<'a> for Traversal<'a, HalfEdgeId> {
    halfedge_step!(next, next, HalfEdgeHasNoNext, HalfEdgeId);
    halfedge_step!(prev, prev, HalfEdgeHasNoPrev, HalfEdgeId);
    halfedge_step!(twin, twin, HalfEdgeHasNoTwin, HalfEdgeId);
    halfedge_step!(edge, edge, HalfEdgeHasNoEdge, EdgeId);
    halfedge_step!(in_loop, loop_, HalfEdgeHasNoLoop, LoopId);
    halfedge_step!(src_vertex, src, HalfEdgeHasNoSrc, VertexId);
    halfedge_step!(dst_vertex, dst, HalfEdgeHasNoDst, VertexId);

    fn src_dst_pair(&'a self) -> Result<(VertexId, VertexId), TraversalError> {
        Ok((self.src_vertex().try_end()?, self.dst_vertex().try_end()?))
    }
}

/* ================== */
/* Traversal on edges */
/* ================== */

pub trait EdgeTraversal<'a> {
    fn halfedges(&'a self) -> Result<(HalfEdgeId, HalfEdgeId), TraversalError>;
}

impl<'a> EdgeTraversal<'a> for Traversal<'a, EdgeId> {
    fn halfedges(&'a self) -> Result<(HalfEdgeId, HalfEdgeId), TraversalError> {
        self.and_then(|valid| {
            let e = valid
                .inner
                .edge(valid.location)
                .ok_or(TraversalError::EdgeAbsent(valid.location))?;
            Ok((e.he0, e.he1))
        })
    }
}

/* ================== */
/* Traversal on loops */
/* ================== */

pub trait LoopTraversal<'a> {
    /// The head of the loop's circular halfedge list. Errors on an empty
    /// loop, which is only a legal state right after `mvfs`.
    fn halfedge(&'a self) -> Traversal<'a, HalfEdgeId>;
    fn face(&'a self) -> Traversal<'a, FaceId>;
    /// The closed halfedge cycle, starting at the head.
    fn halfedges(&'a self) -> Result<SVec<HalfEdgeId>, TraversalError>;
    /// Finds a halfedge of this loop whose end vertex is `v`: the natural
    /// point to splice in a new edge leaving `v`.
    fn halfedge_ending_at(&'a self, v: VertexId) -> Traversal<'a, HalfEdgeId>;
    /// Finds the halfedge of this loop directed exactly `v0` → `v1`.
    fn halfedge_between(&'a self, v0: VertexId, v1: VertexId) -> Traversal<'a, HalfEdgeId>;
    /// Finds a halfedge of this loop connecting `v0` and `v1` in either
    /// direction.
    fn halfedge_joining(&'a self, v0: VertexId, v1: VertexId) -> Traversal<'a, HalfEdgeId>;
}

impl<'a> LoopTraversal<'a> for Traversal<'a, LoopId> {
    fn halfedge(&'a self) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            let lp = valid
                .inner
                .lp(valid.location)
                .ok_or(TraversalError::LoopAbsent(valid.location))?;
            step(
                valid.inner,
                lp.halfedge
                    .ok_or(TraversalError::LoopIsEmpty(valid.location))?,
            )
        })
    }

    fn face(&'a self) -> Traversal<'a, FaceId> {
        self.and_then(|valid| {
            let lp = valid
                .inner
                .lp(valid.location)
                .ok_or(TraversalError::LoopAbsent(valid.location))?;
            step(
                valid.inner,
                lp.face.ok_or(TraversalError::LoopHasNoFace(valid.location))?,
            )
        })
    }

    fn halfedges(&'a self) -> Result<SVec<HalfEdgeId>, TraversalError> {
        self.and_then(|valid| valid.inner.loop_halfedges(valid.location))
    }

    fn halfedge_ending_at(&'a self, v: VertexId) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            let h = self
                .halfedges()?
                .iter_cpy()
                .find(|&h| {
                    valid
                        .inner
                        .at_halfedge(h)
                        .dst_vertex()
                        .try_end()
                        .map(|dst| dst == v)
                        .unwrap_or(false)
                })
                .ok_or(TraversalError::NoHalfEdgeEndingAt(v))?;
            step(valid.inner, h)
        })
    }

    fn halfedge_between(&'a self, v0: VertexId, v1: VertexId) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            let h = self
                .halfedges()?
                .iter_cpy()
                .find(|&h| {
                    valid
                        .inner
                        .at_halfedge(h)
                        .src_dst_pair()
                        .map(|pair| pair == (v0, v1))
                        .unwrap_or(false)
                })
                .ok_or(TraversalError::NoHalfEdgeBetween(v0, v1))?;
            step(valid.inner, h)
        })
    }

    fn halfedge_joining(&'a self, v0: VertexId, v1: VertexId) -> Traversal<'a, HalfEdgeId> {
        self.and_then(|valid| {
            let h = self
                .halfedges()?
                .iter_cpy()
                .find(|&h| {
                    valid
                        .inner
                        .at_halfedge(h)
                        .src_dst_pair()
                        .map(|pair| pair == (v0, v1) || pair == (v1, v0))
                        .unwrap_or(false)
                })
                .ok_or(TraversalError::NoHalfEdgeBetween(v0, v1))?;
            step(valid.inner, h)
        })
    }
}

/* ================== */
/* Traversal on faces */
/* ================== */

pub trait FaceTraversal<'a> {
    fn first_loop(&'a self) -> Traversal<'a, LoopId>;
    fn loops(&'a self) -> Result<SVec<LoopId>, TraversalError>;
}

impl<'a> FaceTraversal<'a> for Traversal<'a, FaceId> {
    fn first_loop(&'a self) -> Traversal<'a, LoopId> {
        self.and_then(|valid| {
            let f = valid
                .inner
                .face(valid.location)
                .ok_or(TraversalError::FaceAbsent(valid.location))?;
            step(
                valid.inner,
                f.first_loop
                    .ok_or(TraversalError::FaceHasNoLoop(valid.location))?,
            )
        })
    }

    fn loops(&'a self) -> Result<SVec<LoopId>, TraversalError> {
        self.and_then(|valid| valid.inner.face_loops(valid.location))
    }
}

/* =================== */
/*  Generic traversal  */
/* =================== */

pub trait AnyTraversal<'a, L> {
    fn end(&'a self) -> L;
    fn try_end(&'a self) -> Result<L, TraversalError>;
}
impl<'a, L> AnyTraversal<'a, L> for Traversal<'a, L>
where
    L: Location + Copy,
{
    fn end(&'a self) -> L {
        self.map(|valid| valid.location)
            .unwrap_or_else(|err| panic!("Error during traversal: {err:?}"))
    }

    fn try_end(&'a self) -> Result<L, TraversalError> {
        self.map(|valid| valid.location)
    }
}

/* ============ */
/*  Initiators  */
/* ============ */

impl Body {
    pub fn at_vertex(&self, vertex_id: VertexId) -> Traversal<'_, VertexId> {
        step(self, vertex_id)
    }

    pub fn at_halfedge(&self, halfedge_id: HalfEdgeId) -> Traversal<'_, HalfEdgeId> {
        step(self, halfedge_id)
    }

    pub fn at_edge(&self, edge_id: EdgeId) -> Traversal<'_, EdgeId> {
        step(self, edge_id)
    }

    pub fn at_loop(&self, loop_id: LoopId) -> Traversal<'_, LoopId> {
        step(self, loop_id)
    }

    pub fn at_face(&self, face_id: FaceId) -> Traversal<'_, FaceId> {
        step(self, face_id)
    }
}
