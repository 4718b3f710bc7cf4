// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;

use slotmap::SlotMap;

/// Type-safe wrappers over the internal allocator indices used as pointers
pub mod id_types;
pub use id_types::*;

/// Implements indexing traits so the body can be used to access vertex,
/// edge, face, loop or halfedge information using ids as indices.
pub mod solid_index_impls;

/// An API to represent type-safe and error-handled graph traversals over a solid
pub mod traversals;
pub use traversals::*;

/// The five Euler operators, the only legal way to mutate a body
pub mod euler_ops;
pub use euler_ops::*;

/// Read-only extraction of renderable line segments and summary counters
pub mod wireframe;
pub use wireframe::*;

/// Structural invariant checks for a body, used after edits and in tests
pub mod validation;
pub use validation::*;

/// A B-rep solid is a type of linked graph. This means it is sometimes
/// impossible to ensure some algorithms will terminate when the body is
/// malformed. To ensure the code never goes into an infinite loop, this max
/// number of iterations will be performed before giving an error. This
/// should be large enough, as loops with a very large number of edges may
/// trigger it.
pub const MAX_LOOP_ITERATIONS: usize = 8196;

/// A vertex of the solid, anchored at a point in space. The halfedge is an
/// arbitrary incident halfedge, kept as a traversal entry point.
#[derive(Debug, Clone)]
pub struct Vertex {
    point: Vec3,
    halfedge: Option<HalfEdgeId>,
}

/// One directed side of an edge. Halfedges form a circular doubly linked
/// list within their loop.
#[derive(Debug, Default, Clone)]
pub struct HalfEdge {
    src: Option<VertexId>,
    dst: Option<VertexId>,
    twin: Option<HalfEdgeId>,
    next: Option<HalfEdgeId>,
    prev: Option<HalfEdgeId>,
    loop_: Option<LoopId>,
    edge: Option<EdgeId>,
}

/// An undirected edge. Owns its two oppositely directed halfedges.
#[derive(Debug, Clone)]
pub struct Edge {
    he0: HalfEdgeId,
    he1: HalfEdgeId,
}

/// A closed boundary of a face, either the outer boundary or an inner hole.
/// The halfedge is the head of the circular list and is only allowed to be
/// `None` in a freshly seeded body, before the first `mev`. Loops of the
/// same face form a doubly linked sibling list.
#[derive(Debug, Default, Clone)]
pub struct Loop {
    halfedge: Option<HalfEdgeId>,
    face: Option<FaceId>,
    next_loop: Option<LoopId>,
    prev_loop: Option<LoopId>,
}

/// A face of the solid. Owns a doubly linked list of loops and participates
/// in the body's doubly linked face list.
#[derive(Debug, Default, Clone)]
pub struct Face {
    first_loop: Option<LoopId>,
    next_face: Option<FaceId>,
    prev_face: Option<FaceId>,
}

/// A single B-rep solid. All entities live in typed arenas owned by the
/// body, so dropping the body drops every face, loop, edge, halfedge and
/// vertex reachable from it.
///
/// The `vertex_num` / `edge_num` / `face_num` counters are redundant with
/// the graph and are kept in sync by the Euler operators. They saturate at
/// zero on decrement.
#[derive(Debug, Clone, Default)]
pub struct Body {
    vertices: SlotMap<VertexId, Vertex>,
    halfedges: SlotMap<HalfEdgeId, HalfEdge>,
    edges: SlotMap<EdgeId, Edge>,
    loops: SlotMap<LoopId, Loop>,
    faces: SlotMap<FaceId, Face>,

    first_face: Option<FaceId>,

    vertex_num: usize,
    edge_num: usize,
    face_num: usize,
}

impl Vertex {
    pub fn point(&self) -> Vec3 {
        self.point
    }

    pub fn halfedge(&self) -> Option<HalfEdgeId> {
        self.halfedge
    }
}

impl HalfEdge {
    pub fn src(&self) -> Option<VertexId> {
        self.src
    }

    pub fn dst(&self) -> Option<VertexId> {
        self.dst
    }

    pub fn twin(&self) -> Option<HalfEdgeId> {
        self.twin
    }

    pub fn next(&self) -> Option<HalfEdgeId> {
        self.next
    }

    pub fn prev(&self) -> Option<HalfEdgeId> {
        self.prev
    }

    pub fn loop_id(&self) -> Option<LoopId> {
        self.loop_
    }

    pub fn edge(&self) -> Option<EdgeId> {
        self.edge
    }
}

impl Edge {
    pub fn halfedges(&self) -> (HalfEdgeId, HalfEdgeId) {
        (self.he0, self.he1)
    }
}

impl Loop {
    pub fn halfedge(&self) -> Option<HalfEdgeId> {
        self.halfedge
    }

    pub fn face(&self) -> Option<FaceId> {
        self.face
    }

    pub fn next_loop(&self) -> Option<LoopId> {
        self.next_loop
    }
}

impl Face {
    pub fn first_loop(&self) -> Option<LoopId> {
        self.first_loop
    }

    pub fn next_face(&self) -> Option<FaceId> {
        self.next_face
    }
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_num(&self) -> usize {
        self.vertex_num
    }

    pub fn edge_num(&self) -> usize {
        self.edge_num
    }

    pub fn face_num(&self) -> usize {
        self.face_num
    }

    pub fn first_face(&self) -> Option<FaceId> {
        self.first_face
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter()
    }

    pub fn iter_halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> {
        self.halfedges.iter()
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    pub fn iter_loops(&self) -> impl Iterator<Item = (LoopId, &Loop)> {
        self.loops.iter()
    }

    pub fn iter_faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter()
    }

    /// The body's face list, in list order (most recently created first).
    pub fn faces(&self) -> Result<SVec<FaceId>, TraversalError> {
        let mut result = SVec::new();
        let mut cursor = self.first_face;
        while let Some(f) = cursor {
            if result.len() > MAX_LOOP_ITERATIONS {
                return Err(TraversalError::MaxIterationsReached);
            }
            result.push(f);
            cursor = self
                .faces
                .get(f)
                .ok_or(TraversalError::FaceAbsent(f))?
                .next_face;
        }
        Ok(result)
    }

    /// The loops of `face`, in list order. The first loop of a face that was
    /// never touched by `kemr` or `kfmrh` is its outer boundary.
    pub fn face_loops(&self, face: FaceId) -> Result<SVec<LoopId>, TraversalError> {
        let mut result = SVec::new();
        let mut cursor = self
            .faces
            .get(face)
            .ok_or(TraversalError::FaceAbsent(face))?
            .first_loop;
        while let Some(l) = cursor {
            if result.len() > MAX_LOOP_ITERATIONS {
                return Err(TraversalError::MaxIterationsReached);
            }
            result.push(l);
            cursor = self
                .loops
                .get(l)
                .ok_or(TraversalError::LoopAbsent(l))?
                .next_loop;
        }
        Ok(result)
    }

    /// The circular halfedge list of `l`, starting at its head. An empty
    /// loop yields an empty list.
    pub fn loop_halfedges(&self, l: LoopId) -> Result<SVec<HalfEdgeId>, TraversalError> {
        let lp = self.loops.get(l).ok_or(TraversalError::LoopAbsent(l))?;
        let mut result = SVec::new();
        let h0 = match lp.halfedge {
            Some(h0) => h0,
            None => return Ok(result),
        };
        let mut h = h0;
        loop {
            if result.len() > MAX_LOOP_ITERATIONS {
                return Err(TraversalError::MaxIterationsReached);
            }
            result.push(h);
            h = self
                .halfedges
                .get(h)
                .ok_or(TraversalError::HalfEdgeAbsent(h))?
                .next
                .ok_or(TraversalError::HalfEdgeHasNoNext(h))?;
            if h == h0 {
                break;
            }
        }
        Ok(result)
    }

    /// Adds a new vertex to the body, disconnected from everything else.
    /// Returns its handle.
    fn alloc_vertex(&mut self, point: Vec3, halfedge: Option<HalfEdgeId>) -> VertexId {
        self.vertices.insert(Vertex { point, halfedge })
    }

    /// Adds a new halfedge to the body, disconnected from everything else.
    /// Returns its handle.
    fn alloc_halfedge(&mut self, halfedge: HalfEdge) -> HalfEdgeId {
        self.halfedges.insert(halfedge)
    }

    /// Adds a new edge owning the two given halfedges. Returns its handle.
    fn alloc_edge(&mut self, he0: HalfEdgeId, he1: HalfEdgeId) -> EdgeId {
        self.edges.insert(Edge { he0, he1 })
    }

    /// Adds a new, empty loop to the body. Returns its handle.
    fn alloc_loop(&mut self, face: Option<FaceId>) -> LoopId {
        self.loops.insert(Loop {
            halfedge: None,
            face,
            next_loop: None,
            prev_loop: None,
        })
    }

    /// Adds a new face with no loops. Returns its handle.
    fn alloc_face(&mut self) -> FaceId {
        self.faces.insert(Face::default())
    }

    /// Removes a halfedge from the body. This does not attempt to preserve
    /// connectivity and should only be used as part of internal operations.
    fn remove_halfedge(&mut self, halfedge: HalfEdgeId) {
        self.halfedges.remove(halfedge);
    }

    /// Removes an edge and its two halfedges from the body's arenas. This is
    /// the single mutating primitive the model offers to the operators: it
    /// performs no invariant checking, and the caller is responsible for
    /// having already detached both halfedges from their loops. Removing an
    /// edge that is not present is a no-op.
    pub(crate) fn delete_edge(&mut self, edge: EdgeId) {
        if let Some(e) = self.edges.remove(edge) {
            self.remove_halfedge(e.he0);
            self.remove_halfedge(e.he1);
        }
    }
}
