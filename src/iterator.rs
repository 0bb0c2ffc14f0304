use crate::{
    element::{HH, TH, VH},
    mesh::Mesh,
};

/// Walks the sibling chain of a vertex.
struct SiblingIter<'a> {
    mesh: &'a Mesh,
    hcurrent: Option<HH>,
}

impl Iterator for SiblingIter<'_> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        match self.hcurrent {
            Some(current) => {
                self.hcurrent = current.sibling(self.mesh);
                Some(current)
            }
            None => None,
        }
    }
}

/// Walks the `next` loop of a triangle, starting at a given halfedge.
struct LoopIter<'a> {
    mesh: &'a Mesh,
    hstart: HH,
    hcurrent: Option<HH>,
}

impl Iterator for LoopIter<'_> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        match self.hcurrent {
            Some(current) => {
                let next = current.next(self.mesh);
                self.hcurrent = if next == self.hstart {
                    None
                } else {
                    Some(next)
                };
                Some(current)
            }
            None => None,
        }
    }
}

impl Mesh {
    /// Halfedges leaving `v`, in sibling chain order.
    pub fn outgoing_halfedges(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        SiblingIter {
            mesh: self,
            hcurrent: v.halfedge(self),
        }
    }

    /// Triangles incident to `v`, in sibling chain order.
    pub fn triangles_around(&self, v: VH) -> impl Iterator<Item = TH> + use<'_> {
        self.outgoing_halfedges(v).map(|h| h.triangle(self))
    }

    /// Halfedges of the loop containing `h`, starting with `h`.
    pub fn loop_halfedges(&self, h: HH) -> impl Iterator<Item = HH> + use<'_> {
        LoopIter {
            mesh: self,
            hstart: h,
            hcurrent: Some(h),
        }
    }
}
