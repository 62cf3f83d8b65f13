use serde::{Deserialize, Serialize};

use crate::layout::geom::Span;
use crate::layout::tracks::TrackId;

/// A straight wire on one routing track.
///
/// `span` runs along the track: x coordinates for horizontal tracks,
/// y coordinates for vertical ones. The `id` is only meaningful within the
/// cell that handed the wire out.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct WireArray {
    pub(crate) id: usize,
    pub track: TrackId,
    pub span: Span,
}

impl WireArray {
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn track_id(&self) -> TrackId {
        self.track
    }

    #[inline]
    pub fn lower(&self) -> i64 {
        self.span.lo()
    }

    #[inline]
    pub fn upper(&self) -> i64 {
        self.span.hi()
    }

    #[inline]
    pub fn middle(&self) -> i64 {
        self.span.middle()
    }
}

/// A transistor terminal: the connection-layer stripes of one net.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Terminal {
    pub(crate) net: usize,
    /// x coordinates of the terminal stripes.
    pub xs: Vec<i64>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub(crate) struct WireRecord {
    pub track: TrackId,
    pub span: Span,
    pub net: usize,
}

/// Union-find over net ids.
#[derive(Debug, Clone, Default)]
pub(crate) struct Nets {
    parent: Vec<usize>,
}

impl Nets {
    pub fn new_net(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        id
    }

    pub fn find(&mut self, net: usize) -> usize {
        let mut root = net;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = net;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }

    /// Maps every net to a dense id, numbered in order of first appearance.
    pub fn compact(&mut self) -> Vec<usize> {
        let mut dense = vec![usize::MAX; self.parent.len()];
        let mut out = Vec::with_capacity(self.parent.len());
        let mut next = 0;
        for net in 0..self.parent.len() {
            let root = self.find(net);
            if dense[root] == usize::MAX {
                dense[root] = next;
                next += 1;
            }
            out.push(dense[root]);
        }
        out
    }
}
