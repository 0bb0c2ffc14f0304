/**
 * A triangle strip: every window of three consecutive items is a triangle,
 * with the first two items swapped in odd windows so all triangles keep the
 * same winding. Windows with a repeated item are degenerate and don't encode
 * a triangle, which is how several strips are joined into one index buffer.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriangleStrip<T> {
    items: Vec<T>,
}

/// Position of the directed edge `a -> b` in the triangle, and its third item.
fn directed_edge<T: Copy + PartialEq>(tri: &[T; 3], a: T, b: T) -> Option<T> {
    (0..3)
        .find(|i| tri[*i] == a && tri[(i + 1) % 3] == b)
        .map(|i| tri[(i + 2) % 3])
}

impl<T: Copy + PartialEq> TriangleStrip<T> {
    pub fn new(tri: [T; 3]) -> Self {
        TriangleStrip {
            items: tri.to_vec(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<T> {
        self.items.first().copied()
    }

    pub fn last(&self) -> Option<T> {
        self.items.last().copied()
    }

    fn is_even(&self) -> bool {
        self.items.len() % 2 == 0
    }

    fn head(&self) -> Option<(T, T)> {
        match self.items.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }

    fn tail(&self) -> Option<(T, T)> {
        match self.items.as_slice() {
            [.., a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    fn reversed(&self) -> Vec<T> {
        self.items.iter().rev().copied().collect()
    }

    /**
     * Tries to extend the strip with `tri`, which must share a directed edge
     * with the first or the last triangle of the strip, in the opposite
     * direction. Only strips of even length can grow from their first
     * triangle, by reversing them first. A strip of a single triangle can
     * grow from any of its three edges.
     *
     * Returns `false` and leaves the strip untouched when `tri` doesn't fit.
     */
    pub fn append_triangle(&mut self, tri: [T; 3]) -> bool {
        let n = self.items.len();
        if n == 3 {
            let [v0, v1, v2] = [self.items[0], self.items[1], self.items[2]];
            let rotations = [[v0, v1, v2], [v2, v0, v1], [v1, v2, v0]];
            for [a, b, c] in rotations {
                if let Some(x) = directed_edge(&tri, c, b) {
                    self.items = vec![a, b, c, x];
                    return true;
                }
            }
            return false;
        }
        let Some((s0, s1)) = self.head() else {
            return false;
        };
        let Some((a, b)) = self.tail() else {
            return false;
        };
        if self.is_even() {
            if let Some(x) = directed_edge(&tri, a, b) {
                self.items.push(x);
                return true;
            }
            // Even strips keep their winding when reversed.
            if let Some(x) = directed_edge(&tri, s1, s0) {
                self.items.reverse();
                self.items.push(x);
                return true;
            }
            false
        } else {
            match directed_edge(&tri, b, a) {
                Some(x) => {
                    self.items.push(x);
                    true
                }
                None => false,
            }
        }
    }

    /**
     * Tries to splice `other` onto this strip, so that the pair of items
     * where they meet is shared instead of repeated. The parity of both
     * strips decides which ends can be joined. Returns `false` and leaves the
     * strip untouched when they don't fit.
     */
    pub fn concat(&mut self, other: &TriangleStrip<T>) -> bool {
        if other.len() == 3 {
            return self.append_triangle([other.items[0], other.items[1], other.items[2]]);
        }
        let (Some(head), Some(tail)) = (self.head(), self.tail()) else {
            return false;
        };
        let (Some(ohead), Some(otail)) = (other.head(), other.tail()) else {
            return false;
        };
        if self.is_even() && tail == ohead {
            self.items.extend_from_slice(&other.items[2..]);
            return true;
        }
        if self.is_even() && other.is_even() && tail == (otail.1, otail.0) {
            let rev = other.reversed();
            self.items.extend_from_slice(&rev[2..]);
            return true;
        }
        // An even strip can be put in front of this one, as is or reversed.
        if other.is_even() {
            if head == otail {
                self.prepend(&other.items);
                return true;
            }
            if head == (ohead.1, ohead.0) {
                self.prepend(&other.reversed());
                return true;
            }
        }
        false
    }

    /// Replaces the strip with `front` followed by all but the first two items.
    fn prepend(&mut self, front: &[T]) {
        let mut items = Vec::with_capacity(front.len() + self.items.len() - 2);
        items.extend_from_slice(front);
        items.extend_from_slice(&self.items[2..]);
        self.items = items;
    }

    /// The triangles encoded by the strip, skipping degenerate windows.
    pub fn triangles(&self) -> Vec<[T; 3]> {
        decode_strip(&self.items)
    }
}

/**
 * Decodes a sequence of strip indices into triangles, skipping the degenerate
 * windows used to join strips.
 */
pub fn decode_strip<T: Copy + PartialEq>(items: &[T]) -> Vec<[T; 3]> {
    items
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[0] != w[1] && w[1] != w[2] && w[0] != w[2])
        .map(|(i, w)| match i % 2 {
            0 => [w[0], w[1], w[2]],
            _ => [w[1], w[0], w[2]],
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::{decode_strip, TriangleStrip};

    /// Rotates the triangle so its smallest item comes first.
    fn canonical(t: [u32; 3]) -> [u32; 3] {
        let i = (0..3).min_by_key(|i| t[*i]).unwrap_or(0);
        [t[i], t[(i + 1) % 3], t[(i + 2) % 3]]
    }

    fn sorted(tris: impl IntoIterator<Item = [u32; 3]>) -> Vec<[u32; 3]> {
        let mut out: Vec<_> = tris.into_iter().map(canonical).collect();
        out.sort();
        out
    }

    #[test]
    fn t_append_single_triangle() {
        // The new triangle can use any edge of the first one.
        for (tri, expected) in [
            ([2, 1, 3], vec![0, 1, 2, 3]),
            ([1, 0, 3], vec![2, 0, 1, 3]),
            ([0, 2, 3], vec![1, 2, 0, 3]),
        ] {
            let mut strip = TriangleStrip::new([0u32, 1, 2]);
            assert!(strip.append_triangle(tri));
            assert_eq!(strip.items(), expected.as_slice());
            assert_eq!(sorted(strip.triangles()), sorted([[0, 1, 2], tri]));
        }
        // Same winding on the shared edge.
        let mut strip = TriangleStrip::new([0u32, 1, 2]);
        assert!(!strip.append_triangle([1, 2, 3]));
        assert_eq!(strip.items(), &[0, 1, 2]);
    }

    #[test]
    fn t_append_both_ends() {
        let mut strip = TriangleStrip::new([0u32, 1, 2]);
        assert!(strip.append_triangle([2, 1, 3]));
        // Odd windows are swapped.
        assert_eq!(strip.triangles(), vec![[0, 1, 2], [2, 1, 3]]);
        // Grows from the end.
        assert!(strip.append_triangle([2, 3, 4]));
        assert_eq!(strip.items(), &[0, 1, 2, 3, 4]);
        assert!(strip.append_triangle([4, 3, 5]));
        // Grows from the start of an even strip.
        assert!(strip.append_triangle([1, 0, 6]));
        assert_eq!(strip.items(), &[5, 4, 3, 2, 1, 0, 6]);
        assert_eq!(
            sorted(strip.triangles()),
            sorted([[0, 1, 2], [2, 1, 3], [2, 3, 4], [4, 3, 5], [1, 0, 6]])
        );
        // The start of an odd strip is closed.
        assert!(!strip.append_triangle([4, 5, 7]));
    }

    #[test]
    fn t_concat() {
        let mut a = TriangleStrip::new([0u32, 1, 2]);
        assert!(a.append_triangle([2, 1, 3]));
        let mut b = TriangleStrip::new([2u32, 3, 4]);
        assert!(b.append_triangle([4, 3, 5]));
        let expected = sorted(a.triangles().into_iter().chain(b.triangles()));
        assert!(a.concat(&b));
        assert_eq!(a.items(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(sorted(a.triangles()), expected);
        // Joined in front.
        let mut a = TriangleStrip::new([2u32, 3, 4]);
        assert!(a.append_triangle([4, 3, 5]));
        let mut b = TriangleStrip::new([0u32, 1, 2]);
        assert!(b.append_triangle([2, 1, 3]));
        assert!(a.concat(&b));
        assert_eq!(a.items(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(sorted(a.triangles()), expected);
        // Unrelated strips.
        let c = TriangleStrip::new([10u32, 11, 12]);
        let mut d = TriangleStrip::new([10u32, 11, 12]);
        assert!(d.append_triangle([12, 11, 13]));
        assert!(!a.concat(&d));
        assert!(!a.concat(&c));
        assert_eq!(a.items(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn t_decode_skips_restarts() {
        let indices = [3u32, 6, 4, 7, 5, 8, 8, 0, 0, 3, 1, 4, 2, 5];
        let tris = decode_strip(&indices);
        assert_eq!(tris.len(), 8);
        assert_eq!(tris[0], [3, 6, 4]);
        assert_eq!(tris[1], [4, 6, 7]);
        // First triangle after the restart keeps the even winding.
        assert_eq!(tris[4], [0, 3, 1]);
    }
}
