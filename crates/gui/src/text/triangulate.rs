//! Polygon-with-holes triangulation for glyph caps.
//!
//! Holes are merged into the outer ring through bridge edges, then the
//! resulting weakly-simple polygon is ear-clipped. Triangle indices refer to
//! the flat vertex list `outer ++ holes[0] ++ holes[1] ++ ...`, so callers can
//! reuse them for every offset copy of the same contours.

use kurbo::Point;

use super::typeface::Contour;

const EPS: f64 = 1e-12;

/// Outer contour with the holes it contains
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Counter-clockwise
    pub outer: Contour,
    /// Clockwise
    pub holes: Vec<Contour>,
}

impl Polygon {
    /// Outer followed by holes, in flat index order
    pub fn rings(&self) -> impl Iterator<Item = &Contour> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    pub fn vertex_count(&self) -> usize {
        self.rings().map(|r| r.len()).sum()
    }
}

/// Twice the signed area; positive for counter-clockwise contours.
pub fn signed_area(contour: &[Point]) -> f64 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let a = contour[i];
            let b = contour[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Even-odd point in polygon test
pub fn contains(contour: &[Point], p: Point) -> bool {
    let n = contour.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (contour[i], contour[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Group contours into polygons by nesting depth.
///
/// A contour nested in an even number of others is an outer ring; an odd
/// number makes it a hole of its innermost enclosing outer ring. Orientation
/// is normalized (outer CCW, holes CW) regardless of the font's convention.
pub fn group_contours(contours: Vec<Contour>) -> Vec<Polygon> {
    let areas: Vec<f64> = contours.iter().map(|c| signed_area(c).abs()).collect();
    let parents: Vec<Vec<usize>> = contours
        .iter()
        .enumerate()
        .map(|(i, c)| {
            (0..contours.len())
                .filter(|&j| j != i && areas[j] > areas[i] && contains(&contours[j], c[0]))
                .collect()
        })
        .collect();

    let mut polygons: Vec<Polygon> = Vec::new();
    let mut outer_index = vec![usize::MAX; contours.len()];

    let mut order: Vec<usize> = (0..contours.len()).collect();
    order.sort_by(|&a, &b| parents[a].len().cmp(&parents[b].len()));

    for i in order {
        let depth = parents[i].len();
        let mut contour = contours[i].clone();
        if depth % 2 == 0 {
            if signed_area(&contour) < 0.0 {
                contour.reverse();
            }
            outer_index[i] = polygons.len();
            polygons.push(Polygon {
                outer: contour,
                holes: Vec::new(),
            });
        } else {
            // innermost enclosing contour (smallest area) is the direct parent
            let parent = parents[i]
                .iter()
                .copied()
                .filter(|&p| parents[p].len() == depth - 1)
                .min_by(|&a, &b| areas[a].total_cmp(&areas[b]));
            if let Some(p) = parent.filter(|&p| outer_index[p] != usize::MAX) {
                if signed_area(&contour) > 0.0 {
                    contour.reverse();
                }
                polygons[outer_index[p]].holes.push(contour);
            }
        }
    }

    polygons
}

/// Triangulate a polygon; returns CCW triangles as flat vertex indices.
pub fn triangulate(polygon: &Polygon) -> Vec<[usize; 3]> {
    let points: Vec<Point> = polygon.rings().flatten().copied().collect();
    if polygon.outer.len() < 3 {
        return Vec::new();
    }

    let mut ring: Vec<usize> = (0..polygon.outer.len()).collect();

    // Bridge holes, rightmost first
    let mut holes: Vec<Vec<usize>> = Vec::new();
    let mut start = polygon.outer.len();
    for hole in &polygon.holes {
        holes.push((start..start + hole.len()).collect());
        start += hole.len();
    }
    holes.retain(|h| h.len() >= 3);
    holes.sort_by(|a, b| max_x(&points, b).total_cmp(&max_x(&points, a)));
    for hole in holes {
        bridge_hole(&points, &mut ring, &hole);
    }

    ear_clip(&points, ring)
}

fn max_x(points: &[Point], ring: &[usize]) -> f64 {
    ring.iter().map(|&i| points[i].x).fold(f64::MIN, f64::max)
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    cross(a, b, p) >= -EPS && cross(b, c, p) >= -EPS && cross(c, a, p) >= -EPS
}

/// Splice `hole` into `ring` through a bridge from the hole's rightmost vertex
/// to a visible ring vertex.
fn bridge_hole(points: &[Point], ring: &mut Vec<usize>, hole: &[usize]) {
    let Some((m_pos, &m)) = hole
        .iter()
        .enumerate()
        .max_by(|a, b| points[*a.1].x.total_cmp(&points[*b.1].x))
    else {
        return;
    };
    let mp = points[m];

    // Nearest ring edge hit by a ray from M towards +x
    let n = ring.len();
    let mut best: Option<(f64, usize)> = None;
    for i in 0..n {
        let a = points[ring[i]];
        let b = points[ring[(i + 1) % n]];
        if (a.y > mp.y) == (b.y > mp.y) || (a.y - b.y).abs() < EPS {
            continue;
        }
        let x = a.x + (mp.y - a.y) * (b.x - a.x) / (b.y - a.y);
        if x < mp.x - EPS {
            continue;
        }
        if best.map_or(true, |(bx, _)| x < bx) {
            let pick = if a.x > b.x { i } else { (i + 1) % n };
            best = Some((x, pick));
        }
    }
    let Some((hit_x, mut p_pos)) = best else {
        tracing::warn!("hole not enclosed by outer contour, skipping");
        return;
    };

    // A ring vertex inside triangle (M, I, P) would block the bridge; take the
    // one closest in angle to the ray instead.
    let hit = Point::new(hit_x, mp.y);
    let p = points[ring[p_pos]];
    let (t0, t1, t2) = if cross(mp, hit, p) >= 0.0 { (mp, hit, p) } else { (mp, p, hit) };
    let mut best_tan = f64::MAX;
    for (pos, &idx) in ring.iter().enumerate() {
        let q = points[idx];
        if pos == p_pos || q == p || q.x < mp.x {
            continue;
        }
        if point_in_triangle(q, t0, t1, t2) {
            let tan = (q.y - mp.y).abs() / (q.x - mp.x).max(EPS);
            if tan < best_tan {
                best_tan = tan;
                p_pos = pos;
            }
        }
    }

    let mut spliced = Vec::with_capacity(ring.len() + hole.len() + 2);
    spliced.extend_from_slice(&ring[..=p_pos]);
    spliced.extend(hole[m_pos..].iter().chain(hole[..m_pos].iter()).copied());
    spliced.push(m);
    spliced.push(ring[p_pos]);
    spliced.extend_from_slice(&ring[p_pos + 1..]);
    *ring = spliced;
}

fn ear_clip(points: &[Point], mut ring: Vec<usize>) -> Vec<[usize; 3]> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() > 3 {
        let n = ring.len();
        let mut clipped = false;

        for i in 0..n {
            let (ip, ic, inx) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            let (a, b, c) = (points[ip], points[ic], points[inx]);
            if cross(a, b, c) <= EPS {
                continue;
            }
            let blocked = ring.iter().any(|&j| {
                let q = points[j];
                q != a && q != b && q != c && point_in_triangle(q, a, b, c)
            });
            if blocked {
                continue;
            }
            triangles.push([ip, ic, inx]);
            ring.remove(i);
            clipped = true;
            break;
        }

        if !clipped {
            // Degenerate remainder (collinear or self-touching); drop a vertex
            // so the loop always terminates.
            let removed = ring.remove(0);
            tracing::debug!("ear clipping stalled, dropping vertex {removed}");
        }
    }

    if ring.len() == 3 && cross(points[ring[0]], points[ring[1]], points[ring[2]]) > EPS {
        triangles.push([ring[0], ring[1], ring[2]]);
    }

    triangles
}
