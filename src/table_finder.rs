//! Ruled-table detection from page edges.
//!
//! Edges are snapped onto shared grid lines, joined where collinear pieces
//! touch, and intersected. Each intersection becomes a candidate cell corner;
//! the smallest rectangle whose four corners are intersections connected by
//! shared edges is a cell. Cells that share corners form one table.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{BBox, DetectedTable, Edge, Orientation, PageLayout, TableRow};
use crate::options::TableSettings;

/// Shorter segments (hairline rect sides, dots) never become grid lines.
const EDGE_PREFILTER_LENGTH: f64 = 1.0;

/// Coordinates are compared on a 1/1000 pt lattice.
type Key = i64;

#[allow(clippy::cast_possible_truncation)]
fn key(value: f64) -> Key {
    (value * 1000.0).round() as Key
}

#[allow(clippy::cast_precision_loss)]
fn unkey(value: Key) -> f64 {
    value as f64 / 1000.0
}

fn position(edge: &Edge) -> f64 {
    match edge.orientation {
        Orientation::Horizontal => edge.top,
        Orientation::Vertical => edge.x0,
    }
}

fn set_position(edge: &mut Edge, value: f64) {
    match edge.orientation {
        Orientation::Horizontal => {
            edge.top = value;
            edge.bottom = value;
        }
        Orientation::Vertical => {
            edge.x0 = value;
            edge.x1 = value;
        }
    }
}

fn span(edge: &Edge) -> (f64, f64) {
    match edge.orientation {
        Orientation::Horizontal => (edge.x0, edge.x1),
        Orientation::Vertical => (edge.top, edge.bottom),
    }
}

fn set_span(edge: &mut Edge, start: f64, end: f64) {
    match edge.orientation {
        Orientation::Horizontal => {
            edge.x0 = start;
            edge.x1 = end;
        }
        Orientation::Vertical => {
            edge.top = start;
            edge.bottom = end;
        }
    }
}

/// Moves parallel edges whose offsets chain within `tolerance` onto their mean offset.
pub(crate) fn snap_edges(edges: &[Edge], tolerance: f64) -> Vec<Edge> {
    let mut snapped = Vec::with_capacity(edges.len());
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        let mut group = edges
            .iter()
            .filter(|edge| edge.orientation == orientation)
            .copied()
            .collect::<Vec<_>>();
        group.sort_by(|a, b| position(a).total_cmp(&position(b)));

        let mut cluster: Vec<Edge> = Vec::new();
        for edge in group {
            if let Some(last) = cluster.last()
                && position(&edge) - position(last) > tolerance
            {
                flush_cluster(&mut cluster, &mut snapped);
            }
            cluster.push(edge);
        }
        flush_cluster(&mut cluster, &mut snapped);
    }
    snapped
}

#[allow(clippy::cast_precision_loss)]
fn flush_cluster(cluster: &mut Vec<Edge>, snapped: &mut Vec<Edge>) {
    if cluster.is_empty() {
        return;
    }
    let mean = cluster.iter().map(position).sum::<f64>() / cluster.len() as f64;
    for mut edge in cluster.drain(..) {
        set_position(&mut edge, mean);
        snapped.push(edge);
    }
}

/// Merges collinear edges on the same grid line whose gaps are within `tolerance`.
pub(crate) fn join_edges(edges: &[Edge], tolerance: f64) -> Vec<Edge> {
    let mut lines: BTreeMap<(u8, Key), Vec<Edge>> = BTreeMap::new();
    for edge in edges {
        let axis = match edge.orientation {
            Orientation::Horizontal => 0,
            Orientation::Vertical => 1,
        };
        lines
            .entry((axis, key(position(edge))))
            .or_default()
            .push(*edge);
    }

    let mut joined = Vec::new();
    for mut line in lines.into_values() {
        line.sort_by(|a, b| span(a).0.total_cmp(&span(b).0));
        let mut current: Option<Edge> = None;
        for edge in line {
            match current.as_mut() {
                Some(open) if span(&edge).0 <= span(open).1 + tolerance => {
                    let (start, end) = span(open);
                    set_span(open, start, end.max(span(&edge).1));
                }
                _ => {
                    joined.extend(current.take());
                    current = Some(edge);
                }
            }
        }
        joined.extend(current);
    }
    joined
}

/// Edge ids meeting at one grid point.
#[derive(Debug, Default, Clone)]
struct Intersection {
    vertical: BTreeSet<usize>,
    horizontal: BTreeSet<usize>,
}

type Point = (Key, Key);

fn find_intersections(edges: &[Edge], tolerance: f64) -> BTreeMap<Point, Intersection> {
    let mut points: BTreeMap<Point, Intersection> = BTreeMap::new();
    let verticals = edges
        .iter()
        .enumerate()
        .filter(|(_, edge)| edge.orientation == Orientation::Vertical);
    for (v_id, v) in verticals {
        let horizontals = edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| edge.orientation == Orientation::Horizontal);
        for (h_id, h) in horizontals {
            if v.top <= h.top + tolerance
                && v.bottom >= h.top - tolerance
                && v.x0 >= h.x0 - tolerance
                && v.x0 <= h.x1 + tolerance
            {
                let entry = points.entry((key(v.x0), key(h.top))).or_default();
                entry.vertical.insert(v_id);
                entry.horizontal.insert(h_id);
            }
        }
    }
    points
}

fn edge_connects(points: &BTreeMap<Point, Intersection>, a: Point, b: Point) -> bool {
    let (Some(first), Some(second)) = (points.get(&a), points.get(&b)) else {
        return false;
    };
    if a.0 == b.0 && !first.vertical.is_disjoint(&second.vertical) {
        return true;
    }
    a.1 == b.1 && !first.horizontal.is_disjoint(&second.horizontal)
}

fn find_cells(points: &BTreeMap<Point, Intersection>) -> Vec<BBox> {
    let sorted = points.keys().copied().collect::<Vec<_>>();
    let mut cells = Vec::new();

    for (index, &corner) in sorted.iter().enumerate() {
        let rest = &sorted[index + 1..];
        let below = rest.iter().filter(|point| point.0 == corner.0);
        let right = rest
            .iter()
            .filter(|point| point.1 == corner.1)
            .collect::<Vec<_>>();

        let cell = below
            .filter(|&&below_pt| edge_connects(points, corner, below_pt))
            .find_map(|&below_pt| {
                right.iter().find_map(|&&right_pt| {
                    let bottom_right = (right_pt.0, below_pt.1);
                    (edge_connects(points, corner, right_pt)
                        && points.contains_key(&bottom_right)
                        && edge_connects(points, bottom_right, right_pt)
                        && edge_connects(points, bottom_right, below_pt))
                    .then(|| {
                        BBox::new(
                            unkey(corner.0),
                            unkey(corner.1),
                            unkey(bottom_right.0),
                            unkey(bottom_right.1),
                        )
                    })
                })
            });
        cells.extend(cell);
    }
    cells
}

fn corners(cell: &BBox) -> [Point; 4] {
    [
        (key(cell.x0), key(cell.top)),
        (key(cell.x0), key(cell.bottom)),
        (key(cell.x1), key(cell.top)),
        (key(cell.x1), key(cell.bottom)),
    ]
}

/// Groups cells sharing at least one corner; single-cell groups are not tables.
fn group_cells(cells: Vec<BBox>) -> Vec<Vec<BBox>> {
    let mut remaining = cells;
    let mut tables = Vec::new();

    while !remaining.is_empty() {
        let mut table_corners: BTreeSet<Point> = BTreeSet::new();
        let mut table_cells: Vec<BBox> = Vec::new();
        loop {
            let before = table_cells.len();
            let mut index = 0;
            while index < remaining.len() {
                let cell_corners = corners(&remaining[index]);
                if table_cells.is_empty()
                    || cell_corners
                        .iter()
                        .any(|corner| table_corners.contains(corner))
                {
                    table_corners.extend(cell_corners);
                    table_cells.push(remaining.remove(index));
                } else {
                    index += 1;
                }
            }
            if table_cells.len() == before {
                break;
            }
        }
        tables.push(table_cells);
    }

    tables.sort_by(|a, b| {
        let top_left = |cells: &[BBox]| {
            cells
                .iter()
                .map(|cell| (key(cell.top), key(cell.x0)))
                .min()
                .unwrap_or((0, 0))
        };
        top_left(a).cmp(&top_left(b))
    });
    tables.retain(|cells| cells.len() > 1);
    tables
}

/// Lays cells out as rows over the table's distinct column positions.
fn build_rows(cells: &[BBox]) -> Vec<TableRow> {
    let columns = cells
        .iter()
        .map(|cell| key(cell.x0))
        .collect::<BTreeSet<_>>();

    let mut rows: BTreeMap<Key, BTreeMap<Key, BBox>> = BTreeMap::new();
    for cell in cells {
        rows.entry(key(cell.top))
            .or_default()
            .insert(key(cell.x0), *cell);
    }

    rows.into_values()
        .map(|by_column| TableRow {
            cells: columns
                .iter()
                .map(|column| by_column.get(column).copied())
                .collect(),
        })
        .collect()
}

pub(crate) fn find_tables(page: &PageLayout, settings: &TableSettings) -> Vec<DetectedTable> {
    let candidates = page
        .edges
        .iter()
        .filter(|edge| edge.length() >= EDGE_PREFILTER_LENGTH)
        .copied()
        .collect::<Vec<_>>();
    let snapped = snap_edges(&candidates, settings.snap_tolerance);
    let edges = join_edges(&snapped, settings.join_tolerance)
        .into_iter()
        .filter(|edge| edge.length() >= settings.edge_min_length)
        .collect::<Vec<_>>();

    let points = find_intersections(&edges, settings.intersection_tolerance);
    let cells = find_cells(&points);

    group_cells(cells)
        .into_iter()
        .map(|cells| {
            let bbox = cells
                .iter()
                .skip(1)
                .fold(cells[0], |acc, cell| acc.union(cell));
            DetectedTable {
                page: page.page_number,
                bbox,
                rows: build_rows(&cells),
            }
        })
        .collect()
}
