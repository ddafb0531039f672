//! Degenerate and adversarial inputs.
//!
//! Grids (cocircular everywhere), collinear runs (repeated edge splits),
//! near-duplicates, points hugging existing edges, flip-budget rollback and
//! history compaction between insertions.

use delaunay_dag::geometry::util::{generate_grid_points, generate_random_points_seeded};
use delaunay_dag::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

const FRAME: [Point; 3] = [
    Point::new(-100.0, -100.0),
    Point::new(100.0, -100.0),
    Point::new(0.0, 100.0),
];

fn assert_valid(dt: &DelaunayTriangulation) {
    if let Err(report) = dt.validation_report(ValidationOptions {
        check_delaunay: true,
    }) {
        panic!("triangulation invalid: {report:?}");
    }
}

// =============================================================================
// COCIRCULAR AND COLLINEAR INPUT
// =============================================================================

macro_rules! degenerate_input_tests {
    ($mode:ident, $new:expr) => {
        pastey::paste! {
            #[test]
            fn [<test_grid_terminates_and_stays_delaunay_ $mode>]() {
                let mut dt: DelaunayTriangulation = $new;
                let grid = generate_grid_points(7, 10.0, Point::new(-30.0, -60.0)).unwrap();
                let mut total_flips = 0;
                for p in &grid {
                    dt.insert(*p).unwrap();
                    let stats = dt.last_insertion_statistics().unwrap();
                    assert!(!stats.flags.flip_skipped, "flip skipped inserting {p}");
                    total_flips += stats.flips;
                }
                assert_eq!(dt.number_of_finite_vertices(), 49 + FRAME_FINITE_CORNERS);
                // Cocircular quads are left alone, so legalization work stays
                // linear in the input.
                assert!(total_flips < 10 * grid.len(), "{total_flips} flips");
                assert_valid(&dt);
            }

            #[test]
            fn [<test_collinear_points_split_edges_ $mode>]() {
                let mut dt: DelaunayTriangulation = $new;
                // Endpoints first, then points that land on the growing segment.
                let xs = [-40.0, 40.0, 0.0, -20.0, 20.0, 10.0, -30.0, 30.0];
                let mut splits = 0;
                for x in xs {
                    dt.insert(Point::new(x, -20.0)).unwrap();
                    if dt.last_insertion_statistics().unwrap().operation
                        == TopologicalOperation::SplitEdge
                    {
                        splits += 1;
                    }
                }
                assert_eq!(splits, xs.len() - 2);
                assert_valid(&dt);

                let on_line: Vec<VertexKey> = dt
                    .finite_vertices()
                    .filter(|(_, p)| approx::abs_diff_eq!(p.y(), -20.0))
                    .map(|(v, _)| v)
                    .collect();
                assert_eq!(on_line.len(), xs.len());
            }

            #[test]
            fn [<test_concentric_rings_ $mode>]() {
                let mut dt: DelaunayTriangulation = $new;
                for ring in 1..=4_i32 {
                    let radius = 8.0 * f64::from(ring);
                    for k in 0..12_i32 {
                        let angle = std::f64::consts::TAU * f64::from(k) / 12.0;
                        let p = Point::new(radius * angle.cos(), radius.mul_add(angle.sin(), -30.0));
                        dt.insert(p).unwrap();
                    }
                }
                assert_valid(&dt);
            }

            #[test]
            fn [<test_near_duplicates_within_spacing_are_skipped_ $mode>]() {
                let config = TriangulationConfigBuilder::default()
                    .min_spacing(1e-3)
                    .build()
                    .unwrap();
                let template: DelaunayTriangulation = $new;
                let mut dt: DelaunayTriangulation =
                    DelaunayTriangulation::with_config(*template.bounds(), config).unwrap();
                for p in template.finite_vertices().map(|(_, p)| p) {
                    let _ = dt.try_insert(p, None).unwrap();
                }

                let v = dt.insert(Point::new(1.0, 1.0)).unwrap();
                for p in [
                    Point::new(1.0005, 1.0),
                    Point::new(1.0, 0.9995),
                    Point::new(1.0007, 1.0007),
                ] {
                    assert_eq!(
                        dt.insert(p).unwrap_err(),
                        InsertionError::PointExists { point: p, existing: v }
                    );
                }
                // Just outside the spacing radius.
                dt.insert(Point::new(1.002, 1.0)).unwrap();
                assert_valid(&dt);
            }
        }
    };
}

/// Finite corners of the bounded frame that are vertices in both modes.
const FRAME_FINITE_CORNERS: usize = 3;

fn symbolic_frame() -> DelaunayTriangulation {
    let mut dt = DelaunayTriangulation::new_symbolic(FRAME[2]).unwrap();
    dt.insert(FRAME[0]).unwrap();
    dt.insert(FRAME[1]).unwrap();
    dt
}

degenerate_input_tests!(bounded, DelaunayTriangulation::new_bounded(FRAME).unwrap());
degenerate_input_tests!(symbolic, symbolic_frame());

// =============================================================================
// POINTS HUGGING EXISTING EDGES
// =============================================================================

/// Insert `count` points placed on or within `1e-7` of random live edges,
/// checking the empty-circle property after every insertion.
fn insert_near_edges(dt: &mut DelaunayTriangulation, count: usize, seed: u64) {
    const OFFSETS: [f64; 5] = [0.0, 1e-7, -1e-7, 1e-9, -1e-9];
    let mut rng = StdRng::seed_from_u64(seed);
    let mut inserted = 0;
    for _ in 0..10 * count {
        if inserted == count {
            break;
        }
        let edges = dt.live_edges();
        let e = edges[rng.random_range(0..edges.len())];
        let tds = dt.tds();
        let ends = [tds.origin(e).unwrap(), tds.target(e).unwrap()]
            .map(|v| tds.position(v).unwrap().finite());
        let [Some(a), Some(b)] = ends else {
            continue;
        };
        let (dx, dy) = (b.x() - a.x(), b.y() - a.y());
        let length = dx.hypot(dy);
        let t = rng.random_range(0.2..0.8);
        let off = OFFSETS[rng.random_range(0..OFFSETS.len())];
        let p = Point::new(
            a.x() + t * dx - off * dy / length,
            a.y() + t * dy + off * dx / length,
        );
        match dt.insert(p) {
            Ok(_) => inserted += 1,
            Err(err) => assert!(err.is_recoverable(), "inserting {p}: {err}"),
        }
        if let Err(err) = dt.validate_delaunay() {
            panic!("after inserting {p} (offset {off}): {err}");
        }
    }
    assert_eq!(inserted, count);
    dt.validate().unwrap();
}

#[test]
fn test_points_hugging_edges_stay_delaunay_bounded() {
    for seed in [3, 24, 57] {
        let mut dt = DelaunayTriangulation::new_bounded(FRAME).unwrap();
        for p in generate_random_points_seeded(20, (-25.0, 25.0), seed).unwrap() {
            dt.insert(p).unwrap();
        }
        insert_near_edges(&mut dt, 60, seed);
    }
}

#[test]
fn test_points_hugging_edges_stay_delaunay_symbolic() {
    for seed in [5, 31] {
        let mut dt = symbolic_frame();
        for p in generate_random_points_seeded(20, (-25.0, 25.0), seed).unwrap() {
            dt.insert(p).unwrap();
        }
        insert_near_edges(&mut dt, 60, seed);
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

#[test]
fn test_flip_budget_failure_is_rolled_back_and_recoverable() {
    let config = TriangulationConfig {
        max_flips_per_insertion: Some(1),
        ..TriangulationConfig::default()
    };
    let mut dt: DelaunayTriangulation =
        DelaunayTriangulation::with_config(Bounds::Triangle(FRAME), config).unwrap();

    let points = generate_random_points_seeded(80, (-30.0, 30.0), 11).unwrap();
    let mut rejected = 0;
    for p in points {
        let faces = dt.number_of_faces();
        let vertices = dt.number_of_vertices();
        let nodes = dt.hierarchy().number_of_nodes();
        let stats = dt.last_insertion_statistics();
        match dt.insert(p) {
            Ok(_) => assert!(dt.last_insertion_statistics().unwrap().flips <= 1),
            Err(err) => {
                assert!(matches!(
                    err,
                    InsertionError::Flip(FlipError::FlipLimitExceeded { max_flips: 1, .. })
                ));
                assert!(err.is_recoverable());
                rejected += 1;
                assert_eq!(dt.number_of_faces(), faces);
                assert_eq!(dt.number_of_vertices(), vertices);
                assert_eq!(dt.hierarchy().number_of_nodes(), nodes);
                assert_eq!(dt.last_insertion_statistics(), stats);
            }
        }
        dt.validate().unwrap();
    }
    assert!(rejected > 0, "budget of one flip never hit");
    dt.validate_delaunay().unwrap();
}

#[test]
fn test_rejected_points_leave_no_trace() {
    let mut dt = DelaunayTriangulation::new_bounded(FRAME).unwrap();
    dt.insert(Point::new(0.0, 0.0)).unwrap();
    let snapshot = dt.clone();

    for p in [
        Point::new(0.0, 0.0),
        Point::new(500.0, 0.0),
        Point::new(f64::NAN, 1.0),
    ] {
        assert!(dt.insert(p).is_err());
    }

    let mut expected = snapshot.live_faces();
    expected.sort();
    let mut actual = dt.live_faces();
    actual.sort();
    assert_eq!(actual, expected);
    assert_eq!(
        dt.tds().number_of_half_edges(),
        snapshot.tds().number_of_half_edges()
    );
    assert_eq!(
        dt.hierarchy().number_of_nodes(),
        snapshot.hierarchy().number_of_nodes()
    );
}

// =============================================================================
// HISTORY COMPACTION
// =============================================================================

#[test]
fn test_compaction_between_insertions() {
    let mut dt = DelaunayTriangulation::new_symbolic(Point::new(0.0, 1000.0)).unwrap();
    let points = generate_random_points_seeded(300, (-50.0, 50.0), 42).unwrap();

    for chunk in points.chunks(50) {
        for &p in chunk {
            dt.insert(p).unwrap();
        }
        let stored_before = dt.tds().number_of_stored_faces();
        let removed = dt.compact_history();
        assert!(removed > 0);
        assert_eq!(dt.tds().number_of_stored_faces(), stored_before - removed);
        // Live faces plus the outer sentinel.
        assert_eq!(dt.tds().number_of_stored_faces(), dt.number_of_faces() + 1);
        assert_eq!(dt.hierarchy().number_of_nodes(), dt.number_of_faces());
        dt.validate().unwrap();
    }

    for (v, p) in dt.finite_vertices() {
        assert_eq!(dt.locate(p).unwrap(), LocateResult::OnVertex(v));
    }
    dt.validate_delaunay().unwrap();

    // A second compaction right away has nothing to drop.
    assert_eq!(dt.compact_history(), 0);
}

// =============================================================================
// LARGER INPUTS
// =============================================================================

#[test]
fn test_thousand_random_points() {
    let mut dt = DelaunayTriangulation::new_symbolic(Point::new(0.0, 1.0e6)).unwrap();
    let points = generate_random_points_seeded(1000, (-1.0e3, 1.0e3), 7).unwrap();
    for &p in &points {
        dt.insert(p).unwrap();
    }
    assert_eq!(dt.number_of_finite_vertices(), 1001);
    assert_eq!(dt.number_of_faces(), 1 + 2 * 1000);
    dt.validate().unwrap();
    dt.validate_delaunay().unwrap();
}

#[test]
fn test_tiny_coordinates() {
    let mut dt = DelaunayTriangulation::new_bounded([
        Point::new(0.0, 0.0),
        Point::new(1.0e-6, 0.0),
        Point::new(0.0, 1.0e-6),
    ])
    .unwrap();
    let config = TriangulationConfigBuilder::default()
        .min_spacing(0.0)
        .build()
        .unwrap();
    let mut fine: DelaunayTriangulation =
        DelaunayTriangulation::with_config(*dt.bounds(), config).unwrap();
    for (i, j) in [(1, 1), (2, 1), (1, 2), (3, 2), (2, 5)] {
        let p = Point::new(f64::from(i) * 1.0e-7, f64::from(j) * 1.0e-7);
        // Default spacing (1e-9) is far below the point distances here.
        dt.insert(p).unwrap();
        fine.insert(p).unwrap();
    }
    assert_valid(&dt);
    assert_valid(&fine);
}
