//! Integration tests for single-point insertion.
//!
//! Each scenario runs twice: once inside a finite bounding triangle and once
//! inside the same triangle built from finite vertices under a symbolic root.
//! Point keys are looked up by coordinates so the assertions read the same in
//! both modes.

use delaunay_dag::geometry::util::generate_points_in_triangle_seeded;
use delaunay_dag::prelude::*;

// =============================================================================
// FIXTURES
// =============================================================================

/// Corners of the frame every scenario runs inside.
const FRAME: [Point; 3] = [
    Point::new(-100.0, -100.0),
    Point::new(100.0, -100.0),
    Point::new(0.0, 100.0),
];

/// Finite bounding triangle equal to the frame.
fn bounded_frame() -> DelaunayTriangulation {
    DelaunayTriangulation::new_bounded(FRAME).unwrap()
}

/// Symbolic root at the frame's apex, with the two lower corners inserted.
fn symbolic_frame() -> DelaunayTriangulation {
    let mut dt = DelaunayTriangulation::new_symbolic(FRAME[2]).unwrap();
    dt.insert(FRAME[0]).unwrap();
    dt.insert(FRAME[1]).unwrap();
    dt
}

fn vertex_at(dt: &DelaunayTriangulation, point: Point) -> VertexKey {
    dt.finite_vertices()
        .find_map(|(key, p)| (p == point).then_some(key))
        .unwrap_or_else(|| panic!("no vertex at {point}"))
}

fn incident_faces(dt: &DelaunayTriangulation, v: VertexKey) -> usize {
    dt.live_faces()
        .into_iter()
        .filter(|&f| dt.tds().face(f).is_some_and(|face| face.has_corner(v)))
        .count()
}

fn has_edge(dt: &DelaunayTriangulation, a: Point, b: Point) -> bool {
    dt.tds()
        .find_half_edge(vertex_at(dt, a), vertex_at(dt, b))
        .unwrap()
        .is_some()
}

fn sorted_live_faces(dt: &DelaunayTriangulation) -> Vec<FaceKey> {
    let mut faces = dt.live_faces();
    faces.sort();
    faces
}

// =============================================================================
// SCENARIOS
// =============================================================================

macro_rules! insertion_scenarios {
    ($mode:ident, $frame:expr) => {
        pastey::paste! {
            #[test]
            fn [<test_first_interior_point_splits_a_face_ $mode>]() {
                let mut dt = $frame;
                let before = dt.number_of_faces();

                let p = Point::new(0.0, 0.0);
                let v = dt.insert(p).unwrap();

                let stats = dt.last_insertion_statistics().unwrap();
                assert_eq!(stats.operation, TopologicalOperation::SplitFace);
                assert_eq!(stats.flips, 0);
                assert_eq!(dt.number_of_faces(), before + 2);
                assert_eq!(incident_faces(&dt, v), 3);
                assert_eq!(dt.vertex_neighbors(v).unwrap().len(), 3);

                let found = dt.find_face(p).unwrap();
                assert!(dt.tds().face(found).unwrap().has_corner(v));
                dt.validate().unwrap();
                dt.validate_delaunay().unwrap();
            }

            #[test]
            fn [<test_illegal_edge_is_flipped_once_ $mode>]() {
                let mut dt = $frame;
                let p = Point::new(0.0, 0.0);
                let q = Point::new(50.0, -52.0);
                dt.insert(p).unwrap();
                assert!(has_edge(&dt, p, FRAME[1]));

                // q sits just below the diagonal p-(100,-100), which puts the
                // apex inside the circumcircle of the new face (p, corner, q).
                dt.insert(q).unwrap();

                let stats = dt.last_insertion_statistics().unwrap();
                assert_eq!(stats.operation, TopologicalOperation::SplitFace);
                assert_eq!(stats.flips, 1);
                assert!(!has_edge(&dt, p, FRAME[1]));
                assert!(has_edge(&dt, q, FRAME[2]));
                dt.validate().unwrap();
                dt.validate_delaunay().unwrap();
            }

            #[test]
            fn [<test_point_on_interior_edge_splits_the_edge_ $mode>]() {
                let mut dt = $frame;
                let p = Point::new(0.0, 0.0);
                dt.insert(p).unwrap();
                let before = dt.number_of_faces();

                let m = Point::new(-50.0, -50.0);
                assert!(matches!(dt.locate(m).unwrap(), LocateResult::OnEdge(_)));
                let v = dt.insert(m).unwrap();

                let stats = dt.last_insertion_statistics().unwrap();
                assert_eq!(stats.operation, TopologicalOperation::SplitEdge);
                assert_eq!(stats.flips, 0);
                assert_eq!(dt.number_of_faces(), before + 2);
                assert_eq!(incident_faces(&dt, v), 4);
                assert_eq!(dt.vertex_neighbors(v).unwrap().len(), 4);
                assert!(!has_edge(&dt, p, FRAME[0]));
                assert!(has_edge(&dt, p, m));
                assert!(has_edge(&dt, m, FRAME[0]));
                dt.validate().unwrap();
                dt.validate_delaunay().unwrap();
            }

            #[test]
            fn [<test_duplicate_point_leaves_mesh_untouched_ $mode>]() {
                let mut dt = $frame;
                let p = Point::new(3.0, -7.0);
                let v = dt.insert(p).unwrap();
                let faces = sorted_live_faces(&dt);
                let nodes = dt.hierarchy().number_of_nodes();

                let err = dt.insert(p).unwrap_err();
                assert_eq!(err, InsertionError::PointExists { point: p, existing: v });
                assert!(err.is_recoverable());

                let outcome = dt.try_insert(p, None).unwrap();
                assert!(outcome.is_skipped());
                assert_eq!(outcome.vertex_key(), None);

                assert_eq!(sorted_live_faces(&dt), faces);
                assert_eq!(dt.hierarchy().number_of_nodes(), nodes);
                dt.validate().unwrap();
            }

            #[test]
            fn [<test_frame_corner_is_a_duplicate_ $mode>]() {
                let mut dt = $frame;
                for corner in FRAME {
                    assert!(matches!(
                        dt.insert(corner),
                        Err(InsertionError::PointExists { .. })
                    ));
                }
            }

            #[test]
            fn [<test_sequential_insertions_stay_valid_ $mode>]() {
                let mut dt = $frame;
                let inner = [
                    Point::new(-80.0, -90.0),
                    Point::new(80.0, -90.0),
                    Point::new(0.0, 70.0),
                ];
                let points = generate_points_in_triangle_seeded(60, inner, 0xD1A6).unwrap();
                let base = dt.number_of_vertices();
                for (i, p) in points.iter().enumerate() {
                    dt.insert(*p).unwrap();
                    // Euler: a triangulated triangle with V vertices has 2V - 5 faces.
                    assert_eq!(dt.number_of_faces(), 2 * (base + i + 1) - 5);
                }
                dt.validate().unwrap();
                dt.validate_delaunay().unwrap();
                assert_eq!(dt.live_edges().len(), 3 * dt.number_of_vertices() - 6);
            }
        }
    };
}

insertion_scenarios!(bounded, bounded_frame());
insertion_scenarios!(symbolic, symbolic_frame());

// =============================================================================
// MODE-SPECIFIC BEHAVIOUR
// =============================================================================

#[test]
fn test_first_symbolic_insertion_yields_three_faces() {
    let mut dt = DelaunayTriangulation::new_symbolic(Point::new(0.0, 10.0)).unwrap();
    assert_eq!(dt.number_of_faces(), 1);

    let v = dt.insert(Point::new(-2.0, 1.0)).unwrap();
    assert_eq!(dt.number_of_faces(), 3);
    for face in dt.live_faces() {
        assert!(dt.tds().face(face).unwrap().has_corner(v));
    }
    // Top and Bottom never get a circumcircle.
    let symbolic_faces = dt
        .live_faces()
        .into_iter()
        .filter(|&f| dt.tds().face(f).unwrap().circumcircle().is_none())
        .count();
    assert_eq!(symbolic_faces, 3);
    dt.validate().unwrap();
}

#[test]
fn test_symbolic_mode_rejects_points_above_the_apex() {
    let mut dt = symbolic_frame();
    let faces = sorted_live_faces(&dt);
    for p in [
        Point::new(0.0, 150.0),
        // Same height as the apex but to its right is lexicographically above.
        Point::new(10.0, 100.0),
    ] {
        assert!(matches!(
            dt.insert(p),
            Err(InsertionError::PointOutsideBounds { .. })
        ));
        assert_eq!(dt.locate(p).unwrap(), LocateResult::Outside);
    }
    assert_eq!(sorted_live_faces(&dt), faces);

    // Same height, to the left, is still below the apex.
    dt.insert(Point::new(-10.0, 100.0)).unwrap();
    dt.validate().unwrap();
}

#[test]
fn test_symbolic_mode_accepts_points_outside_the_finite_hull() {
    let mut dt = symbolic_frame();
    for p in [
        Point::new(-500.0, -300.0),
        Point::new(400.0, 90.0),
        Point::new(0.0, -1000.0),
    ] {
        dt.insert(p).unwrap();
    }
    assert_eq!(dt.number_of_finite_vertices(), 6);
    dt.validate().unwrap();
    dt.validate_delaunay().unwrap();
}

#[test]
fn test_bounded_mode_rejects_outside_and_boundary_points() {
    let mut dt = bounded_frame();
    let faces = sorted_live_faces(&dt);
    for p in [
        Point::new(0.0, 150.0),
        Point::new(-200.0, 0.0),
        // On the bottom side of the frame.
        Point::new(0.0, -100.0),
    ] {
        let err = dt.insert(p).unwrap_err();
        assert!(matches!(err, InsertionError::PointOutsideBounds { .. }));
        assert!(err.is_recoverable());
    }
    assert_eq!(sorted_live_faces(&dt), faces);
    assert_eq!(dt.number_of_finite_vertices(), 3);
}

#[test]
fn test_bounded_mode_accepts_points_just_inside_the_frame() {
    for offset in [1e-6, 1e-8, 1e-9] {
        let mut dt = bounded_frame();
        let p = Point::new(40.0, -100.0 + offset);
        let v = dt.insert(p).unwrap();
        let stats = dt.last_insertion_statistics().unwrap();
        assert_eq!(stats.operation, TopologicalOperation::SplitFace);
        assert!(stats.flags.fallback_inside_split);
        assert_eq!(dt.locate(p).unwrap(), LocateResult::OnVertex(v));
        dt.validate().unwrap();
        dt.validate_delaunay().unwrap();
    }
}

#[test]
fn test_bounded_mode_rejects_points_just_beyond_the_frame() {
    let mut dt = bounded_frame();
    let p = Point::new(43.23, -100.00002);
    assert_eq!(
        dt.insert(p).unwrap_err(),
        InsertionError::PointOutsideBounds { point: p }
    );
    assert_eq!(dt.number_of_finite_vertices(), 3);
}

#[test]
fn test_invalid_coordinates_are_rejected() {
    let mut dt = bounded_frame();
    for p in [Point::new(f64::NAN, 0.0), Point::new(0.0, f64::INFINITY)] {
        assert!(matches!(dt.insert(p), Err(InsertionError::InvalidPoint(_))));
    }
    dt.validate().unwrap();
}

#[test]
fn test_vertex_data_survives_later_flips() {
    let mut dt: DelaunayTriangulation<u16> =
        DelaunayTriangulation::with_bounds(Bounds::Triangle(FRAME)).unwrap();
    let p = dt.insert_with_data(Point::new(0.0, 0.0), 7).unwrap();
    let q = dt.insert_with_data(Point::new(50.0, -52.0), 11).unwrap();
    assert_eq!(dt.last_insertion_statistics().unwrap().flips, 1);

    assert_eq!(dt.tds().vertex(p).unwrap().data(), Some(7));
    assert_eq!(dt.tds().vertex(q).unwrap().data(), Some(11));
    for corner in dt.bounding_vertices().iter() {
        assert_eq!(dt.tds().vertex(*corner).unwrap().data(), None);
    }
}
