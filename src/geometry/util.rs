//! Geometric utilities: circumcircles, triangles, and point generators.

pub mod circumcircle;
pub mod point_generation;

pub use circumcircle::{Circumcircle, CircumcenterError, Triangle};
pub use point_generation::{
    RandomPointGenerationError, generate_grid_points, generate_points_in_triangle_seeded,
    generate_random_points, generate_random_points_seeded,
};
