//! Inverse square root strategies and the L2 row normalizer built on them.
//!
//! Four ways of computing `1/sqrt(x)` live in [`inv_sqrt`]: a clamped
//! lookup table, the bit-level seed with one Newton-Raphson step, the
//! hardware reciprocal square root estimate, and the exact IEEE result.
//! [`Normalizer`] scales a row by whichever one a [`Method`] selects, and
//! [`run`] drives a whole comma-separated matrix through it while sampling
//! process resource usage around the loop.
//!
//! ```
//! use fastnorm::{Method, normalize_feature_vector};
//!
//! let mut row = [1.0f32, 2.0, 2.0];
//! normalize_feature_vector(&mut row, Method::Exact);
//! assert!((row[0] - 1.0 / 3.0).abs() < 1e-6);
//! ```

pub mod config;
pub mod error;
pub mod inv_sqrt;
pub mod matrix;
pub mod normalize;
pub mod report;
pub mod usage;

pub use config::{ReportFormat, RunConfig};
pub use error::{FastNormError, Result};
pub use inv_sqrt::{
    LookupTable, QUAKE_MAGIC, TABLE_SIZE, hardware_rsqrt_available, inv_sqrt_exact,
    inv_sqrt_hardware, inv_sqrt_lookup, inv_sqrt_quake,
};
pub use matrix::FeatureMatrix;
pub use normalize::{Method, Normalizer, normalize_feature_vector, sum_of_squares};
pub use report::{RunReport, run, run_matrix};
pub use usage::ResourceUsage;
