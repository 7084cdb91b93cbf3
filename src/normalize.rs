use std::fmt;

use serde::Serialize;

use crate::inv_sqrt::{LookupTable, inv_sqrt_exact, inv_sqrt_hardware, inv_sqrt_quake};
use crate::matrix::FeatureMatrix;

/// Inverse square root strategy applied to every row of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Clamped, quantized table lookup.
    Lookup,
    /// Bit-level seed plus one Newton-Raphson step.
    Quake,
    /// Unrefined hardware reciprocal square root estimate.
    Hardware,
    /// `1/sqrt(x)`.
    Exact,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Lookup, Method::Quake, Method::Hardware, Method::Exact];

    /// `1` lookup, `2` bit hack, `3` hardware; every other code is exact.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Method::Lookup,
            2 => Method::Quake,
            3 => Method::Hardware,
            _ => Method::Exact,
        }
    }

    /// Parse a method argument the way C's `atoi` would: optional leading
    /// whitespace and sign, then as many digits as follow. Anything else
    /// reads as `0`, which selects [`Method::Exact`].
    pub fn from_arg(arg: &str) -> Self {
        let s = arg.trim_start();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let mut code: i64 = 0;
        for b in digits.bytes().take_while(u8::is_ascii_digit) {
            code = code.saturating_mul(10).saturating_add(i64::from(b - b'0'));
        }
        Self::from_code(if negative { -code } else { code })
    }

    pub fn code(self) -> i64 {
        match self {
            Method::Lookup => 1,
            Method::Quake => 2,
            Method::Hardware => 3,
            Method::Exact => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Lookup => "Lookup Table",
            Method::Quake => "Quake III",
            Method::Hardware => "Hardware rsqrt",
            Method::Exact => "Default inversion",
        }
    }

    /// Apply this strategy to a single scalar.
    #[inline]
    pub fn inv_sqrt(self, table: &LookupTable, x: f32) -> f32 {
        match self {
            Method::Lookup => table.inv_sqrt(x),
            Method::Quake => inv_sqrt_quake(x),
            Method::Hardware => inv_sqrt_hardware(x),
            Method::Exact => inv_sqrt_exact(x),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row normalizer bound to one strategy and one lookup table.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'t> {
    method: Method,
    table: &'t LookupTable,
}

impl Normalizer<'static> {
    /// Normalizer backed by the process-wide table.
    pub fn new(method: Method) -> Self {
        Self::with_table(method, LookupTable::shared())
    }
}

impl<'t> Normalizer<'t> {
    pub fn with_table(method: Method, table: &'t LookupTable) -> Self {
        Self { method, table }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Scale `v` in place by the selected inverse square root of its sum of
    /// squares.
    ///
    /// No guard for a zero sum: the exact strategy turns an all-zero row into
    /// NaN, while the approximate strategies keep the finite scale factor
    /// they produce for `0.0`.
    pub fn normalize(&self, v: &mut [f32]) {
        let inv = self.method.inv_sqrt(self.table, sum_of_squares(v));
        for x in v.iter_mut() {
            *x *= inv;
        }
    }

    /// Normalize every row of `matrix`.
    pub fn normalize_rows(&self, matrix: &mut FeatureMatrix) {
        for row in matrix.rows_mut() {
            self.normalize(row);
        }
    }
}

/// Σ v[i]², accumulated in `f32` in index order.
#[inline]
pub fn sum_of_squares(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum()
}

/// In-place L2 normalization using the shared lookup table.
pub fn normalize_feature_vector(v: &mut [f32], method: Method) {
    Normalizer::new(method).normalize(v);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm_sq(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum()
    }

    #[test]
    fn method_codes() {
        assert_eq!(Method::from_code(1), Method::Lookup);
        assert_eq!(Method::from_code(2), Method::Quake);
        assert_eq!(Method::from_code(3), Method::Hardware);
        assert_eq!(Method::from_code(4), Method::Exact);
        assert_eq!(Method::from_code(0), Method::Exact);
        assert_eq!(Method::from_code(-2), Method::Exact);
        for m in Method::ALL {
            assert_eq!(Method::from_code(m.code()), m);
        }
    }

    #[test]
    fn method_from_arg_is_lenient() {
        assert_eq!(Method::from_arg("2"), Method::Quake);
        assert_eq!(Method::from_arg("  3"), Method::Hardware);
        assert_eq!(Method::from_arg("+1"), Method::Lookup);
        assert_eq!(Method::from_arg("1abc"), Method::Lookup);
        assert_eq!(Method::from_arg("-1"), Method::Exact);
        assert_eq!(Method::from_arg("quake"), Method::Exact);
        assert_eq!(Method::from_arg(""), Method::Exact);
        assert_eq!(Method::from_arg("99999999999999999999999"), Method::Exact);
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::Lookup.to_string(), "Lookup Table");
        assert_eq!(Method::Quake.to_string(), "Quake III");
        assert_eq!(Method::Hardware.to_string(), "Hardware rsqrt");
        assert_eq!(Method::Exact.to_string(), "Default inversion");
    }

    #[test]
    fn exact_normalize_simple_vector() {
        let mut v = vec![3.0f32, 4.0];
        normalize_feature_vector(&mut v, Method::Exact);
        // L2 norm of [3, 4] is 5, so normalized should be [0.6, 0.8]
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn exact_normalize_maintains_unit_length() {
        let mut v = vec![1.0f32, 2.0, 3.0, 4.0, 5.0];
        normalize_feature_vector(&mut v, Method::Exact);
        assert!((norm_sq(&v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn exact_normalize_negative_values() {
        let mut v = vec![-3.0f32, -4.0];
        normalize_feature_vector(&mut v, Method::Exact);
        assert!((v[0] + 0.6).abs() < 1e-6);
        assert!((v[1] + 0.8).abs() < 1e-6);
    }

    #[test]
    fn exact_normalize_zero_vector_is_not_masked() {
        let mut v = vec![0.0f32, 0.0, 0.0];
        normalize_feature_vector(&mut v, Method::Exact);
        // 0 * inf
        assert!(v.iter().all(|x| x.is_nan()));
    }

    #[test]
    fn quake_normalize_within_half_percent() {
        let mut v: Vec<f32> = (1..50).map(|i| i as f32 * 0.37).collect();
        normalize_feature_vector(&mut v, Method::Quake);
        assert!((norm_sq(&v) - 1.0).abs() < 0.005);
    }

    #[test]
    fn quake_normalize_zero_vector_stays_finite() {
        let mut v = vec![0.0f32; 4];
        normalize_feature_vector(&mut v, Method::Quake);
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    fn lookup_normalize_zero_vector_stays_finite() {
        let mut v = vec![0.0f32; 4];
        normalize_feature_vector(&mut v, Method::Lookup);
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    fn hardware_normalize_zero_vector_stays_finite() {
        let mut v = vec![0.0f32; 4];
        normalize_feature_vector(&mut v, Method::Hardware);
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    fn lookup_normalize_saturates_above_one() {
        // Sum of squares 9 clamps to the top slot, so the scale is ~1/sqrt(1).
        let mut v = vec![1.0f32, 2.0, 2.0];
        normalize_feature_vector(&mut v, Method::Lookup);
        let scale = LookupTable::shared().inv_sqrt(1.0);
        assert_eq!(v, vec![scale, 2.0 * scale, 2.0 * scale]);
        assert!((scale - 1.0).abs() < 1e-4);
    }

    #[test]
    fn lookup_normalize_inside_table_domain() {
        let mut v = vec![0.3f32, 0.4];
        normalize_feature_vector(&mut v, Method::Lookup);
        // sum 0.25 quantizes to slot 2499, within a few hundredths of 2.0
        assert!((norm_sq(&v) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn hardware_normalize_close_to_unit() {
        let mut v = vec![1.0f32, 2.0, 3.0, 4.0];
        normalize_feature_vector(&mut v, Method::Hardware);
        assert!((norm_sq(&v) - 1.0).abs() < 0.01);
    }

    #[test]
    fn every_method_handles_empty_slice() {
        for m in Method::ALL {
            let mut v: Vec<f32> = vec![];
            normalize_feature_vector(&mut v, m);
            assert!(v.is_empty());
        }
    }

    #[test]
    fn normalize_preserves_direction() {
        for m in Method::ALL {
            let mut v = vec![1.0f32, 2.0, 3.0];
            normalize_feature_vector(&mut v, m);
            assert!((v[1] / v[0] - 2.0).abs() < 1e-5, "{m}");
            assert!((v[2] / v[0] - 3.0).abs() < 1e-5, "{m}");
        }
    }

    #[test]
    fn owned_table_matches_shared() {
        let table = LookupTable::new();
        let owned = Normalizer::with_table(Method::Lookup, &table);
        let shared = Normalizer::new(Method::Lookup);
        let mut a = vec![0.1f32, 0.2, 0.3];
        let mut b = a.clone();
        owned.normalize(&mut a);
        shared.normalize(&mut b);
        assert_eq!(a, b);
        assert_eq!(owned.method(), Method::Lookup);
    }

    #[test]
    fn sum_of_squares_accumulates_in_order() {
        assert_eq!(sum_of_squares(&[1.0, 2.0, 2.0]), 9.0);
        assert_eq!(sum_of_squares(&[]), 0.0);
    }
}
