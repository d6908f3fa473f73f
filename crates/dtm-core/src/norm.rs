//! Robust norm family (C1): ρ(r/σ) and ρ'(r/σ) for four variants.
//!
//! Modeled as a tagged enum rather than a trait object — the norm is
//! fixed for the whole solve and the dispatch sits on the hot path of
//! [`crate::data_term`], so a `match` monomorphizes better than dynamic
//! dispatch (same tradeoff the teacher makes for `TerrainClass` in
//! `noise/params.rs`).

/// Default Huber threshold, taken from the original GEMAUT implementation.
pub const DEFAULT_HUBER_COEF: f64 = 1.2107;
/// Default Tukey threshold, taken from the original GEMAUT implementation.
pub const DEFAULT_TUKEY_COEF: f64 = 4.6851;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Norm {
    Huber { coef: f64 },
    Tukey { coef: f64, coef_sq_over_six: f64 },
    HuberTukey {
        huber_coef: f64,
        tukey_coef: f64,
        tukey_coef_sq_over_six: f64,
    },
    /// Ignores `σ` in both `distance` and `derivative` — legacy behavior
    /// preserved from the original source. Callers that rely on `σ`
    /// scaling the data term with `L2` should not expect it to.
    L2,
}

impl Norm {
    pub fn huber(coef: f64) -> Self {
        Norm::Huber { coef }
    }

    pub fn tukey(coef: f64) -> Self {
        Norm::Tukey {
            coef,
            coef_sq_over_six: coef * coef / 6.0,
        }
    }

    pub fn huber_tukey(huber_coef: f64, tukey_coef: f64) -> Self {
        Norm::HuberTukey {
            huber_coef,
            tukey_coef,
            tukey_coef_sq_over_six: tukey_coef * tukey_coef / 6.0,
        }
    }

    /// Parse a norm name as accepted by the CLI surface (spec §6).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "huber" => Some(Norm::huber(DEFAULT_HUBER_COEF)),
            "tukey" => Some(Norm::tukey(DEFAULT_TUKEY_COEF)),
            "hubertukey" => Some(Norm::huber_tukey(DEFAULT_HUBER_COEF, DEFAULT_TUKEY_COEF)),
            "L2" => Some(Norm::L2),
            _ => None,
        }
    }

    /// ρ(r/σ). Always non-negative.
    #[inline]
    pub fn distance(&self, r: f64, sigma: f64) -> f64 {
        match *self {
            Norm::Huber { coef } => huber_distance(r / sigma, coef),
            Norm::Tukey { coef, coef_sq_over_six } => tukey_distance(r / sigma, coef, coef_sq_over_six),
            Norm::HuberTukey {
                huber_coef,
                tukey_coef,
                tukey_coef_sq_over_six,
            } => {
                let u = r / sigma;
                if u > 0.0 {
                    huber_distance(u, huber_coef)
                } else {
                    tukey_distance(u, tukey_coef, tukey_coef_sq_over_six)
                }
            }
            Norm::L2 => l2_distance(r),
        }
    }

    /// (1/σ)·ρ'(r/σ).
    #[inline]
    pub fn derivative(&self, r: f64, sigma: f64) -> f64 {
        match *self {
            Norm::Huber { coef } => huber_derivative(r / sigma, coef) / sigma,
            Norm::Tukey { coef, .. } => tukey_derivative(r / sigma, coef) / sigma,
            Norm::HuberTukey {
                huber_coef,
                tukey_coef,
                ..
            } => {
                let u = r / sigma;
                let d = if u > 0.0 {
                    huber_derivative(u, huber_coef)
                } else {
                    tukey_derivative(u, tukey_coef)
                };
                d / sigma
            }
            Norm::L2 => l2_derivative(r),
        }
    }
}

#[inline]
fn huber_distance(u: f64, coef: f64) -> f64 {
    if u.abs() < coef {
        u * u / 2.0
    } else {
        coef * (u.abs() - coef / 2.0)
    }
}

#[inline]
fn huber_derivative(u: f64, coef: f64) -> f64 {
    if u.abs() < coef {
        u
    } else {
        coef.copysign(u)
    }
}

#[inline]
fn tukey_distance(u: f64, coef: f64, coef_sq_over_six: f64) -> f64 {
    if u.abs() < coef {
        let t = 1.0 - (u / coef) * (u / coef);
        coef_sq_over_six * (1.0 - t * t * t)
    } else {
        coef_sq_over_six
    }
}

#[inline]
fn tukey_derivative(u: f64, coef: f64) -> f64 {
    if u.abs() < coef {
        let t = 1.0 - (u / coef) * (u / coef);
        u * t * t
    } else {
        0.0
    }
}

/// Ignores `σ` — legacy behavior, see module docs.
#[inline]
fn l2_distance(val: f64) -> f64 {
    val * val / 2.0
}

/// Ignores `σ` — legacy behavior, see module docs.
#[inline]
fn l2_derivative(val: f64) -> f64 {
    val
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn huber_continuous_at_boundary() {
        let n = Norm::huber(DEFAULT_HUBER_COEF);
        let c = DEFAULT_HUBER_COEF;
        let at = n.distance(c, 1.0);
        let just_past = n.distance(c + 1e-6, 1.0);
        assert_abs_diff_eq!(at, c * c / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(at, just_past, epsilon = 1e-5);
    }

    #[test]
    fn huber_derivative_continuous_at_boundary() {
        let n = Norm::huber(DEFAULT_HUBER_COEF);
        let c = DEFAULT_HUBER_COEF;
        let below = n.derivative(c - 1e-9, 1.0);
        let above = n.derivative(c + 1e-9, 1.0);
        assert_abs_diff_eq!(below, above, epsilon = 1e-6);
    }

    #[test]
    fn tukey_zero_gradient_beyond_cutoff() {
        let n = Norm::tukey(DEFAULT_TUKEY_COEF);
        assert_eq!(n.derivative(100.0, 1.0), 0.0);
        assert_eq!(n.distance(100.0, 1.0), n.distance(1000.0, 1.0));
    }

    #[test]
    fn hubertukey_positive_half_matches_huber() {
        let ht = Norm::huber_tukey(DEFAULT_HUBER_COEF, DEFAULT_TUKEY_COEF);
        let huber = Norm::huber(DEFAULT_HUBER_COEF);
        for r in [0.1, 0.5, 1.0, 2.0, 5.0] {
            assert_abs_diff_eq!(ht.distance(r, 1.0), huber.distance(r, 1.0), epsilon = 1e-12);
            assert_abs_diff_eq!(ht.derivative(r, 1.0), huber.derivative(r, 1.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn hubertukey_negative_half_matches_tukey() {
        let ht = Norm::huber_tukey(DEFAULT_HUBER_COEF, DEFAULT_TUKEY_COEF);
        let tukey = Norm::tukey(DEFAULT_TUKEY_COEF);
        for r in [-0.1, -0.5, -1.0, -2.0, -5.0] {
            assert_abs_diff_eq!(ht.distance(r, 1.0), tukey.distance(r, 1.0), epsilon = 1e-12);
            assert_abs_diff_eq!(ht.derivative(r, 1.0), tukey.derivative(r, 1.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn l2_ignores_sigma() {
        let n = Norm::L2;
        assert_eq!(n.distance(2.0, 1.0), n.distance(2.0, 50.0));
        assert_eq!(n.derivative(2.0, 1.0), n.derivative(2.0, 50.0));
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert!(Norm::from_name("bogus").is_none());
        assert!(Norm::from_name("L2").is_some());
        assert!(Norm::from_name("hubertukey").is_some());
    }
}
