use crate::{
    error::ConvergenceError, keplers_equation, keplers_equation_derivative, KEPLER_MAX_ITERS,
    KEPLER_TOLERANCE,
};

/// Solves Kepler's equation for the eccentric anomaly.
///
/// Kepler's equation relates the mean anomaly `M` to the eccentric anomaly
/// `E` of an elliptic orbit:
///
/// ```text
/// M = E - e sin E
/// ```
///
/// # Method
/// Newton-Raphson on `f(E) = E - e sin E - M`, seeded with `E_0 = M`:
///
/// ```text
/// E_{n+1} = E_n - f(E_n) / (1 - e cos E_n)
/// ```
///
/// Iteration stops once `|f(E_n)| < 1e-6` radians.
///
/// The root always lies within `e` of `M`, on the same side of `M` as the
/// sign of `sin M`, so the iteration keeps a bracket around it. A Newton
/// step that would leave the bracket is retaken from the opposite end of
/// the bracket, and if that also escapes, the bracket is bisected. Near
/// `e = 1` plain Newton from `E_0 = M` can oscillate forever; with the
/// bracket it settles in a few steps for any `0 <= e < 1`.
///
/// # Range
/// The result is not wrapped: a mean anomaly in `[0, 2pi)` gives an
/// eccentric anomaly in `[0, 2pi)`, but other inputs are passed through.
///
/// # Errors
/// Returns a [`ConvergenceError`] if the tolerance isn't met within
/// [`KEPLER_MAX_ITERS`] steps, or if the residual stops being finite.
/// This doesn't happen for finite inputs with `0 <= e < 1`.
///
/// # Example
/// ```
/// use orrery_kepler::solve_eccentric_anomaly;
///
/// let (mean_anomaly, eccentricity) = (1.0, 0.5);
/// let eccentric_anomaly = solve_eccentric_anomaly(mean_anomaly, eccentricity).unwrap();
///
/// let residual = eccentric_anomaly - eccentricity * eccentric_anomaly.sin() - mean_anomaly;
/// assert!(residual.abs() < 1e-6);
/// ```
pub fn solve_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> Result<f64, ConvergenceError> {
    let mut eccentric_anomaly = mean_anomaly;
    let mut iterations = 0;

    let (mut low, mut high) = if mean_anomaly.sin() >= 0.0 {
        (mean_anomaly, mean_anomaly + eccentricity)
    } else {
        (mean_anomaly - eccentricity, mean_anomaly)
    };

    loop {
        let f = keplers_equation(mean_anomaly, eccentric_anomaly, eccentricity);

        if f.abs() < KEPLER_TOLERANCE {
            return Ok(eccentric_anomaly);
        }

        if iterations == KEPLER_MAX_ITERS || !f.is_finite() {
            return Err(ConvergenceError {
                mean_anomaly,
                eccentricity,
                residual: f.abs(),
                iterations,
            });
        }

        // f is increasing in E
        if f < 0.0 {
            low = eccentric_anomaly;
        } else {
            high = eccentric_anomaly;
        }

        let mut next = newton_step(eccentric_anomaly, eccentricity, f);

        if !(low < next && next < high) {
            let far = if f < 0.0 { high } else { low };
            let far_f = keplers_equation(mean_anomaly, far, eccentricity);
            next = newton_step(far, eccentricity, far_f);

            if !(low < next && next < high) {
                next = 0.5 * (low + high);
            }
        }

        eccentric_anomaly = next;
        iterations += 1;
    }
}

#[inline]
fn newton_step(eccentric_anomaly: f64, eccentricity: f64, f: f64) -> f64 {
    eccentric_anomaly - f / keplers_equation_derivative(eccentric_anomaly, eccentricity)
}

/// Converts an eccentric anomaly into a true anomaly.
///
/// ```text
/// v = 2 atan( sqrt((1 + e) / (1 - e)) tan(E / 2) )
/// ```
///
/// This is a pure trigonometric map and does not wrap its output: the
/// result lies in `(-pi, pi]` and may be negative. Callers that need
/// `[0, 2pi)` add `2pi` to negative results.
///
/// # Example
/// ```
/// use std::f64::consts::PI;
/// use orrery_kepler::true_anomaly_from_eccentric;
///
/// // The apsides are fixed points of the conversion.
/// assert_eq!(true_anomaly_from_eccentric(0.0, 0.3), 0.0);
/// assert!(true_anomaly_from_eccentric(1.5 * PI, 0.3) < 0.0);
/// ```
pub fn true_anomaly_from_eccentric(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    2.0 * (((1.0 + eccentricity) / (1.0 - eccentricity)).sqrt() * (eccentric_anomaly / 2.0).tan())
        .atan()
}
