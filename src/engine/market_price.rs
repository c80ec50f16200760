// ============================================================================
// Market Price Estimation
// Derives a scalar market price from the two books
// ============================================================================

use crate::domain::Book;

/// Estimate the market price as the intersection of a linear demand and a
/// linear supply curve.
///
/// The demand line runs through the first and last limit buy orders in
/// priority order, the supply line through the first and last limit sell
/// orders, each as `(quantity_remaining, limit_price)` points. A book with a
/// single limit order contributes a degenerate line and yields no estimate,
/// as do parallel lines and a side with no limit orders at all; callers keep
/// the previous estimate in those cases.
///
/// The result is an approximation, not a market-clearing price: the curves
/// are assumed linear and only the endpoints are sampled.
pub fn estimate(buys: &Book, sells: &Book) -> Option<u64> {
    let ((bx1, by1), (bx2, by2)) = buys.limit_endpoints()?;
    let ((sx1, sy1), (sx2, sy2)) = sells.limit_endpoints()?;

    let (_, y) = line_intersection(
        bx1 as f64, by1 as f64, bx2 as f64, by2 as f64, sx1 as f64, sy1 as f64, sx2 as f64,
        sy2 as f64,
    )?;

    // Truncating cast; a negative intercept clamps to zero.
    Some(y as u64)
}

/// Intersection of the line through `(x1, y1)`–`(x2, y2)` and the line
/// through `(x3, y3)`–`(x4, y4)`, or `None` for parallel (or degenerate)
/// input.
#[allow(clippy::too_many_arguments)]
fn line_intersection(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    x4: f64,
    y4: f64,
) -> Option<(f64, f64)> {
    // First line, a1*x + b1*y = c1
    let a1 = y2 - y1;
    let b1 = x1 - x2;
    let c1 = a1 * x1 + b1 * y1;

    // Second line, a2*x + b2*y = c2
    let a2 = y4 - y3;
    let b2 = x3 - x4;
    let c2 = a2 * x3 + b2 * y3;

    let determinant = a1 * b2 - a2 * b1;
    if determinant == 0.0 {
        return None;
    }

    let x = (b2 * c1 - b1 * c2) / determinant;
    let y = (a1 * c2 - a2 * c1) / determinant;
    Some((x, y))
}
