use super::Point;

/// Solve a 3x3 linear system with a nonzero determinant.
///
/// The system is given row by row as `a11 x + a12 y + a13 z = b1` and so on;
/// the unique solution is returned as a [`Point`]. Used by the geometric
/// projections in the track module, which only ever build non-degenerate
/// systems. Returns `None` when elimination finds the matrix singular, so a
/// caller bug cannot turn into a division by zero.
#[allow(clippy::too_many_arguments)]
pub fn solve_3x3(
    a11: f64,
    a12: f64,
    a13: f64,
    b1: f64,
    a21: f64,
    a22: f64,
    a23: f64,
    b2: f64,
    a31: f64,
    a32: f64,
    a33: f64,
    b3: f64,
) -> Option<Point> {
    let mut m = [[a11, a12, a13], [a21, a22, a23], [a31, a32, a33]];
    let mut rhs = [b1, b2, b3];

    // Gaussian elimination with row swaps on zero pivots.
    for i in 0..3 {
        let pivot_row = (i..3).find(|&k| m[k][i] != 0.0)?;
        if pivot_row != i {
            m.swap(i, pivot_row);
            rhs.swap(i, pivot_row);
        }
        for k in i + 1..3 {
            let coef = m[k][i] / m[i][i];
            m[k][i] = 0.0;
            for j in i + 1..3 {
                m[k][j] -= m[i][j] * coef;
            }
            rhs[k] -= rhs[i] * coef;
        }
    }

    let z = rhs[2] / m[2][2];
    let y = (rhs[1] - m[1][2] * z) / m[1][1];
    let x = (rhs[0] - m[0][1] * y - m[0][2] * z) / m[0][0];
    Some(Point::new(x, y, z))
}
