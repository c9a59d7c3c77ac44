//! Integer line rasterization.

/// Bresenham walk that starts at one point, passes through a second one and
/// keeps going in the same direction for as long as it is polled.
///
/// Uses the error-accumulator form, so every step moves by at most one cell
/// on each axis and no floating point is involved.
#[derive(Clone, Debug)]
pub struct BresenhamLine {
    x: i64,
    y: i64,
    step_x: i64,
    step_y: i64,
    delta_x: i64,
    delta_y: i64,
    error: i64,
}

impl BresenhamLine {
    /// Line from `from` through `through`, or `None` when both points
    /// coincide and there is no direction to follow.
    #[must_use]
    pub fn through(from: (i64, i64), through: (i64, i64)) -> Option<Self> {
        if from == through {
            return None;
        }
        let delta_x = (through.0 - from.0).abs();
        let delta_y = -(through.1 - from.1).abs();
        Some(Self {
            x: from.0,
            y: from.1,
            step_x: (through.0 - from.0).signum(),
            step_y: (through.1 - from.1).signum(),
            delta_x,
            delta_y,
            error: delta_x + delta_y,
        })
    }
}

impl Iterator for BresenhamLine {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        let current = (self.x, self.y);
        let doubled = 2 * self.error;
        if doubled >= self.delta_y {
            self.error += self.delta_y;
            self.x += self.step_x;
        }
        if doubled <= self.delta_x {
            self.error += self.delta_x;
            self.y += self.step_y;
        }
        Some(current)
    }
}
