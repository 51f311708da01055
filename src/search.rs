//! Reverse-communication root finders.
//!
//! The caller owns the loop: evaluate `y = f(x)`, hand it to `search_x` together with the
//! state returned by the previous call, and keep going while the returned state
//! [`is_searching`](NumericalSearchType::is_searching). Tolerances apply to `|y|`.

/// Progress or outcome of a search. Variants before `Converged` mean "evaluate and call again".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericalSearchType {
    Init,
    SecondPass,
    ThirdPass,
    FourthPass,
    Converged,
    MaxIter,
    NoRoot,
    Failed,
}

impl NumericalSearchType {
    pub fn is_searching(self) -> bool {
        self < NumericalSearchType::Converged
    }
}

/// Interval halving on a bracket `[lo, hi]`.
#[derive(Debug, Clone)]
pub struct BisectionSearch {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    counter: u32,
    max_iter: u32,
    tolerance_y: f64,
}

impl BisectionSearch {
    pub fn new(max_iter: u32, tolerance_y: f64) -> Self {
        Self {
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            counter: 0,
            max_iter,
            tolerance_y,
        }
    }

    /// One step of the search. `lo` and `hi` are narrowed as the root is bracketed.
    ///
    /// Returns [`NumericalSearchType::NoRoot`] when neither half of the bracket shows a sign
    /// change; `x` moves to a bracket end when that end holds the strictly smallest `|y|`.
    pub fn search_x(
        &mut self,
        x: &mut f64,
        y: f64,
        lo: &mut f64,
        hi: &mut f64,
        state: NumericalSearchType,
    ) -> NumericalSearchType {
        if state == NumericalSearchType::Init {
            self.x1 = 0.0;
            self.x2 = 0.0;
            self.y1 = 0.0;
            self.y2 = 0.0;
            self.counter = 1;
            *x = *lo;
            return NumericalSearchType::SecondPass;
        }

        if y.abs() < self.tolerance_y {
            return NumericalSearchType::Converged;
        }

        self.counter += 1;

        match state {
            NumericalSearchType::SecondPass => {
                self.x1 = *x;
                self.y1 = y;
                *x = *hi;
                return NumericalSearchType::ThirdPass;
            }
            NumericalSearchType::ThirdPass => {
                self.x2 = *x;
                self.y2 = y;
                *x = 0.5 * (self.x1 + self.x2);
                return NumericalSearchType::FourthPass;
            }
            _ => {}
        }

        if self.counter > self.max_iter {
            return NumericalSearchType::MaxIter;
        }

        if y * self.y1 < 0.0 {
            self.x2 = *x;
            self.y2 = y;
            *hi = *x;
            *x = 0.5 * (self.x1 + self.x2);
            return NumericalSearchType::FourthPass;
        }

        if y * self.y2 < 0.0 {
            self.x1 = *x;
            self.y1 = y;
            *lo = *x;
            *x = 0.5 * (self.x1 + self.x2);
            return NumericalSearchType::FourthPass;
        }

        if self.y1.abs() < y.abs() && self.y1.abs() < self.y2.abs() {
            *x = self.x1;
        } else if self.y2.abs() < y.abs() && self.y2.abs() < self.y1.abs() {
            *x = self.x2;
        }
        NumericalSearchType::NoRoot
    }
}

/// Secant refinement clamped to `[lo, hi]`.
#[derive(Debug, Clone)]
pub struct LinearSearch {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    counter: u32,
    lo_hits: u32,
    hi_hits: u32,
    max_iter: u32,
    tolerance_y: f64,
}

impl LinearSearch {
    pub fn new(max_iter: u32, tolerance_y: f64) -> Self {
        Self {
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            counter: 0,
            lo_hits: 0,
            hi_hits: 0,
            max_iter,
            tolerance_y,
        }
    }

    /// One step of the search. The first probe after `x` is `x + fdx * (1 + |x|)`.
    ///
    /// Fails when the estimate is pinned against a limit for more than two consecutive
    /// steps or the secant slope vanishes.
    pub fn search_x(
        &mut self,
        x: &mut f64,
        y: f64,
        lo: f64,
        hi: f64,
        fdx: f64,
        state: NumericalSearchType,
    ) -> NumericalSearchType {
        if state == NumericalSearchType::Init {
            *self = Self::new(self.max_iter, self.tolerance_y);
            self.counter = 1;
            return NumericalSearchType::SecondPass;
        }

        if y.abs() < self.tolerance_y {
            return NumericalSearchType::Converged;
        }

        self.counter += 1;

        if state == NumericalSearchType::SecondPass {
            self.x1 = *x;
            self.y1 = y;
            *x += fdx + fdx * x.abs();
            return NumericalSearchType::ThirdPass;
        }

        if self.counter > self.max_iter {
            return NumericalSearchType::MaxIter;
        }
        if self.lo_hits > 2 || self.hi_hits > 2 {
            return NumericalSearchType::Failed;
        }

        // alternate which end of the secant is replaced
        if state == NumericalSearchType::ThirdPass {
            self.x2 = *x;
            self.y2 = y;
        } else {
            self.x1 = *x;
            self.y1 = y;
        }

        if self.y2 == self.y1 {
            return NumericalSearchType::Failed;
        }

        *x = self.x1 - self.y1 * (self.x2 - self.x1) / (self.y2 - self.y1);

        if *x < lo {
            *x = lo;
            self.lo_hits += 1;
        } else if *x > hi {
            *x = hi;
            self.hi_hits += 1;
        } else {
            self.lo_hits = 0;
            self.hi_hits = 0;
        }

        if state == NumericalSearchType::ThirdPass {
            NumericalSearchType::FourthPass
        } else {
            NumericalSearchType::ThirdPass
        }
    }
}
