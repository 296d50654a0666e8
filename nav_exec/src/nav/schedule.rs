//! Timer driving the periodic planning cycle.

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A timer which fires once after an initial delay and then once every period.
///
/// If a single call to [`PeriodicTimer::tick`] spans several periods the timer fires only once
/// and the missed periods are skipped.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period_s: f64,
    until_next_s: f64,
    num_fired: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PeriodicTimer {
    pub fn new(start_delay_s: f64, period_s: f64) -> Self {
        Self {
            period_s,
            until_next_s: start_delay_s.max(0.0),
            num_fired: 0,
        }
    }

    /// Advance the timer by `dt_s`, returning true if it fires.
    pub fn tick(&mut self, dt_s: f64) -> bool {
        self.until_next_s -= dt_s;

        if self.until_next_s > 0.0 {
            return false;
        }

        // Skip any whole periods that were missed
        if self.period_s > 0.0 {
            while self.until_next_s <= 0.0 {
                self.until_next_s += self.period_s;
            }
        } else {
            self.until_next_s = 0.0;
        }

        self.num_fired += 1;
        true
    }

    /// Change the period, taking effect after the next firing.
    pub fn set_period(&mut self, period_s: f64) {
        self.period_s = period_s;
    }

    pub fn period_s(&self) -> f64 {
        self.period_s
    }

    pub fn num_fired(&self) -> u64 {
        self.num_fired
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_start_delay_then_period() {
        let mut timer = PeriodicTimer::new(1.0, 0.5);

        // 0.25 s ticks, fires at 1.0, 1.5, 2.0
        let fired: Vec<bool> = (0..8).map(|_| timer.tick(0.25)).collect();
        assert_eq!(
            fired,
            vec![false, false, false, true, false, true, false, true]
        );
        assert_eq!(timer.num_fired(), 3);
    }

    #[test]
    fn test_set_period() {
        let mut timer = PeriodicTimer::new(0.0, 1.0);
        assert!(timer.tick(0.5));

        // The firing already scheduled keeps the old period
        timer.set_period(0.25);
        assert_eq!(timer.period_s(), 0.25);
        assert!(timer.tick(0.5));
        assert!(timer.tick(0.25));
        assert!(!timer.tick(0.125));
        assert_eq!(timer.num_fired(), 3);
    }

    #[test]
    fn test_missed_periods_fire_once() {
        let mut timer = PeriodicTimer::new(0.0, 0.2);

        assert!(timer.tick(1.05));
        assert_eq!(timer.num_fired(), 1);
        assert!(!timer.tick(0.1));
    }
}
