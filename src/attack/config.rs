use std::time::Duration;


#[derive(Debug, confique::Config)]
#[config(validate = Self::validate)]
pub struct LoadConfig {
    /// Number of concurrent users, each repeatedly creating sales.
    #[config(default = 1, validate(*users > 0, "must be at least 1"))]
    pub users: usize,

    /// How many users are launched per second, e.g. "10" or "0.5".
    #[config(default = "1", validate = validate_hatch_rate)]
    pub hatch_rate: String,

    /// Stops the load test after this time, e.g. "30s" or "5min". "0" means
    /// no time limit. Cannot be combined with a non-zero `iterations`.
    #[config(default = "0", deserialize_with = crate::config::deserialize_duration)]
    pub run_time: Duration,

    /// How many times each user creates a sale. "0" means no limit: the test
    /// then runs until it is interrupted with Ctrl+C. If neither this nor
    /// `run_time` is set, each user creates exactly one sale.
    pub iterations: Option<usize>,
}

/// When goose stops the load test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// After each user ran this many iterations.
    Iterations(usize),
    /// After this many seconds.
    RunTime(usize),
    /// Only when interrupted.
    Never,
}

impl LoadConfig {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.run_time_secs().is_some() && self.iterations.is_some_and(|n| n > 0) {
            return Err("'load.iterations' and 'load.run_time' cannot both be set");
        }
        Ok(())
    }

    pub fn stop_condition(&self) -> StopCondition {
        match (self.run_time_secs(), self.iterations) {
            (Some(secs), _) => StopCondition::RunTime(secs),
            (None, None) => StopCondition::Iterations(1),
            (None, Some(0)) => StopCondition::Never,
            (None, Some(n)) => StopCondition::Iterations(n),
        }
    }

    /// `run_time` rounded up to whole seconds, or `None` if unlimited.
    pub fn run_time_secs(&self) -> Option<usize> {
        if self.run_time.is_zero() {
            return None;
        }

        let secs = self.run_time.as_secs() + u64::from(self.run_time.subsec_nanos() > 0);
        Some(usize::try_from(secs).unwrap_or(usize::MAX))
    }
}

fn validate_hatch_rate(rate: &String) -> Result<(), &'static str> {
    match rate.parse::<f32>() {
        Ok(r) if r.is_finite() && r > 0.0 => Ok(()),
        _ => Err("must be a positive number"),
    }
}
