//! Names of optimisation periods, used in export file names.

use super::options::PeriodGranularity;

pub trait OptPeriodStringGenerator {
    fn to_period_string(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyPeriod {
    pub year: u32,
    pub week: u32,
}

impl OptPeriodStringGenerator for WeeklyPeriod {
    fn to_period_string(&self) -> String {
        format!("{}-{}", self.year, self.week)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPeriod {
    pub year: u32,
    pub week: u32,
    pub day: u32,
}

impl OptPeriodStringGenerator for DailyPeriod {
    fn to_period_string(&self) -> String {
        format!("{}-{}-{}", self.year, self.week, self.day)
    }
}

pub fn period_generator(
    granularity: PeriodGranularity,
    year: u32,
    week: u32,
    day: u32,
) -> Box<dyn OptPeriodStringGenerator> {
    match granularity {
        PeriodGranularity::Weekly => Box::new(WeeklyPeriod { year, week }),
        PeriodGranularity::Daily => Box::new(DailyPeriod { year, week, day }),
    }
}

/// `problem-<period>--optim-nb-<n>.mps`
pub fn mps_file_name(period: &dyn OptPeriodStringGenerator, optimization_number: u32) -> String {
    format!(
        "problem-{}--optim-nb-{}.mps",
        period.to_period_string(),
        optimization_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let weekly = WeeklyPeriod { year: 3, week: 12 };
        assert_eq!(mps_file_name(&weekly, 1), "problem-3-12--optim-nb-1.mps");

        let daily = period_generator(PeriodGranularity::Daily, 0, 1, 6);
        assert_eq!(
            mps_file_name(daily.as_ref(), 2),
            "problem-0-1-6--optim-nb-2.mps"
        );
    }
}
