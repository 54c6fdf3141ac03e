use std::{fmt, str::FromStr, time::SystemTime};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Single sample of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    /// Label attached by the query (the program name).
    pub label: String,
    #[serde(with = "super::time_serde")]
    pub timestamp: SystemTime,
    pub value: f64,
}

/// Named series exported for every running program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricSeries {
    AvgRunTimeNs,
    CpuUsage,
    EventsPerSecond,
    PeriodNs,
    TotalAvgRunTimeNs,
}

impl MetricSeries {
    /// Query order used by the aggregator.
    pub const ALL: [MetricSeries; 5] = [
        MetricSeries::CpuUsage,
        MetricSeries::PeriodNs,
        MetricSeries::AvgRunTimeNs,
        MetricSeries::EventsPerSecond,
        MetricSeries::TotalAvgRunTimeNs,
    ];

    /// Series name in the metrics backend.
    pub fn name(&self) -> &'static str {
        match self {
            MetricSeries::AvgRunTimeNs => "probe_task_avg_run_time_ns",
            MetricSeries::CpuUsage => "probe_task_cpu_usage",
            MetricSeries::EventsPerSecond => "probe_task_events_per_second",
            MetricSeries::PeriodNs => "probe_task_period_ns",
            MetricSeries::TotalAvgRunTimeNs => "probe_task_total_avg_run_time_ns",
        }
    }
}

impl fmt::Display for MetricSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricSeries {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricSeries::ALL
            .into_iter()
            .find(|series| series.name() == s)
            .ok_or_else(|| ModelError::UnknownSeries(s.to_string()))
    }
}

/// Metrics bundle of a task.
///
/// Points of every program are kept in flat per-series lists, in program order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetrics {
    #[serde(default)]
    pub avg_run_time_ns: Vec<MetricPoint>,
    #[serde(default)]
    pub cpu_usage: Vec<MetricPoint>,
    #[serde(default)]
    pub events_per_second: Vec<MetricPoint>,
    #[serde(default)]
    pub period_ns: Vec<MetricPoint>,
    #[serde(default)]
    pub total_avg_run_time_ns: Vec<MetricPoint>,
}

impl TaskMetrics {
    pub fn series(&self, series: MetricSeries) -> &[MetricPoint] {
        match series {
            MetricSeries::AvgRunTimeNs => &self.avg_run_time_ns,
            MetricSeries::CpuUsage => &self.cpu_usage,
            MetricSeries::EventsPerSecond => &self.events_per_second,
            MetricSeries::PeriodNs => &self.period_ns,
            MetricSeries::TotalAvgRunTimeNs => &self.total_avg_run_time_ns,
        }
    }

    pub fn series_mut(&mut self, series: MetricSeries) -> &mut Vec<MetricPoint> {
        match series {
            MetricSeries::AvgRunTimeNs => &mut self.avg_run_time_ns,
            MetricSeries::CpuUsage => &mut self.cpu_usage,
            MetricSeries::EventsPerSecond => &mut self.events_per_second,
            MetricSeries::PeriodNs => &mut self.period_ns,
            MetricSeries::TotalAvgRunTimeNs => &mut self.total_avg_run_time_ns,
        }
    }

    /// Append every series of `other` to the matching series of `self`.
    pub fn append(&mut self, other: TaskMetrics) {
        let TaskMetrics {
            avg_run_time_ns,
            cpu_usage,
            events_per_second,
            period_ns,
            total_avg_run_time_ns,
        } = other;
        self.avg_run_time_ns.extend(avg_run_time_ns);
        self.cpu_usage.extend(cpu_usage);
        self.events_per_second.extend(events_per_second);
        self.period_ns.extend(period_ns);
        self.total_avg_run_time_ns.extend(total_avg_run_time_ns);
    }

    /// Total number of points across all series.
    pub fn len(&self) -> usize {
        MetricSeries::ALL
            .iter()
            .map(|s| self.series(*s).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn point(label: &str, value: f64) -> MetricPoint {
        MetricPoint {
            label: label.to_string(),
            timestamp: UNIX_EPOCH,
            value,
        }
    }

    #[test]
    fn series_names_are_unique_and_parse_back() {
        for series in MetricSeries::ALL {
            assert_eq!(series.name().parse::<MetricSeries>(), Ok(series));
        }
        assert!("probe_task_unknown".parse::<MetricSeries>().is_err());
    }

    #[test]
    fn each_series_maps_to_its_own_field() {
        let mut m = TaskMetrics::default();
        for (i, series) in MetricSeries::ALL.into_iter().enumerate() {
            m.series_mut(series).push(point("p", i as f64));
        }
        for (i, series) in MetricSeries::ALL.into_iter().enumerate() {
            assert_eq!(m.series(series), &[point("p", i as f64)]);
        }
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn append_concatenates_in_order() {
        let mut first = TaskMetrics::default();
        first.cpu_usage.push(point("a", 1.0));

        let mut second = TaskMetrics::default();
        second.cpu_usage.push(point("b", 2.0));
        second.period_ns.push(point("b", 3.0));

        first.append(second);
        assert_eq!(first.cpu_usage, vec![point("a", 1.0), point("b", 2.0)]);
        assert_eq!(first.period_ns, vec![point("b", 3.0)]);
        assert!(!first.is_empty());
    }
}
