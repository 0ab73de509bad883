use crate::domain::entities::{AgentStats, ChiefStats, StatusCounts};

pub const STATUS_LABELS: [&str; 4] = ["Verificados", "Pendientes", "Fallidos", "Con error"];
pub const STATUS_COLORS: [&str; 4] = ["#10b981", "#3b82f6", "#ef4444", "#f59e0b"];

// Proportion chart over [success, pending, failed, error].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusChart {
    // Every bucket is zero; render the explicit empty state.
    NoData,
    Distribution {
        labels: [&'static str; 4],
        colors: [&'static str; 4],
        values: [u64; 4],
    },
}

pub fn status_distribution(counts: &StatusCounts) -> StatusChart {
    let values = [counts.success, counts.pending, counts.failed, counts.error];
    if values.iter().all(|&value| value == 0) {
        return StatusChart::NoData;
    }
    StatusChart::Distribution {
        labels: STATUS_LABELS,
        colors: STATUS_COLORS,
        values,
    }
}

// round(value / total * 100); 0 when there is no total to divide by.
pub fn calculate_progress(value: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let percent = (value as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, u32::MAX as f64) as u32
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedSeries {
    pub name: &'static str,
    pub color: &'static str,
    pub values: Vec<u64>,
}

/// Bar chart data: every series has exactly one value per label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupedBarSeries {
    pub labels: Vec<String>,
    pub series: Vec<NamedSeries>,
}

impl GroupedBarSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// Leaders vs voters per chief. Missing numbers become 0 so lengths line up.
pub fn chief_breakdown(chiefs: &[ChiefStats]) -> GroupedBarSeries {
    GroupedBarSeries {
        labels: chiefs.iter().map(|chief| chief.name.clone()).collect(),
        series: vec![
            NamedSeries {
                name: "Lideres",
                color: "#6366f1",
                values: chiefs
                    .iter()
                    .map(|chief| chief.leader_count.unwrap_or(0))
                    .collect(),
            },
            NamedSeries {
                name: "Votantes",
                color: "#10b981",
                values: chiefs
                    .iter()
                    .map(|chief| chief.voter_count.unwrap_or(0))
                    .collect(),
            },
        ],
    }
}

pub fn agent_breakdown(agents: &[AgentStats]) -> GroupedBarSeries {
    GroupedBarSeries {
        labels: agents.iter().map(|agent| agent.label().to_string()).collect(),
        series: vec![NamedSeries {
            name: "Registros",
            color: "#3b82f6",
            values: agents.iter().map(|agent| agent.total).collect(),
        }],
    }
}

// Percentages shown on the stat tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressFigures {
    pub verified: u32,
    pub pending: u32,
    pub failed: u32,
    pub error: u32,
}

pub fn progress_figures(counts: &StatusCounts) -> ProgressFigures {
    ProgressFigures {
        verified: calculate_progress(counts.success, counts.total),
        pending: calculate_progress(counts.pending, counts.total),
        failed: calculate_progress(counts.failed, counts.total),
        error: calculate_progress(counts.error, counts.total),
    }
}

// Everything the dashboard charts need, derived from one merged fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedSeries {
    pub status: StatusChart,
    pub progress: ProgressFigures,
    pub chiefs: GroupedBarSeries,
    pub agents: GroupedBarSeries,
}

impl Default for DerivedSeries {
    fn default() -> Self {
        Self {
            status: StatusChart::NoData,
            progress: ProgressFigures::default(),
            chiefs: GroupedBarSeries::default(),
            agents: GroupedBarSeries::default(),
        }
    }
}

pub fn build(
    counts: Option<&StatusCounts>,
    chiefs: &[ChiefStats],
    agents: &[AgentStats],
) -> DerivedSeries {
    let counts = counts.copied().unwrap_or_default();
    DerivedSeries {
        status: status_distribution(&counts),
        progress: progress_figures(&counts),
        chiefs: chief_breakdown(chiefs),
        agents: agent_breakdown(agents),
    }
}
