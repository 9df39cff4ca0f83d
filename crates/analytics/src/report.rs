use serde::{Deserialize, Serialize};

/// The full analytics payload returned to the dashboard.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as
/// the data transfer object for analytics results throughout the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: Summary,
    pub top_clients: Vec<TopClient>,
    pub monthly_data: Vec<MonthlyRevenue>,
}

/// Overall totals across the filtered items.
///
/// Absent monetary fields count as 0 in the sums, but items without a
/// margin are excluded from the average entirely rather than dragging it
/// toward zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub average_margin: f64,
    pub total_items: usize,
    pub total_weight: f64,
    pub unique_clients: usize,
}

/// One of the up-to-five clients ranked by revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopClient {
    pub client_id: i64,
    pub client_name: String,
    pub client_code: String,
    pub revenue: f64,
    pub items_count: usize,
}

/// Revenue and profit for one calendar month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
    pub profit: f64,
    pub items_count: usize,
}

impl AnalyticsReport {
    /// Creates an empty report: zeroed summary, no clients, no months.
    pub fn new() -> Self {
        Self {
            summary: Summary::default(),
            top_clients: Vec::new(),
            monthly_data: Vec::new(),
        }
    }
}

impl Default for AnalyticsReport {
    fn default() -> Self {
        Self::new()
    }
}
