use crate::report::{AnalyticsReport, MonthlyRevenue, Summary, TopClient};
use chrono::NaiveDate;
use core_types::{Client, Item};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// How many clients the revenue ranking keeps.
const TOP_CLIENTS_LIMIT: usize = 5;
/// How many trailing months the time series keeps.
const MONTHLY_WINDOW: usize = 6;

/// An inclusive arrival-date filter, both ends included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A stateless calculator that condenses the item ledger into the
/// dashboard figures.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for building an analytics report.
    ///
    /// # Arguments
    ///
    /// * `items` - The item snapshot fetched by the caller.
    /// * `clients` - The client roster, used only to resolve display
    ///   names and codes for the ranking.
    /// * `date_range` - Optional inclusive filter on each item's arrival
    ///   date; when absent, every item participates.
    pub fn aggregate(
        &self,
        items: &[Item],
        clients: &[Client],
        date_range: Option<DateRange>,
    ) -> AnalyticsReport {
        let filtered: Vec<&Item> = items
            .iter()
            .filter(|item| match date_range {
                Some(range) => range.contains(item.arrival_date),
                None => true,
            })
            .collect();

        AnalyticsReport {
            summary: self.summarize(&filtered),
            top_clients: self.rank_clients(&filtered, clients),
            monthly_data: self.monthly_series(&filtered),
        }
    }

    /// Computes the overall totals.
    ///
    /// Absent amounts, costs, and weights count as 0 in the sums. The
    /// average margin is different on purpose: items without a margin are
    /// excluded from both numerator and denominator, so sparse margins do
    /// not get diluted toward zero.
    fn summarize(&self, items: &[&Item]) -> Summary {
        let mut summary = Summary {
            total_items: items.len(),
            ..Summary::default()
        };

        let mut margin_sum = 0.0;
        let mut margin_count = 0usize;
        let mut client_ids: HashSet<i64> = HashSet::new();

        for item in items {
            summary.total_revenue += item.amount_kzt.unwrap_or(0.0);
            summary.total_cost += item.cost_price.unwrap_or(0.0);
            summary.total_weight += item.weight.unwrap_or(0.0);
            client_ids.insert(item.client_id);

            if let Some(margin) = item.margin {
                margin_sum += margin;
                margin_count += 1;
            }
        }

        summary.total_profit = summary.total_revenue - summary.total_cost;
        summary.average_margin = if margin_count > 0 {
            margin_sum / margin_count as f64
        } else {
            0.0
        };
        summary.unique_clients = client_ids.len();

        summary
    }

    /// Ranks clients by summed revenue, descending, keeping the top five.
    ///
    /// Ties break by ascending client id so the ranking is deterministic.
    /// A client referenced by an item but missing from the roster is shown
    /// as "Unknown" rather than failing the whole report.
    fn rank_clients(&self, items: &[&Item], clients: &[Client]) -> Vec<TopClient> {
        let mut totals: HashMap<i64, (f64, usize)> = HashMap::new();
        for item in items {
            let entry = totals.entry(item.client_id).or_insert((0.0, 0));
            entry.0 += item.amount_kzt.unwrap_or(0.0);
            entry.1 += 1;
        }

        let roster: HashMap<i64, &Client> = clients.iter().map(|c| (c.id, c)).collect();

        let mut ranked: Vec<TopClient> = totals
            .into_iter()
            .map(|(client_id, (revenue, items_count))| {
                let (client_name, client_code) = match roster.get(&client_id) {
                    Some(client) => (client.name.clone(), client.client_code.clone()),
                    None => ("Unknown".to_string(), "Unknown".to_string()),
                };
                TopClient {
                    client_id,
                    client_name,
                    client_code,
                    revenue,
                    items_count,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.revenue
                .partial_cmp(&a.revenue)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        ranked.truncate(TOP_CLIENTS_LIMIT);

        ranked
    }

    /// Builds the per-month revenue/profit series, ascending by month key,
    /// truncated to the chronologically latest six months.
    ///
    /// Profit is computed per item (`amount - cost`, absent terms as 0)
    /// and then summed, never as a difference of the monthly sums.
    fn monthly_series(&self, items: &[&Item]) -> Vec<MonthlyRevenue> {
        let mut months: BTreeMap<String, MonthlyRevenue> = BTreeMap::new();

        for item in items {
            let key = item.arrival_date.format("%Y-%m").to_string();
            let entry = months.entry(key.clone()).or_insert(MonthlyRevenue {
                month: key,
                revenue: 0.0,
                profit: 0.0,
                items_count: 0,
            });
            entry.revenue += item.amount_kzt.unwrap_or(0.0);
            entry.profit += item.amount_kzt.unwrap_or(0.0) - item.cost_price.unwrap_or(0.0);
            entry.items_count += 1;
        }

        // BTreeMap iteration is already ascending by month key.
        let mut series: Vec<MonthlyRevenue> = months.into_values().collect();
        if series.len() > MONTHLY_WINDOW {
            series.drain(..series.len() - MONTHLY_WINDOW);
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(id: i64, client_id: i64, date: &str) -> Item {
        Item {
            id,
            client_id,
            product_code: format!("PC-{id}"),
            arrival_date: date.parse().unwrap(),
            quantity: 1,
            weight: None,
            price_usd: None,
            exchange_rate: None,
            amount_kzt: None,
            cost_price: None,
            margin: None,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn client(id: i64, name: &str, code: &str) -> Client {
        Client {
            id,
            client_code: code.to_string(),
            name: name.to_string(),
            phone: "+77000000000".to_string(),
            email: None,
            address: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = AnalyticsEngine::new().aggregate(&[], &[], None);

        assert_eq!(report.summary.total_revenue, 0.0);
        assert_eq!(report.summary.total_cost, 0.0);
        assert_eq!(report.summary.total_profit, 0.0);
        assert_eq!(report.summary.average_margin, 0.0);
        assert_eq!(report.summary.total_items, 0);
        assert_eq!(report.summary.total_weight, 0.0);
        assert_eq!(report.summary.unique_clients, 0);
        assert!(report.top_clients.is_empty());
        assert!(report.monthly_data.is_empty());
    }

    #[test]
    fn summary_and_monthly_data_match_worked_example() {
        let mut a = item(1, 1, "2024-01-15");
        a.amount_kzt = Some(100.0);
        a.cost_price = Some(40.0);
        let mut b = item(2, 1, "2024-02-10");
        b.amount_kzt = Some(200.0);
        b.cost_price = Some(50.0);
        let mut c = item(3, 2, "2024-02-20");
        c.amount_kzt = Some(300.0);

        let clients = vec![client(1, "A", "A1"), client(2, "B", "B1")];
        let report = AnalyticsEngine::new().aggregate(&[a, b, c], &clients, None);

        assert_eq!(report.summary.total_revenue, 600.0);
        // absent costPrice on the third item counts as 0
        assert_eq!(report.summary.total_cost, 90.0);
        assert_eq!(report.summary.total_profit, 510.0);
        assert_eq!(report.summary.total_items, 3);
        assert_eq!(report.summary.unique_clients, 2);

        assert_eq!(report.monthly_data.len(), 2);
        let january = &report.monthly_data[0];
        assert_eq!(january.month, "2024-01");
        assert_eq!(january.revenue, 100.0);
        assert_eq!(january.profit, 60.0);
        assert_eq!(january.items_count, 1);

        // per-item profit summed: (200-50) + (300-0) = 450
        let february = &report.monthly_data[1];
        assert_eq!(february.month, "2024-02");
        assert_eq!(february.revenue, 500.0);
        assert_eq!(february.profit, 450.0);
        assert_eq!(february.items_count, 2);
    }

    #[test]
    fn average_margin_excludes_items_without_margin() {
        let mut a = item(1, 1, "2024-01-01");
        a.margin = Some(10.0);
        let mut b = item(2, 1, "2024-01-02");
        b.margin = Some(20.0);
        let c = item(3, 1, "2024-01-03");

        let report = AnalyticsEngine::new().aggregate(&[a, b, c], &[], None);
        // (10 + 20) / 2, not (10 + 20 + 0) / 3
        assert_eq!(report.summary.average_margin, 15.0);
    }

    #[test]
    fn top_clients_ranked_by_revenue_and_capped_at_five() {
        let mut items = Vec::new();
        let mut clients = Vec::new();
        for id in 1..=100 {
            let mut it = item(id, id, "2024-03-01");
            it.amount_kzt = Some(id as f64 * 10.0);
            items.push(it);
            clients.push(client(id, &format!("Client {id}"), &format!("C{id}")));
        }

        let report = AnalyticsEngine::new().aggregate(&items, &clients, None);

        assert_eq!(report.top_clients.len(), 5);
        assert_eq!(report.top_clients[0].client_id, 100);
        assert_eq!(report.top_clients[0].revenue, 1000.0);
        assert_eq!(report.top_clients[4].client_id, 96);
    }

    #[test]
    fn top_client_ties_break_by_client_id_ascending() {
        let mut a = item(1, 9, "2024-03-01");
        a.amount_kzt = Some(500.0);
        let mut b = item(2, 3, "2024-03-02");
        b.amount_kzt = Some(500.0);

        let report = AnalyticsEngine::new().aggregate(&[a, b], &[], None);
        assert_eq!(report.top_clients[0].client_id, 3);
        assert_eq!(report.top_clients[1].client_id, 9);
    }

    #[test]
    fn unresolved_clients_are_labeled_unknown() {
        let mut a = item(1, 42, "2024-03-01");
        a.amount_kzt = Some(100.0);

        let report = AnalyticsEngine::new().aggregate(&[a], &[], None);
        assert_eq!(report.top_clients.len(), 1);
        assert_eq!(report.top_clients[0].client_name, "Unknown");
        assert_eq!(report.top_clients[0].client_code, "Unknown");
        assert_eq!(report.top_clients[0].revenue, 100.0);
        assert_eq!(report.top_clients[0].items_count, 1);
    }

    #[test]
    fn monthly_series_keeps_the_latest_six_months() {
        let mut items = Vec::new();
        for month in 0..24 {
            let year = 2022 + month / 12;
            let mut it = item(month as i64 + 1, 1, &format!("{year}-{:02}-15", month % 12 + 1));
            it.amount_kzt = Some(1.0);
            items.push(it);
        }

        let report = AnalyticsEngine::new().aggregate(&items, &[], None);

        assert_eq!(report.monthly_data.len(), 6);
        assert_eq!(report.monthly_data[0].month, "2023-07");
        assert_eq!(report.monthly_data[5].month, "2023-12");
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let mut a = item(1, 1, "2024-01-01");
        a.amount_kzt = Some(1.0);
        let mut b = item(2, 1, "2024-01-31");
        b.amount_kzt = Some(2.0);
        let mut c = item(3, 1, "2024-02-01");
        c.amount_kzt = Some(4.0);

        let range = DateRange {
            start: "2024-01-01".parse().unwrap(),
            end: "2024-01-31".parse().unwrap(),
        };
        let report = AnalyticsEngine::new().aggregate(&[a, b, c], &[], Some(range));

        assert_eq!(report.summary.total_items, 2);
        assert_eq!(report.summary.total_revenue, 3.0);
        assert_eq!(report.monthly_data.len(), 1);
    }

    #[test]
    fn nan_amounts_propagate_through_sums() {
        let mut a = item(1, 1, "2024-01-01");
        a.amount_kzt = Some(f64::NAN);
        let mut b = item(2, 1, "2024-01-02");
        b.amount_kzt = Some(100.0);

        let report = AnalyticsEngine::new().aggregate(&[a, b], &[], None);
        assert!(report.summary.total_revenue.is_nan());
        assert!(report.summary.total_profit.is_nan());
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let mut a = item(1, 1, "2024-01-15");
        a.amount_kzt = Some(100.0);

        let report = AnalyticsEngine::new().aggregate(&[a], &[client(1, "A", "A1")], None);
        let value = serde_json::to_value(&report).unwrap();

        assert!(value["summary"]["totalRevenue"].is_number());
        assert!(value["summary"]["averageMargin"].is_number());
        assert!(value["summary"]["uniqueClients"].is_number());
        assert!(value["topClients"][0]["clientCode"].is_string());
        assert!(value["monthlyData"][0]["itemsCount"].is_number());
    }
}
