//! Dashboard: scores the last cached activity once and derives the
//! figures the page shows.

use crate::client::CarbonApi;
use crate::models::{ActivityRecord, ScoreResult};
use crate::storage::ActivityCache;
use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const CONNECTIVITY_ERROR: &str =
    "Unable to reach the carbon scoring service. Please check your connection and reload.";

pub const BADGE_PLACEHOLDER: &str = "Keep logging activities to earn your first badge!";

/// Placeholder history shown before "Today", oldest first.
pub const TREND_PLACEHOLDERS: [f64; 6] = [12.4, 10.8, 14.1, 9.6, 11.9, 10.3];

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    Ready(ScoreResult),
    Failed(String),
}

pub struct Dashboard {
    api: Arc<dyn CarbonApi>,
    cache: Arc<dyn ActivityCache>,
    state: DashboardState,
    mounted: bool,
}

impl Dashboard {
    pub fn new(api: Arc<dyn CarbonApi>, cache: Arc<dyn ActivityCache>) -> Self {
        Self {
            api,
            cache,
            state: DashboardState::Loading,
            mounted: false,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Reads the cached record and scores it. Runs once per instance; later
    /// calls return the settled state without another request.
    pub async fn mount(&mut self) -> &DashboardState {
        if self.mounted {
            return &self.state;
        }
        self.mounted = true;

        let record = match self.cache.get_last_activity().await {
            Some(record) => record,
            None => {
                info!("no cached activity, scoring default record");
                ActivityRecord::default_record()
            }
        };

        self.state = match self.api.score(&record).await {
            Ok(result) => {
                info!(
                    total_emission = result.total_emission,
                    daily_score = result.daily_score,
                    badges = result.badges.len(),
                    "dashboard ready"
                );
                DashboardState::Ready(result)
            }
            Err(err) => {
                warn!(error = %err, "dashboard fetch failed");
                DashboardState::Failed(CONNECTIVITY_ERROR.to_string())
            }
        };
        &self.state
    }

    pub fn view(&self) -> DashboardView {
        self.view_at(Local::now().date_naive())
    }

    pub fn view_at(&self, today: NaiveDate) -> DashboardView {
        match &self.state {
            DashboardState::Loading => DashboardView::Loading,
            DashboardState::Failed(message) => DashboardView::Failed {
                message: message.clone(),
            },
            DashboardState::Ready(result) => DashboardView::Ready(build_ready_view(result, today)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DashboardView {
    Loading,
    Failed { message: String },
    Ready(ReadyView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyView {
    pub proportions: Vec<ProportionSlice>,
    pub trend: Vec<TrendPoint>,
    pub score: ScorePanel,
    pub badges: BadgeList,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionSlice {
    pub label: &'static str,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePanel {
    pub eco_score: f64,
    pub headline: String,
    pub fill_percent: f64,
    /// The service returned a score outside 0..=100.
    pub out_of_range: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum BadgeList {
    Earned(Vec<String>),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_emission: String,
    pub recommendation: String,
}

fn build_ready_view(result: &ScoreResult, today: NaiveDate) -> ReadyView {
    let proportions = vec![
        ProportionSlice {
            label: "Transport",
            value: result.transport_emission,
            color: "#3b82f6",
        },
        ProportionSlice {
            label: "Food",
            value: result.food_emission,
            color: "#22c55e",
        },
        ProportionSlice {
            label: "Energy",
            value: result.energy_emission,
            color: "#f59e0b",
        },
    ];

    let mut trend: Vec<TrendPoint> = TREND_PLACEHOLDERS
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let days_ago = (TREND_PLACEHOLDERS.len() - index) as i64;
            let date = today - Duration::days(days_ago);
            TrendPoint {
                label: date.format("%a").to_string(),
                value: *value,
            }
        })
        .collect();
    trend.push(TrendPoint {
        label: "Today".to_string(),
        value: result.total_emission,
    });

    let badges = if result.badges.is_empty() {
        BadgeList::Placeholder(BADGE_PLACEHOLDER.to_string())
    } else {
        BadgeList::Earned(result.badges.iter().map(|badge| badge.name.clone()).collect())
    };

    ReadyView {
        proportions,
        trend,
        score: score_panel(result.daily_score),
        badges,
        summary: Summary {
            total_emission: format!("{:.1}", result.total_emission),
            recommendation: first_line(&result.recommendation_prompt).to_string(),
        },
    }
}

fn score_panel(daily_score: f64) -> ScorePanel {
    let out_of_range = !(0.0..=100.0).contains(&daily_score);
    if out_of_range {
        warn!(daily_score, "score outside 0..=100, clamping for display");
    }
    let fill_percent = if daily_score.is_nan() {
        0.0
    } else {
        daily_score.clamp(0.0, 100.0)
    };

    ScorePanel {
        eco_score: daily_score,
        headline: format!("{}", daily_score.round()),
        fill_percent,
        out_of_range,
    }
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;
    use crate::models::{Badge, CategoryPayload, FoodType, TransportMode};
    use crate::storage::MemoryActivityCache;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeScorer {
        response: Result<ScoreResult, u16>,
        records: Mutex<Vec<ActivityRecord>>,
    }

    impl FakeScorer {
        fn returning(result: ScoreResult) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(result),
                records: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                response: Err(status),
                records: Mutex::new(Vec::new()),
            })
        }

        fn records(&self) -> Vec<ActivityRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CarbonApi for FakeScorer {
        fn endpoint_url(&self, endpoint: &str) -> String {
            format!("http://fake.test/api{endpoint}")
        }

        async fn log_category(&self, _payload: &CategoryPayload) -> Result<u16, ApiError> {
            unreachable!("the dashboard never logs categories")
        }

        async fn score(&self, record: &ActivityRecord) -> Result<ScoreResult, ApiError> {
            self.records.lock().unwrap().push(record.clone());
            match &self.response {
                Ok(result) => Ok(result.clone()),
                Err(status) => Err(ApiError::Status {
                    url: self.endpoint_url("/demo-run"),
                    status: *status,
                }),
            }
        }
    }

    fn sample_result() -> ScoreResult {
        ScoreResult {
            transport_emission: 2.55,
            food_emission: 0.8,
            energy_emission: 2.25,
            total_emission: 5.6,
            daily_score: 72.0,
            badges: vec![Badge {
                id: "green_traveler".to_string(),
                name: "Green Traveler".to_string(),
                description: "Transport footprint below 5kg.".to_string(),
            }],
            recommendation_prompt: "\nAct as a Sustainability Expert.\nMore details".to_string(),
        }
    }

    fn ready(view: DashboardView) -> ReadyView {
        match view {
            DashboardView::Ready(ready) => ready,
            other => panic!("expected ready view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_cache_scores_default_record() {
        let scorer = FakeScorer::returning(sample_result());
        let mut dashboard = Dashboard::new(scorer.clone(), Arc::new(MemoryActivityCache::default()));

        assert_eq!(dashboard.state(), &DashboardState::Loading);
        dashboard.mount().await;

        assert_eq!(scorer.records(), vec![ActivityRecord::default_record()]);
        assert!(matches!(dashboard.state(), DashboardState::Ready(_)));
    }

    #[tokio::test]
    async fn cached_record_is_sent_as_is() {
        let mut record = ActivityRecord::default_record();
        record.transport_mode = TransportMode::Flight;
        record.food_type = FoodType::Dairy;
        let scorer = FakeScorer::returning(sample_result());
        let cache = MemoryActivityCache::with_record(record.clone());

        let mut dashboard = Dashboard::new(scorer.clone(), Arc::new(cache));
        dashboard.mount().await;

        assert_eq!(scorer.records(), vec![record]);
    }

    #[tokio::test]
    async fn failed_fetch_shows_error_and_does_not_retry() {
        let scorer = FakeScorer::failing(500);
        let mut dashboard = Dashboard::new(scorer.clone(), Arc::new(MemoryActivityCache::default()));

        dashboard.mount().await;
        dashboard.mount().await;

        assert_eq!(
            dashboard.state(),
            &DashboardState::Failed(CONNECTIVITY_ERROR.to_string())
        );
        assert_eq!(scorer.records().len(), 1);
        assert_eq!(
            dashboard.view(),
            DashboardView::Failed {
                message: CONNECTIVITY_ERROR.to_string()
            }
        );
    }

    #[tokio::test]
    async fn mount_runs_once_when_ready() {
        let scorer = FakeScorer::returning(sample_result());
        let mut dashboard = Dashboard::new(scorer.clone(), Arc::new(MemoryActivityCache::default()));
        dashboard.mount().await;
        dashboard.mount().await;
        assert_eq!(scorer.records().len(), 1);
    }

    #[tokio::test]
    async fn proportions_sum_to_total() {
        let scorer = FakeScorer::returning(sample_result());
        let mut dashboard = Dashboard::new(scorer, Arc::new(MemoryActivityCache::default()));
        dashboard.mount().await;

        let view = ready(dashboard.view());
        let sum: f64 = view.proportions.iter().map(|slice| slice.value).sum();
        assert!((sum - 5.6).abs() < 1e-9);
        let labels: Vec<_> = view.proportions.iter().map(|slice| slice.label).collect();
        assert_eq!(labels, vec!["Transport", "Food", "Energy"]);
    }

    #[test]
    fn trend_has_six_placeholders_then_today() {
        let mut dashboard = Dashboard::new(
            FakeScorer::returning(sample_result()),
            Arc::new(MemoryActivityCache::default()),
        );
        dashboard.state = DashboardState::Ready(sample_result());

        // 2026-01-05 is a Monday.
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let view = ready(dashboard.view_at(today));

        assert_eq!(view.trend.len(), 7);
        let labels: Vec<_> = view.trend.iter().map(|point| point.label.as_str()).collect();
        assert_eq!(labels, vec!["Tue", "Wed", "Thu", "Fri", "Sat", "Sun", "Today"]);
        assert_eq!(view.trend[0].value, TREND_PLACEHOLDERS[0]);
        assert_eq!(view.trend[6].value, 5.6);
    }

    #[test]
    fn summary_rounds_total_and_takes_first_line() {
        let view = build_ready_view(&sample_result(), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(view.summary.total_emission, "5.6");
        assert_eq!(view.summary.recommendation, "Act as a Sustainability Expert.");
        assert_eq!(view.badges, BadgeList::Earned(vec!["Green Traveler".to_string()]));
    }

    #[test]
    fn empty_badges_render_placeholder() {
        let mut result = sample_result();
        result.badges.clear();
        let view = build_ready_view(&result, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(view.badges, BadgeList::Placeholder(BADGE_PLACEHOLDER.to_string()));
    }

    #[test]
    fn score_is_clamped_and_flagged_when_out_of_range() {
        let high = score_panel(130.0);
        assert_eq!(high.fill_percent, 100.0);
        assert!(high.out_of_range);
        assert_eq!(high.headline, "130");

        let low = score_panel(-4.0);
        assert_eq!(low.fill_percent, 0.0);
        assert!(low.out_of_range);

        let normal = score_panel(64.6);
        assert_eq!(normal.fill_percent, 64.6);
        assert_eq!(normal.headline, "65");
        assert!(!normal.out_of_range);
    }
}
