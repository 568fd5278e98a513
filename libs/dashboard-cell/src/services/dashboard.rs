use chrono::{Duration, Utc};
use tracing::{debug, warn};

use family_cell::{FamilyMemberView, FamilyService, ScopeService};
use medication_cell::LogService;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::family::FamilyMember;
use shared_summary::{adherence_rate, average_health_score};
use vitals_cell::{VitalService, VitalView};

use crate::models::{
    DashboardSummary, HealthSummary, RECENT_VITALS_DAYS, RECENT_VITALS_LIMIT, TODAYS_LOG_LIMIT,
};

pub struct DashboardService {
    config: AppConfig,
}

impl DashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Today's doses, members worst score first, last week's vitals and the summary.
    ///
    /// Membership lookup errors propagate. After that each slice is fetched
    /// independently and a failing slice comes back empty.
    pub async fn build_dashboard(
        &self,
        user: &User,
        auth_token: &str,
    ) -> Result<DashboardSummary, AppError> {
        let Some(scope) = ScopeService::new(&self.config).resolve(user, auth_token).await? else {
            debug!("User {} has no family yet, returning empty dashboard", user.id);
            return Ok(DashboardSummary::empty());
        };

        let today = self.config.local_today();
        let since = Utc::now() - Duration::days(RECENT_VITALS_DAYS);

        let logs = LogService::new(&self.config);
        let families = FamilyService::new(&self.config);
        let vitals = VitalService::new(&self.config);

        let (todays_logs, members, recent_vitals) = tokio::join!(
            logs.logs_for_date(&scope, today, Some(TODAYS_LOG_LIMIT), auth_token),
            families.members_in(&scope, "health_score.asc", auth_token),
            vitals.recent_vitals(&scope, since, Some(RECENT_VITALS_LIMIT), auth_token),
        );

        let todays_medications = or_empty("todaysMedications", todays_logs);
        let family_members: Vec<FamilyMemberView> = or_empty("familyMembers", members);
        let recent_vitals: Vec<VitalView> = or_empty("recentVitals", recent_vitals)
            .into_iter()
            .map(VitalView::from)
            .collect();

        let member_rows: Vec<FamilyMember> = family_members
            .iter()
            .map(|view| view.member.clone())
            .collect();

        let health_summary = HealthSummary {
            avg_health_score: average_health_score(&member_rows),
            medication_adherence: adherence_rate(&todays_medications),
            vitals_count: recent_vitals.len(),
        };

        Ok(DashboardSummary {
            todays_medications,
            family_members,
            recent_vitals,
            health_summary,
        })
    }
}

fn or_empty<T>(slice: &str, result: Result<Vec<T>, AppError>) -> Vec<T> {
    result.unwrap_or_else(|err| {
        warn!("Dashboard slice {} unavailable: {}", slice, err);
        Vec::new()
    })
}
