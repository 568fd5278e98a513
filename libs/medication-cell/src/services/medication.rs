use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use family_cell::ScopeService;
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::{AppError, FieldErrors};
use shared_models::medication::{Medication, MedicationLog};
use shared_summary::AdherenceSummary;

use crate::models::{
    check_course, CreateMedicationRequest, MedicationAdherence, MedicationListQuery,
    UpdateMedicationRequest,
};

pub struct MedicationService {
    supabase: SupabaseClient,
    config: AppConfig,
}

impl MedicationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            config: config.clone(),
        }
    }

    /// Medications in the caller's families, newest first.
    pub async fn list_medications(
        &self,
        user: &User,
        query: MedicationListQuery,
        auth_token: &str,
    ) -> Result<Vec<Medication>, AppError> {
        let scopes = ScopeService::new(&self.config);
        let Some(scope) = scopes.resolve(user, auth_token).await? else {
            return Ok(Vec::new());
        };

        let mut path = format!(
            "/rest/v1/medications?family_id={}&order=created_at.desc",
            scope.family_filter()
        );
        if let Some(member_id) = query.member_id {
            let (member_id, _) = scopes
                .target_member(&scope, Some(member_id), auth_token)
                .await?;
            path.push_str(&format!("&member_id=eq.{}", member_id));
        }
        if query.active_only.unwrap_or(true) {
            path.push_str("&is_active=eq.true");
        }

        let medications: Vec<Medication> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        Ok(medications)
    }

    pub async fn create_medication(
        &self,
        user: &User,
        request: CreateMedicationRequest,
        auth_token: &str,
    ) -> Result<Medication, AppError> {
        let dates = request.validate(self.config.local_today())?;
        debug!("Creating medication '{}' for user {}", request.name.trim(), user.id);

        let scopes = ScopeService::new(&self.config);
        let scope = scopes.ensure(user, auth_token).await?;
        let (member_id, family_id) = scopes
            .target_member(&scope, request.member_id, auth_token)
            .await?;

        let medication_data = json!({
            "family_id": family_id,
            "member_id": member_id,
            "name": request.name.trim(),
            "dosage": request.dosage.trim(),
            "frequency": request.frequency.trim(),
            "schedule_times": request.schedule_times,
            "start_date": dates.start,
            "end_date": dates.end,
            "notes": request.notes,
            "is_active": true,
        });

        let created: Vec<Medication> = self
            .supabase
            .write_returning(Method::POST, "/rest/v1/medications", auth_token, Some(medication_data))
            .await?;

        let medication = created
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Medication insert returned no row".to_string()))?;

        info!("Medication {} created for member {}", medication.id, member_id);
        Ok(medication)
    }

    pub async fn update_medication(
        &self,
        user: &User,
        medication_id: Uuid,
        request: UpdateMedicationRequest,
        auth_token: &str,
    ) -> Result<Medication, AppError> {
        let (start, end) = request.validate()?;

        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let existing: Medication = scopes
            .fetch_in_scope("medications", medication_id, &scope, auth_token, "Medication")
            .await?;

        let mut errors = FieldErrors::new();
        check_course(
            &mut errors,
            start.or(Some(existing.start_date)),
            end.unwrap_or(existing.end_date),
        );
        errors.into_result()?;

        let mut update_data = Map::new();
        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(dosage) = request.dosage {
            update_data.insert("dosage".to_string(), json!(dosage.trim()));
        }
        if let Some(frequency) = request.frequency {
            update_data.insert("frequency".to_string(), json!(frequency.trim()));
        }
        if let Some(times) = request.schedule_times {
            update_data.insert("schedule_times".to_string(), json!(times));
        }
        if let Some(start) = start {
            update_data.insert("start_date".to_string(), json!(start));
        }
        if let Some(end) = end {
            update_data.insert("end_date".to_string(), json!(end));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }
        if let Some(is_active) = request.is_active {
            update_data.insert("is_active".to_string(), json!(is_active));
        }

        if update_data.is_empty() {
            return Ok(existing);
        }

        self.patch(medication_id, &scope.family_filter(), update_data, auth_token)
            .await
    }

    /// Deactivate rather than delete, so past logs keep their medication.
    pub async fn deactivate_medication(
        &self,
        user: &User,
        medication_id: Uuid,
        auth_token: &str,
    ) -> Result<Medication, AppError> {
        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let _: Medication = scopes
            .fetch_in_scope("medications", medication_id, &scope, auth_token, "Medication")
            .await?;

        let mut update_data = Map::new();
        update_data.insert("is_active".to_string(), json!(false));

        let medication = self
            .patch(medication_id, &scope.family_filter(), update_data, auth_token)
            .await?;
        info!("Medication {} deactivated by user {}", medication_id, user.id);
        Ok(medication)
    }

    /// Adherence of one medication over the last `days` local days, today included.
    pub async fn medication_adherence(
        &self,
        user: &User,
        medication_id: Uuid,
        days: u32,
        auth_token: &str,
    ) -> Result<MedicationAdherence, AppError> {
        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let _: Medication = scopes
            .fetch_in_scope("medications", medication_id, &scope, auth_token, "Medication")
            .await?;

        let today = self.config.local_today();
        let since = today - Duration::days(i64::from(days) - 1);
        let path = format!(
            "/rest/v1/medication_logs?medication_id=eq.{}&scheduled_date=gte.{}&scheduled_date=lte.{}",
            medication_id, since, today
        );
        let logs: Vec<MedicationLog> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let summary = AdherenceSummary::from_logs(&logs);
        Ok(MedicationAdherence {
            medication_id,
            days,
            adherence_rate: summary.rate().unwrap_or(0),
            decided_doses: summary.decided_doses,
            taken_doses: summary.taken_doses,
        })
    }

    async fn patch(
        &self,
        medication_id: Uuid,
        family_filter: &str,
        mut update_data: Map<String, Value>,
        auth_token: &str,
    ) -> Result<Medication, AppError> {
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!(
            "/rest/v1/medications?id=eq.{}&family_id={}",
            medication_id, family_filter
        );
        let updated: Vec<Medication> = self
            .supabase
            .write_returning(Method::PATCH, &path, auth_token, Some(Value::Object(update_data)))
            .await?;

        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Medication not found".to_string()))
    }
}
