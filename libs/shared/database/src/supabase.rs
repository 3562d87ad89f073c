use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::time::{parse_time_of_day, parse_timestamp};
use shared_models::{
    AvailabilityRule, Booking, BookingStatus, DayOfWeek, NewAvailabilityRule, NewBooking,
    NewPatient, NewProvider, Patient, Provider,
};

use crate::store::{ScheduleStore, StoreError, StoreResult};

const TIMESTAMP_COLUMN_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> StoreResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let anon_key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| StoreError::Backend(format!("invalid anon key header: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", auth_token.unwrap_or(&self.anon_key)))
            .map_err(|e| StoreError::Backend(format!("invalid authorization header: {}", e)))?;

        headers.insert("apikey", anon_key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::CONFLICT => StoreError::Conflict(error_text),
                _ => StoreError::Backend(format!("API error ({}): {}", status, error_text)),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

// ==============================================================================
// ROW SHAPES
// ==============================================================================

#[derive(Debug, Deserialize)]
struct PatientRow {
    id: i64,
    first_name: String,
    last_name: String,
    dob: Option<NaiveDate>,
    gender: Option<String>,
    phone: Option<String>,
    email: String,
    insurance: Option<String>,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Patient {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.dob,
            gender: row.gender,
            phone: row.phone,
            email: row.email,
            insurance: row.insurance,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    id: i64,
    doctor_id: i64,
    day_of_week: String,
    start_time: String,
    end_time: String,
    is_available: bool,
}

impl TryFrom<ScheduleRow> for AvailabilityRule {
    type Error = StoreError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let day = row
            .day_of_week
            .parse::<DayOfWeek>()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let start = parse_time_of_day(&row.start_time)
            .ok_or_else(|| StoreError::Decode(format!("schedule {} start_time '{}'", row.id, row.start_time)))?;
        let end = parse_time_of_day(&row.end_time)
            .ok_or_else(|| StoreError::Decode(format!("schedule {} end_time '{}'", row.id, row.end_time)))?;

        AvailabilityRule::new(row.id, row.doctor_id, day, start, end, row.is_available)
            .map_err(|e| StoreError::Decode(format!("schedule {}: {}", row.id, e)))
    }
}

#[derive(Debug, Deserialize)]
struct AppointmentRow {
    id: i64,
    patient_id: i64,
    doctor_id: i64,
    appointment_time: String,
    duration: u32,
    status: BookingStatus,
    is_emergency: bool,
}

impl TryFrom<AppointmentRow> for Booking {
    type Error = StoreError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let start = parse_timestamp(&row.appointment_time)
            .map_err(|e| StoreError::Decode(format!("appointment {}: {}", row.id, e)))?;

        Ok(Booking {
            id: row.id,
            patient_id: row.patient_id,
            provider_id: row.doctor_id,
            start,
            duration_minutes: row.duration,
            status: row.status,
            is_emergency: row.is_emergency,
        })
    }
}

fn first<T>(rows: Vec<T>) -> Option<T> {
    rows.into_iter().next()
}

fn returning_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

// ==============================================================================
// STORE
// ==============================================================================

/// Schedule store backed by PostgREST tables `doctors`, `schedules`,
/// `patients` and `appointments`.
///
/// Cross-process double-booking protection relies on an exclusion constraint
/// on `appointments`; a violation comes back as HTTP 409 and is reported as
/// [`StoreError::Conflict`].
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn insert_returning<T, R>(&self, path: &str, body: Value) -> StoreResult<T>
    where
        R: DeserializeOwned,
        T: TryFrom<R, Error = StoreError>,
    {
        let rows: Vec<R> = self
            .supabase
            .request_with_headers(Method::POST, path, None, Some(body), Some(returning_representation()))
            .await?;

        let row = first(rows)
            .ok_or_else(|| StoreError::Backend(format!("insert into {} returned no row", path)))?;
        T::try_from(row)
    }
}

#[async_trait]
impl ScheduleStore for SupabaseStore {
    async fn get_provider(&self, provider_id: i64) -> StoreResult<Option<Provider>> {
        let path = format!("/rest/v1/doctors?id=eq.{}", provider_id);
        let rows: Vec<Provider> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(first(rows))
    }

    async fn list_providers(&self) -> StoreResult<Vec<Provider>> {
        self.supabase
            .request(Method::GET, "/rest/v1/doctors?order=id.asc", None, None)
            .await
    }

    async fn get_providers_by_specialty(&self, specialty: &str) -> StoreResult<Vec<Provider>> {
        let path = format!(
            "/rest/v1/doctors?specialty=eq.{}&order=id.asc",
            encode_query_value(specialty)
        );
        self.supabase.request(Method::GET, &path, None, None).await
    }

    async fn get_patient(&self, patient_id: i64) -> StoreResult<Option<Patient>> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let rows: Vec<PatientRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(first(rows).map(Patient::from))
    }

    /// Case-insensitive: `ilike` with the pattern metacharacters escaped,
    /// then an exact ASCII-case-insensitive match on the returned rows.
    async fn get_patient_by_email(&self, email: &str) -> StoreResult<Option<Patient>> {
        let path = format!(
            "/rest/v1/patients?email=ilike.{}",
            encode_query_value(&escape_like_pattern(email))
        );
        let rows: Vec<PatientRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows
            .into_iter()
            .find(|row| row.email.eq_ignore_ascii_case(email))
            .map(Patient::from))
    }

    async fn get_active_rules(
        &self,
        provider_id: i64,
        day: DayOfWeek,
    ) -> StoreResult<Vec<AvailabilityRule>> {
        let path = format!(
            "/rest/v1/schedules?doctor_id=eq.{}&day_of_week=eq.{}&is_available=eq.true&order=start_time.asc",
            provider_id, day
        );
        let rows: Vec<ScheduleRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        rows.into_iter().map(AvailabilityRule::try_from).collect()
    }

    async fn get_confirmed_bookings(
        &self,
        provider_id: i64,
        date: NaiveDate,
    ) -> StoreResult<Vec<Booking>> {
        let day_start = date.and_time(NaiveTime::MIN);
        let next_day = day_start + Duration::days(1);
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&status=eq.{}&appointment_time=gte.{}&appointment_time=lt.{}&order=appointment_time.asc",
            provider_id,
            BookingStatus::Confirmed,
            day_start.format(TIMESTAMP_COLUMN_FORMAT),
            next_day.format(TIMESTAMP_COLUMN_FORMAT),
        );
        let rows: Vec<AppointmentRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn get_booking(&self, booking_id: i64) -> StoreResult<Option<Booking>> {
        let path = format!("/rest/v1/appointments?id=eq.{}", booking_id);
        let rows: Vec<AppointmentRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        first(rows).map(Booking::try_from).transpose()
    }

    async fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        let body = json!({
            "patient_id": booking.patient_id,
            "doctor_id": booking.provider_id,
            "appointment_time": booking.start.format(TIMESTAMP_COLUMN_FORMAT).to_string(),
            "duration": booking.duration_minutes,
            "status": BookingStatus::Confirmed,
            "is_emergency": booking.is_emergency,
        });
        self.insert_returning::<Booking, AppointmentRow>("/rest/v1/appointments", body).await
    }

    async fn insert_provider(&self, provider: NewProvider) -> StoreResult<Provider> {
        let body = serde_json::to_value(&provider).map_err(|e| StoreError::Decode(e.to_string()))?;
        let rows: Vec<Provider> = self
            .supabase
            .request_with_headers(Method::POST, "/rest/v1/doctors", None, Some(body), Some(returning_representation()))
            .await?;
        first(rows).ok_or_else(|| StoreError::Backend("insert into doctors returned no row".into()))
    }

    async fn insert_rule(&self, rule: NewAvailabilityRule) -> StoreResult<AvailabilityRule> {
        let body = json!({
            "doctor_id": rule.provider_id,
            "day_of_week": rule.day_of_week,
            "start_time": rule.start_time.format("%H:%M").to_string(),
            "end_time": rule.end_time.format("%H:%M").to_string(),
            "is_available": rule.is_active,
        });
        self.insert_returning::<AvailabilityRule, ScheduleRow>("/rest/v1/schedules", body).await
    }

    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        if self.get_patient_by_email(&patient.email).await?.is_some() {
            return Err(StoreError::Conflict(format!(
                "patient with email {} already exists",
                patient.email
            )));
        }

        let body = json!({
            "first_name": patient.first_name,
            "last_name": patient.last_name,
            "dob": patient.date_of_birth,
            "gender": patient.gender,
            "phone": patient.phone,
            "email": patient.email,
            "insurance": patient.insurance,
        });
        let rows: Vec<PatientRow> = self
            .supabase
            .request_with_headers(Method::POST, "/rest/v1/patients", None, Some(body), Some(returning_representation()))
            .await?;
        first(rows)
            .map(Patient::from)
            .ok_or_else(|| StoreError::Backend("insert into patients returned no row".into()))
    }
}

fn encode_query_value(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Escapes `\`, `%` and `_` so a `like`/`ilike` operand matches literally.
fn escape_like_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
