use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info};

use shared_models::{DayOfWeek, NewAvailabilityRule, NewPatient, NewProvider};

use crate::store::{ScheduleStore, StoreError, StoreResult};

const WORKING_DAYS: [DayOfWeek; 5] = [
    DayOfWeek::Monday,
    DayOfWeek::Tuesday,
    DayOfWeek::Wednesday,
    DayOfWeek::Thursday,
    DayOfWeek::Friday,
];

const WORKING_BLOCKS: [((u32, u32), (u32, u32)); 2] = [((9, 0), (12, 0)), ((13, 0), (17, 0))];

// first, last, specialty, phone, email, office
const DOCTORS: [(&str, &str, &str, &str, &str, &str); 11] = [
    ("William", "Harrison", "Cardiology", "555-0201", "cardiology@clinic.com", "Heart Center, Room 101"),
    ("Sophia", "Chen", "Dermatology", "555-0202", "dermatology@clinic.com", "Skin Clinic, Room 102"),
    ("James", "Wilson", "Pediatrics", "555-0203", "pediatrics@clinic.com", "Children's Wing, Room 103"),
    ("Olivia", "Rodriguez", "Neurology", "555-0204", "neurology@clinic.com", "Neuro Center, Room 104"),
    ("Michael", "Johnson", "Orthopedics", "555-0205", "orthopedics@clinic.com", "Bone & Joint Center, Room 105"),
    ("Emma", "Davis", "Ophthalmology", "555-0206", "ophthalmology@clinic.com", "Eye Center, Room 106"),
    ("Robert", "Martinez", "Gastroenterology", "555-0207", "gastro@clinic.com", "GI Center, Room 107"),
    ("Charlotte", "Brown", "Endocrinology", "555-0208", "endocrine@clinic.com", "Hormone Clinic, Room 108"),
    ("David", "Garcia", "Oncology", "555-0209", "oncology@clinic.com", "Cancer Center, Room 109"),
    ("Adam", "Smith", "General", "555-0210", "general@clinic.com", "General Clinic, Room 110"),
    ("Amelia", "Lee", "Psychiatry", "555-0211", "psychiatry@clinic.com", "Mental Health Wing, Room 111"),
];

// first, last, dob, gender, phone, email, insurance
const PATIENTS: [(&str, &str, &str, &str, &str, &str, &str); 11] = [
    ("John", "Doe", "1985-05-15", "M", "555-0101", "john.doe@email.com", "BlueCross"),
    ("Jane", "Smith", "1990-08-22", "F", "555-0102", "jane.smith@email.com", "Aetna"),
    ("Robert", "Johnson", "1978-03-10", "M", "555-0103", "robert.j@email.com", "Medicare"),
    ("Emily", "Williams", "1995-11-30", "F", "555-0104", "emily.w@email.com", "UnitedHealth"),
    ("Michael", "Brown", "1982-07-18", "M", "555-0105", "michael.b@email.com", "Cigna"),
    ("Sarah", "Davis", "1988-09-25", "F", "555-0106", "sarah.d@email.com", "Kaiser"),
    ("David", "Miller", "1975-12-05", "M", "555-0107", "david.m@email.com", "Humana"),
    ("Jennifer", "Wilson", "1992-04-12", "F", "555-0108", "jennifer.w@email.com", "BlueShield"),
    ("Thomas", "Moore", "1980-06-20", "M", "555-0109", "thomas.m@email.com", "Medicaid"),
    ("Amir", "Amanzadi", "1995-06-20", "M", "555-0110", "amir.amanzadi@gmail.com", "Medicaid"),
    ("Lisa", "Taylor", "1987-01-15", "F", "555-0111", "lisa.t@email.com", "Aetna"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub providers: usize,
    pub patients: usize,
    pub rules: usize,
}

/// Loads the clinic's sample doctors, patients and weekday schedules.
/// Does nothing when the store already holds providers.
pub async fn seed_sample_data(store: &dyn ScheduleStore) -> StoreResult<SeedSummary> {
    if !store.list_providers().await?.is_empty() {
        debug!("Store already populated, skipping sample data");
        return Ok(SeedSummary::default());
    }

    let mut summary = SeedSummary::default();

    for (first_name, last_name, dob, gender, phone, email, insurance) in PATIENTS {
        store
            .insert_patient(NewPatient {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                date_of_birth: NaiveDate::parse_from_str(dob, "%Y-%m-%d").ok(),
                gender: Some(gender.to_string()),
                phone: Some(phone.to_string()),
                email: email.to_string(),
                insurance: Some(insurance.to_string()),
            })
            .await?;
        summary.patients += 1;
    }

    for (first_name, last_name, specialty, phone, email, office) in DOCTORS {
        let provider = store
            .insert_provider(NewProvider {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                specialty: specialty.to_string(),
                phone: Some(phone.to_string()),
                email: Some(email.to_string()),
                office_location: Some(office.to_string()),
            })
            .await?;
        summary.providers += 1;

        for day in WORKING_DAYS {
            for ((start_h, start_m), (end_h, end_m)) in WORKING_BLOCKS {
                let rule = NewAvailabilityRule::new(
                    provider.id,
                    day,
                    clock(start_h, start_m)?,
                    clock(end_h, end_m)?,
                )
                .map_err(|e| StoreError::Integrity(e.to_string()))?;
                store.insert_rule(rule).await?;
                summary.rules += 1;
            }
        }
    }

    info!(
        "Seeded {} providers, {} patients, {} availability rules",
        summary.providers, summary.patients, summary.rules
    );
    Ok(summary)
}

fn clock(hour: u32, minute: u32) -> StoreResult<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| StoreError::Integrity(format!("invalid clock time {}:{}", hour, minute)))
}
