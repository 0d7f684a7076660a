use chrono::{Datelike, NaiveDate, Utc};
use thiserror::Error;

use crate::config::{BUSINESS_TZ, CLOSED_WEEKDAY};
use crate::models::{
    ConsultationMethod, Consultant, CreateAppointmentRequest, IndividualServiceType, ServiceType,
};

pub const TIME_SLOTS: [&str; 7] = ["09:00", "10:00", "11:00", "13:00", "14:00", "15:00", "16:00"];

/// Why a draft cannot be submitted yet. Variants are declared in the order
/// they are reported: the first unmet condition wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookingValidationError {
    #[error("Pilih tanggal dan waktu terlebih dahulu")]
    MissingSchedule,
    #[error("Tanggal yang dipilih tidak tersedia")]
    UnavailableDate,
    #[error("Waktu yang dipilih tidak tersedia")]
    UnavailableTime,
    #[error("Nama lengkap wajib diisi")]
    MissingName,
    #[error("NIK wajib diisi")]
    MissingNik,
    #[error("NPWP wajib diisi")]
    MissingNpwp,
    #[error("Pilih konsultan terlebih dahulu")]
    MissingConsultant,
}

/// Today's calendar day in the office's time zone.
pub fn business_today() -> NaiveDate {
    Utc::now().with_timezone(&BUSINESS_TZ).date_naive()
}

/// A date can be booked from today onwards, except on the closed weekday.
pub fn is_bookable_date(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today && date.weekday() != CLOSED_WEEKDAY
}

pub fn is_time_slot(time: &str) -> bool {
    TIME_SLOTS.contains(&time)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Applicant {
    pub nama: String,
    pub nik: String,
    pub npwp: String,
    pub efin: String,
}

/// In-progress appointment request held by the wizard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub service_type: ServiceType,
    pub sub_service: IndividualServiceType,
    pub method: ConsultationMethod,
    pub consultant_id: Option<i64>,
    pub applicant: Applicant,
}

impl BookingDraft {
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), BookingValidationError> {
        if !is_bookable_date(date, today) {
            return Err(BookingValidationError::UnavailableDate);
        }
        self.date = Some(date);
        Ok(())
    }

    pub fn select_time(&mut self, time: &str) -> Result<(), BookingValidationError> {
        if !is_time_slot(time) {
            return Err(BookingValidationError::UnavailableTime);
        }
        self.time = Some(time.to_string());
        Ok(())
    }

    pub fn selected_consultant<'a>(&self, consultants: &'a [Consultant]) -> Option<&'a Consultant> {
        let id = self.consultant_id?;
        consultants.iter().find(|c| c.id == id)
    }

    /// Always derived from the selected consultant and tier, never stored.
    pub fn price(&self, consultants: &[Consultant]) -> Option<u64> {
        self.selected_consultant(consultants)
            .map(|c| c.price_for(self.service_type))
    }

    /// The sub-service is only sent for the individual-service tier.
    pub fn submitted_sub_service(&self) -> Option<IndividualServiceType> {
        self.service_type.has_sub_service().then_some(self.sub_service)
    }

    pub fn validate(&self, consultants: &[Consultant], today: NaiveDate) -> Result<(), BookingValidationError> {
        let (date, time) = match (self.date, self.time.as_deref()) {
            (Some(date), Some(time)) => (date, time),
            _ => return Err(BookingValidationError::MissingSchedule),
        };
        if !is_bookable_date(date, today) {
            return Err(BookingValidationError::UnavailableDate);
        }
        if !is_time_slot(time) {
            return Err(BookingValidationError::UnavailableTime);
        }
        if self.applicant.nama.trim().is_empty() {
            return Err(BookingValidationError::MissingName);
        }
        if self.applicant.nik.trim().is_empty() {
            return Err(BookingValidationError::MissingNik);
        }
        if self.applicant.npwp.trim().is_empty() {
            return Err(BookingValidationError::MissingNpwp);
        }
        if self.selected_consultant(consultants).is_none() {
            return Err(BookingValidationError::MissingConsultant);
        }
        Ok(())
    }

    /// Validates the draft and normalizes it into the creation request.
    pub fn to_request(
        &self,
        consultants: &[Consultant],
        today: NaiveDate,
    ) -> Result<CreateAppointmentRequest, BookingValidationError> {
        self.validate(consultants, today)?;
        let (Some(date), Some(time), Some(consultant)) =
            (self.date, self.time.clone(), self.selected_consultant(consultants))
        else {
            return Err(BookingValidationError::MissingSchedule);
        };

        let efin = self.applicant.efin.trim();
        Ok(CreateAppointmentRequest {
            consultant_id: consultant.id,
            date: date.format("%Y-%m-%d").to_string(),
            time,
            method: self.method,
            service_type: self.service_type,
            individual_service_type: self.submitted_sub_service(),
            nama: self.applicant.nama.trim().to_string(),
            nik: self.applicant.nik.trim().to_string(),
            npwp: self.applicant.npwp.trim().to_string(),
            efin: (!efin.is_empty()).then(|| efin.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::consultant;
    use serde_json::json;

    // A Saturday; 2026-10-18 is the closed Sunday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn next_monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn complete_draft() -> BookingDraft {
        BookingDraft {
            date: Some(next_monday()),
            time: Some("10:00".to_string()),
            consultant_id: Some(1),
            applicant: Applicant {
                nama: "Siti Rahma".to_string(),
                nik: "3171234567890001".to_string(),
                npwp: "09.254.294.3-407.000".to_string(),
                efin: "1234567890".to_string(),
            },
            ..BookingDraft::default()
        }
    }

    #[test]
    fn past_and_closed_days_are_not_bookable() {
        let today = today();
        assert!(is_bookable_date(today, today));
        assert!(!is_bookable_date(today.pred_opt().unwrap(), today));
        assert!(!is_bookable_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), today));
        assert!(is_bookable_date(next_monday(), today));

        let mut draft = BookingDraft::default();
        assert_eq!(
            draft.select_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), today),
            Err(BookingValidationError::UnavailableDate)
        );
        assert_eq!(draft.date, None);
    }

    #[test]
    fn only_listed_time_slots_are_accepted() {
        let mut draft = BookingDraft::default();
        assert_eq!(draft.select_time("12:00"), Err(BookingValidationError::UnavailableTime));
        assert_eq!(draft.select_time("13:00"), Ok(()));
        assert_eq!(draft.time.as_deref(), Some("13:00"));
    }

    #[test]
    fn each_missing_field_is_reported() {
        let consultants = vec![consultant(1, "Budi")];
        let cases: Vec<(fn(&mut BookingDraft), BookingValidationError)> = vec![
            (|d| d.date = None, BookingValidationError::MissingSchedule),
            (|d| d.time = None, BookingValidationError::MissingSchedule),
            (|d| d.applicant.nama = "  ".to_string(), BookingValidationError::MissingName),
            (|d| d.applicant.nik.clear(), BookingValidationError::MissingNik),
            (|d| d.applicant.npwp.clear(), BookingValidationError::MissingNpwp),
            (|d| d.consultant_id = None, BookingValidationError::MissingConsultant),
            (|d| d.consultant_id = Some(99), BookingValidationError::MissingConsultant),
        ];

        for (omit, expected) in cases {
            let mut draft = complete_draft();
            omit(&mut draft);
            assert_eq!(draft.validate(&consultants, today()), Err(expected));
        }
        assert_eq!(complete_draft().validate(&consultants, today()), Ok(()));
    }

    #[test]
    fn schedule_message_wins_when_several_fields_are_missing() {
        let consultants = vec![consultant(1, "Budi")];
        let mut draft = complete_draft();
        draft.time = None;
        draft.applicant.nama.clear();
        draft.applicant.npwp.clear();
        assert_eq!(
            draft.validate(&consultants, today()),
            Err(BookingValidationError::MissingSchedule)
        );

        let mut draft = complete_draft();
        draft.applicant.nik.clear();
        draft.applicant.npwp.clear();
        assert_eq!(draft.validate(&consultants, today()), Err(BookingValidationError::MissingNik));

        assert_eq!(
            BookingDraft::default().validate(&[], today()).unwrap_err().to_string(),
            "Pilih tanggal dan waktu terlebih dahulu"
        );
    }

    #[test]
    fn optional_efin_may_be_empty() {
        let consultants = vec![consultant(1, "Budi")];
        let mut draft = complete_draft();
        draft.applicant.efin.clear();
        let request = draft.to_request(&consultants, today()).unwrap();
        assert_eq!(request.efin, None);
    }

    #[test]
    fn price_tracks_consultant_and_service_type() {
        let mut other = consultant(2, "Sari");
        other.price_individual_service = 90_000;
        other.price_company_service = 500_000;
        let consultants = vec![consultant(1, "Budi"), other];

        let mut draft = complete_draft();
        assert_eq!(draft.price(&consultants), Some(70_000));

        for _ in 0..3 {
            for service_type in ServiceType::ALL {
                draft.service_type = service_type;
                assert_eq!(draft.price(&consultants), Some(consultants[0].price_for(service_type)));
            }
        }

        draft.consultant_id = Some(2);
        draft.service_type = ServiceType::CompanyService;
        assert_eq!(draft.price(&consultants), Some(500_000));

        draft.consultant_id = None;
        assert_eq!(draft.price(&consultants), None);
    }

    #[test]
    fn sub_service_only_sent_for_individual_service() {
        let consultants = vec![consultant(1, "Budi")];
        for service_type in ServiceType::ALL {
            let mut draft = complete_draft();
            draft.service_type = service_type;
            draft.sub_service = IndividualServiceType::IncomeTaxCalculation;

            let body = serde_json::to_value(draft.to_request(&consultants, today()).unwrap()).unwrap();
            let present = body.get("individual_service_type").is_some();
            assert_eq!(present, service_type == ServiceType::IndividualService);
        }
    }

    #[test]
    fn complete_draft_produces_expected_payload() {
        let consultants = vec![consultant(1, "Budi")];
        let request = complete_draft().to_request(&consultants, today()).unwrap();
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({
                "consultant_id": 1,
                "date": "2026-10-19",
                "time": "10:00",
                "method": "online",
                "service_type": "individual-service",
                "individual_service_type": "spt-reporting",
                "nama": "Siti Rahma",
                "nik": "3171234567890001",
                "npwp": "09.254.294.3-407.000",
                "efin": "1234567890"
            })
        );
    }
}
