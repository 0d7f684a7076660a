use std::rc::Rc;

use chrono::NaiveDate;
use log::{error, info, warn};
use yew::Reducible;

use crate::api::BookingApi;
use crate::booking::draft::{BookingDraft, BookingValidationError};
use crate::error::ApiResult;
use crate::models::{
    Appointment, ConsultationMethod, Consultant, CreateAppointmentRequest, IndividualServiceType,
    ServiceType,
};

#[derive(Clone, Debug, PartialEq)]
pub enum ConsultantsState {
    Loading,
    Loaded(Vec<Consultant>),
    Failed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardPhase {
    Editing,
    Submitting,
    Submitted,
}

/// Auto-dismissing message; `id` lets a timer clear only the notice it was armed for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: u32,
    pub message: String,
}

pub enum WizardAction {
    ConsultantsLoaded(Vec<Consultant>),
    ConsultantsFailed(String),
    SelectDate { date: NaiveDate, today: NaiveDate },
    SelectTime(String),
    SetServiceType(ServiceType),
    SetSubService(IndividualServiceType),
    SetMethod(ConsultationMethod),
    SelectConsultant(i64),
    SetName(String),
    SetNik(String),
    SetNpwp(String),
    SetEfin(String),
    Reject(BookingValidationError),
    DismissNotice(u32),
    SubmitStarted,
    SubmitFailed(String),
    SubmitSucceeded,
}

/// What pressing "submit" should do right now.
#[derive(Debug, PartialEq)]
pub enum Submission {
    Busy,
    Rejected(BookingValidationError),
    Ready(CreateAppointmentRequest),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BookingWizard {
    pub draft: BookingDraft,
    pub phase: WizardPhase,
    pub consultants: ConsultantsState,
    pub notice: Option<Notice>,
    pub submit_error: Option<String>,
    notice_seq: u32,
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self {
            draft: BookingDraft::default(),
            phase: WizardPhase::Editing,
            consultants: ConsultantsState::Loading,
            notice: None,
            submit_error: None,
            notice_seq: 0,
        }
    }
}

impl BookingWizard {
    pub fn consultants(&self) -> &[Consultant] {
        match &self.consultants {
            ConsultantsState::Loaded(list) => list,
            _ => &[],
        }
    }

    pub fn selected_consultant(&self) -> Option<&Consultant> {
        self.draft.selected_consultant(self.consultants())
    }

    pub fn price(&self) -> Option<u64> {
        self.draft.price(self.consultants())
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == WizardPhase::Submitting
    }

    pub fn begin_submit(&self, today: NaiveDate) -> Submission {
        if self.phase != WizardPhase::Editing {
            return Submission::Busy;
        }
        match self.draft.to_request(self.consultants(), today) {
            Ok(request) => Submission::Ready(request),
            Err(reason) => Submission::Rejected(reason),
        }
    }

    fn show_notice(&mut self, message: String) {
        self.notice_seq = self.notice_seq.wrapping_add(1);
        self.notice = Some(Notice { id: self.notice_seq, message });
    }

    pub fn apply(mut self, action: WizardAction) -> Self {
        match action {
            WizardAction::ConsultantsLoaded(list) => {
                self.consultants = ConsultantsState::Loaded(list);
            }
            WizardAction::ConsultantsFailed(message) => {
                self.consultants = ConsultantsState::Failed(message);
            }
            WizardAction::Reject(reason) => self.show_notice(reason.to_string()),
            WizardAction::DismissNotice(id) => {
                if self.notice.as_ref().map(|n| n.id) == Some(id) {
                    self.notice = None;
                }
            }
            WizardAction::SubmitStarted => {
                if self.phase == WizardPhase::Editing {
                    self.phase = WizardPhase::Submitting;
                    self.submit_error = None;
                }
            }
            WizardAction::SubmitFailed(message) => {
                if self.phase == WizardPhase::Submitting {
                    self.phase = WizardPhase::Editing;
                    self.submit_error = Some(message);
                }
            }
            WizardAction::SubmitSucceeded => {
                if self.phase == WizardPhase::Submitting {
                    self.phase = WizardPhase::Submitted;
                }
            }
            // The payload is already on its way; keep the form frozen.
            _ if self.phase != WizardPhase::Editing => {}
            WizardAction::SelectDate { date, today } => {
                if let Err(reason) = self.draft.select_date(date, today) {
                    self.show_notice(reason.to_string());
                }
            }
            WizardAction::SelectTime(time) => {
                if let Err(reason) = self.draft.select_time(&time) {
                    self.show_notice(reason.to_string());
                }
            }
            WizardAction::SetServiceType(service_type) => self.draft.service_type = service_type,
            WizardAction::SetSubService(sub_service) => self.draft.sub_service = sub_service,
            WizardAction::SetMethod(method) => self.draft.method = method,
            WizardAction::SelectConsultant(id) => self.draft.consultant_id = Some(id),
            WizardAction::SetName(value) => self.draft.applicant.nama = value,
            WizardAction::SetNik(value) => self.draft.applicant.nik = value,
            WizardAction::SetNpwp(value) => self.draft.applicant.npwp = value,
            WizardAction::SetEfin(value) => self.draft.applicant.efin = value,
        }
        self
    }
}

impl Reducible for BookingWizard {
    type Action = WizardAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        Rc::new((*self).clone().apply(action))
    }
}

pub async fn load_consultants<A: BookingApi>(api: &A) -> ApiResult<Vec<Consultant>> {
    match api.list_consultants().await {
        Ok(list) => {
            info!("Loaded {} consultants", list.len());
            Ok(list)
        }
        Err(e) => {
            warn!("Failed to load consultants: {}", e);
            Err(e)
        }
    }
}

/// Posts the booking once. The caller owns retries.
pub async fn submit_booking<A: BookingApi>(
    api: &A,
    request: &CreateAppointmentRequest,
) -> ApiResult<Appointment> {
    info!(
        "Submitting booking for consultant {} on {} {}",
        request.consultant_id, request.date, request.time
    );
    match api.create_appointment(request).await {
        Ok(appointment) => {
            info!("Appointment {} created with status {:?}", appointment.id, appointment.status);
            Ok(appointment)
        }
        Err(e) => {
            error!("Booking submission failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::fixtures::{appointment, consultant};
    use crate::models::AppointmentStatus;
    use futures::executor::block_on;
    use std::cell::RefCell;

    struct FakeBookingApi {
        consultants: ApiResult<Vec<Consultant>>,
        create_result: ApiResult<Appointment>,
        created: RefCell<Vec<CreateAppointmentRequest>>,
    }

    impl FakeBookingApi {
        fn new(create_result: ApiResult<Appointment>) -> Self {
            Self {
                consultants: Ok(vec![consultant(1, "Budi Santoso")]),
                create_result,
                created: RefCell::new(Vec::new()),
            }
        }
    }

    impl BookingApi for FakeBookingApi {
        async fn list_consultants(&self) -> ApiResult<Vec<Consultant>> {
            self.consultants.clone()
        }

        async fn create_appointment(&self, request: &CreateAppointmentRequest) -> ApiResult<Appointment> {
            self.created.borrow_mut().push(request.clone());
            self.create_result.clone()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn filled_wizard() -> BookingWizard {
        let actions = vec![
            WizardAction::ConsultantsLoaded(vec![consultant(1, "Budi Santoso")]),
            WizardAction::SetServiceType(ServiceType::IndividualService),
            WizardAction::SelectDate { date: monday(), today: today() },
            WizardAction::SelectTime("10:00".to_string()),
            WizardAction::SelectConsultant(1),
            WizardAction::SetName("Siti Rahma".to_string()),
            WizardAction::SetNik("3171234567890001".to_string()),
            WizardAction::SetNpwp("09.254.294.3-407.000".to_string()),
            WizardAction::SetEfin("1234567890".to_string()),
        ];
        actions
            .into_iter()
            .fold(BookingWizard::default(), BookingWizard::apply)
    }

    #[test]
    fn rejected_submit_shows_prioritized_notice_and_keeps_data() {
        let wizard = BookingWizard::default()
            .apply(WizardAction::ConsultantsLoaded(vec![consultant(1, "Budi")]))
            .apply(WizardAction::SetName("Siti".to_string()));

        let reason = match wizard.begin_submit(today()) {
            Submission::Rejected(reason) => reason,
            other => panic!("expected rejection, got {:?}", other),
        };
        assert_eq!(reason, BookingValidationError::MissingSchedule);

        let wizard = wizard.apply(WizardAction::Reject(reason));
        assert_eq!(
            wizard.notice.as_ref().map(|n| n.message.as_str()),
            Some("Pilih tanggal dan waktu terlebih dahulu")
        );
        assert_eq!(wizard.phase, WizardPhase::Editing);
        assert_eq!(wizard.draft.applicant.nama, "Siti");
    }

    #[test]
    fn stale_dismiss_timer_keeps_newer_notice() {
        let wizard = BookingWizard::default()
            .apply(WizardAction::Reject(BookingValidationError::MissingName));
        let first = wizard.notice.clone().unwrap().id;
        let wizard = wizard.apply(WizardAction::Reject(BookingValidationError::MissingNik));
        let second = wizard.notice.clone().unwrap().id;

        let wizard = wizard.apply(WizardAction::DismissNotice(first));
        assert_eq!(wizard.notice.as_ref().map(|n| n.id), Some(second));
        let wizard = wizard.apply(WizardAction::DismissNotice(second));
        assert_eq!(wizard.notice, None);
    }

    #[test]
    fn closed_day_selection_is_refused_with_notice() {
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let wizard = BookingWizard::default().apply(WizardAction::SelectDate { date: sunday, today: today() });
        assert_eq!(wizard.draft.date, None);
        assert!(wizard.notice.is_some());
    }

    #[test]
    fn no_second_submission_while_one_is_in_flight() {
        let wizard = filled_wizard();
        assert!(matches!(wizard.begin_submit(today()), Submission::Ready(_)));

        let wizard = wizard.apply(WizardAction::SubmitStarted);
        assert!(wizard.is_submitting());
        assert_eq!(wizard.begin_submit(today()), Submission::Busy);
    }

    #[test]
    fn failed_submission_returns_to_editing_with_error() {
        let wizard = filled_wizard()
            .apply(WizardAction::SubmitStarted)
            .apply(WizardAction::SubmitFailed("Jadwal sudah terisi".to_string()));

        assert_eq!(wizard.phase, WizardPhase::Editing);
        assert_eq!(wizard.submit_error.as_deref(), Some("Jadwal sudah terisi"));
        assert_eq!(wizard.draft, filled_wizard().draft);
        assert!(matches!(wizard.begin_submit(today()), Submission::Ready(_)));

        let retried = wizard.apply(WizardAction::SubmitStarted);
        assert_eq!(retried.submit_error, None);
    }

    #[test]
    fn edits_are_ignored_while_submitting() {
        let wizard = filled_wizard()
            .apply(WizardAction::SubmitStarted)
            .apply(WizardAction::SetName("Someone Else".to_string()));
        assert_eq!(wizard.draft.applicant.nama, "Siti Rahma");
    }

    #[test]
    fn reselecting_consultant_and_toggling_method_are_idempotent() {
        let before = filled_wizard();
        let after = before
            .clone()
            .apply(WizardAction::SelectConsultant(1))
            .apply(WizardAction::SelectConsultant(1))
            .apply(WizardAction::SetMethod(ConsultationMethod::Offline))
            .apply(WizardAction::SetMethod(ConsultationMethod::Online));
        assert_eq!(after.draft, before.draft);
    }

    #[test]
    fn price_is_rederived_after_tier_changes() {
        let mut wizard = filled_wizard();
        for service_type in [
            ServiceType::CompanyService,
            ServiceType::IndividualJasa,
            ServiceType::IndividualService,
            ServiceType::CompanyService,
        ] {
            wizard = wizard.apply(WizardAction::SetServiceType(service_type));
            assert_eq!(
                wizard.price(),
                Some(consultant(1, "Budi Santoso").price_for(service_type))
            );
        }
    }

    #[test]
    fn consultant_fetch_failure_leaves_form_usable() {
        let wizard = BookingWizard::default()
            .apply(WizardAction::ConsultantsFailed("Gagal memuat".to_string()))
            .apply(WizardAction::SetName("Siti".to_string()));
        assert_eq!(wizard.consultants, ConsultantsState::Failed("Gagal memuat".to_string()));
        assert_eq!(wizard.draft.applicant.nama, "Siti");
        assert!(wizard.consultants().is_empty());
    }

    #[test]
    fn submit_posts_the_normalized_request_once() {
        let returned = appointment(77, AppointmentStatus::PendingPayment);
        let api = FakeBookingApi::new(Ok(returned.clone()));
        let request = match filled_wizard().begin_submit(today()) {
            Submission::Ready(request) => request,
            other => panic!("expected ready submission, got {:?}", other),
        };

        let result = block_on(submit_booking(&api, &request));
        assert_eq!(result, Ok(returned));

        let created = api.created.borrow();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].consultant_id, 1);
        assert_eq!(created[0].date, "2026-10-19");
        assert_eq!(created[0].time, "10:00");
        assert_eq!(created[0].method, ConsultationMethod::Online);
        assert_eq!(created[0].individual_service_type, Some(IndividualServiceType::SptReporting));
    }

    #[test]
    fn submit_failure_is_propagated() {
        let api = FakeBookingApi::new(Err(ApiError::Timeout));
        let request = match filled_wizard().begin_submit(today()) {
            Submission::Ready(request) => request,
            other => panic!("expected ready submission, got {:?}", other),
        };
        assert_eq!(block_on(submit_booking(&api, &request)), Err(ApiError::Timeout));
    }

    #[test]
    fn consultants_are_loaded_through_the_api() {
        let mut api = FakeBookingApi::new(Err(ApiError::Timeout));
        assert_eq!(block_on(load_consultants(&api)).map(|l| l.len()), Ok(1));

        api.consultants = Err(ApiError::Network("offline".to_string()));
        assert!(block_on(load_consultants(&api)).is_err());
    }
}
