use std::cell::Cell;
use std::rc::Rc;

use log::{error, info, warn};
use serde::Deserialize;
use thiserror::Error;
use yew::{Callback, Reducible};

use crate::api::PaymentApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{Appointment, PaymentSession, PaymentStatus, StatusUpdateRequest};

/// Navigation state handed from the booking wizard (or dashboard) to the
/// payment page.
#[derive(Clone, Debug, PartialEq)]
pub struct BookingNavState {
    pub booking_data: Appointment,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Data booking tidak ditemukan")]
    MissingBooking,
    #[error("Layanan pembayaran belum siap, silakan muat ulang halaman")]
    WidgetUnavailable,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result object the hosted checkout passes to its callbacks. Every field
/// is optional because the widget omits them freely.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WidgetResult {
    pub order_id: Option<String>,
    pub transaction_status: Option<String>,
    pub status_code: Option<String>,
    pub status_message: Option<String>,
    pub payment_type: Option<String>,
    pub gross_amount: Option<String>,
}

/// The one terminal callback a widget invocation produces.
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetEvent {
    Success(WidgetResult),
    Pending(WidgetResult),
    Error(WidgetResult),
    Closed,
}

impl WidgetEvent {
    /// Status to report to the backend; closing the popup reports nothing.
    pub fn reported_status(&self) -> Option<PaymentStatus> {
        match self {
            WidgetEvent::Success(_) => Some(PaymentStatus::Paid),
            WidgetEvent::Pending(_) => Some(PaymentStatus::Pending),
            WidgetEvent::Error(_) => Some(PaymentStatus::Failed),
            WidgetEvent::Closed => None,
        }
    }
}

/// Seam over the hosted checkout popup.
pub trait CheckoutWidget {
    fn open(&self, token: &str, on_event: Callback<WidgetEvent>) -> Result<(), CheckoutError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    Pending,
    Failed,
}

impl PaymentOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            PaymentOutcome::Paid => "Pembayaran berhasil! Konsultasi Anda akan segera dikonfirmasi.",
            PaymentOutcome::Pending => {
                "Pembayaran sedang diproses. Selesaikan pembayaran sesuai instruksi yang diberikan."
            }
            PaymentOutcome::Failed => "Pembayaran gagal. Silakan coba lagi.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutPhase {
    Idle,
    RequestingSession,
    AwaitingWidget(PaymentSession),
    Terminal(PaymentOutcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

pub enum CheckoutAction {
    PayRequested,
    SessionCreated(PaymentSession),
    SessionFailed(String),
    WidgetFailed(String),
    Widget(WidgetEvent),
    DismissError,
}

/// Checkout state for one appointment.
#[derive(Clone, Debug, PartialEq)]
pub struct PaymentCheckout {
    pub appointment: Appointment,
    pub phase: CheckoutPhase,
    pub banner: Option<Banner>,
    pub blocking_error: Option<String>,
}

impl PaymentCheckout {
    pub fn new(appointment: Appointment) -> Self {
        Self {
            appointment,
            phase: CheckoutPhase::Idle,
            banner: None,
            blocking_error: None,
        }
    }

    pub fn price(&self) -> Option<u64> {
        self.appointment.price()
    }

    /// A new attempt may start from idle or after a non-successful outcome.
    pub fn can_pay(&self) -> bool {
        self.appointment.is_payable()
            && matches!(
                self.phase,
                CheckoutPhase::Idle
                    | CheckoutPhase::Terminal(PaymentOutcome::Pending)
                    | CheckoutPhase::Terminal(PaymentOutcome::Failed)
            )
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            CheckoutPhase::RequestingSession | CheckoutPhase::AwaitingWidget(_)
        )
    }

    fn banner(&mut self, kind: BannerKind, message: &str) {
        self.banner = Some(Banner { kind, message: message.to_string() });
    }

    pub fn apply(mut self, action: CheckoutAction) -> Self {
        match (action, self.phase.clone()) {
            (CheckoutAction::PayRequested, _) if self.can_pay() => {
                self.phase = CheckoutPhase::RequestingSession;
                self.banner = None;
                self.blocking_error = None;
            }
            (CheckoutAction::SessionCreated(session), CheckoutPhase::RequestingSession) => {
                self.phase = CheckoutPhase::AwaitingWidget(session);
            }
            (CheckoutAction::SessionFailed(message), CheckoutPhase::RequestingSession) => {
                self.phase = CheckoutPhase::Idle;
                self.blocking_error = Some(message);
            }
            (CheckoutAction::WidgetFailed(message), CheckoutPhase::AwaitingWidget(_)) => {
                self.phase = CheckoutPhase::Idle;
                self.blocking_error = Some(message);
            }
            (CheckoutAction::Widget(event), CheckoutPhase::AwaitingWidget(_)) => match event {
                WidgetEvent::Success(_) => {
                    self.phase = CheckoutPhase::Terminal(PaymentOutcome::Paid);
                    self.banner(BannerKind::Success, PaymentOutcome::Paid.message());
                }
                WidgetEvent::Pending(_) => {
                    self.phase = CheckoutPhase::Terminal(PaymentOutcome::Pending);
                    self.banner(BannerKind::Warning, PaymentOutcome::Pending.message());
                }
                WidgetEvent::Error(_) => {
                    self.phase = CheckoutPhase::Terminal(PaymentOutcome::Failed);
                    self.banner(BannerKind::Error, PaymentOutcome::Failed.message());
                }
                WidgetEvent::Closed => {
                    self.phase = CheckoutPhase::Idle;
                    self.banner(
                        BannerKind::Info,
                        "Anda menutup jendela pembayaran sebelum menyelesaikan pembayaran.",
                    );
                }
            },
            (CheckoutAction::DismissError, _) => self.blocking_error = None,
            (_, phase) => warn!("Ignoring checkout action in phase {:?}", phase),
        }
        self
    }
}

impl Reducible for PaymentCheckout {
    type Action = CheckoutAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        Rc::new((*self).clone().apply(action))
    }
}

/// One widget invocation. Settles at most once, whatever the widget does.
#[derive(Debug)]
pub struct CheckoutAttempt {
    session: PaymentSession,
    settled: Cell<bool>,
}

impl CheckoutAttempt {
    pub fn new(session: PaymentSession) -> Self {
        Self { session, settled: Cell::new(false) }
    }

    pub fn reference_number(&self) -> &str {
        &self.session.reference_number
    }

    /// Marks the attempt settled. Only the first caller gets `true`.
    pub fn claim(&self) -> bool {
        !self.settled.replace(true)
    }

    fn update_for(&self, event: &WidgetEvent) -> Option<StatusUpdateRequest> {
        event.reported_status().map(|status| StatusUpdateRequest {
            reference_number: self.session.reference_number.clone(),
            status,
        })
    }
}

/// Requests a fresh session, announces it, then hands its token to the
/// widget. The attempt exists before the widget opens, so a callback fired
/// during `open` already has something to settle. No network call is made
/// without an appointment.
pub async fn pay_now<A, W, F>(
    api: &A,
    widget: &W,
    booking: Option<&Appointment>,
    dispatch: &Callback<CheckoutAction>,
    on_event: F,
) -> Result<Rc<CheckoutAttempt>, CheckoutError>
where
    A: PaymentApi,
    W: CheckoutWidget,
    F: FnOnce(Rc<CheckoutAttempt>) -> Callback<WidgetEvent>,
{
    let session = match request_session(api, booking).await {
        Ok(session) => session,
        Err(e) => {
            dispatch.emit(CheckoutAction::SessionFailed(e.to_string()));
            return Err(e);
        }
    };
    let attempt = Rc::new(CheckoutAttempt::new(session.clone()));
    dispatch.emit(CheckoutAction::SessionCreated(session.clone()));

    info!("Opening checkout for reference {}", session.reference_number);
    if let Err(e) = widget.open(&session.token, on_event(attempt.clone())) {
        error!("Checkout for reference {} did not open: {}", session.reference_number, e);
        dispatch.emit(CheckoutAction::WidgetFailed(e.to_string()));
        return Err(e);
    }
    Ok(attempt)
}

async fn request_session<A: PaymentApi>(
    api: &A,
    booking: Option<&Appointment>,
) -> Result<PaymentSession, CheckoutError> {
    let appointment = booking.ok_or(CheckoutError::MissingBooking)?;
    info!("Requesting payment session for appointment {}", appointment.id);
    api.create_payment_session(appointment.id).await.map_err(|e| {
        error!("Payment session for appointment {} failed: {}", appointment.id, e);
        CheckoutError::from(e)
    })
}

/// Routes one widget callback: the first event of an attempt updates the
/// page and, unless it is a close, is reported to the backend. Later events
/// of the same attempt are dropped.
pub async fn handle_widget_event<A: PaymentApi>(
    attempt: &CheckoutAttempt,
    event: WidgetEvent,
    api: &A,
    dispatch: &Callback<CheckoutAction>,
) {
    if !attempt.claim() {
        warn!(
            "Dropping extra checkout callback {:?} for {}",
            event,
            attempt.reference_number()
        );
        return;
    }
    let update = attempt.update_for(&event);
    dispatch.emit(CheckoutAction::Widget(event));
    if let Some(update) = update {
        let _ = reconcile(api, update).await;
    }
}

/// Best-effort status report. Failures are logged only and never retried.
pub async fn reconcile<A: PaymentApi>(api: &A, update: StatusUpdateRequest) -> ApiResult<()> {
    let result = api.update_payment_status(&update).await;
    match &result {
        Ok(()) => info!(
            "Reported payment {:?} for reference {}",
            update.status, update.reference_number
        ),
        Err(e) => error!(
            "Could not report payment {:?} for reference {}: {}",
            update.status, update.reference_number, e
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::appointment;
    use crate::models::AppointmentStatus;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakePaymentApi {
        session_calls: RefCell<Vec<i64>>,
        updates: RefCell<Vec<StatusUpdateRequest>>,
        fail_session: bool,
        fail_update: bool,
    }

    impl PaymentApi for FakePaymentApi {
        async fn create_payment_session(&self, appointment_id: i64) -> ApiResult<PaymentSession> {
            self.session_calls.borrow_mut().push(appointment_id);
            if self.fail_session {
                return Err(ApiError::server(500, None));
            }
            let n = self.session_calls.borrow().len();
            Ok(PaymentSession {
                reference_number: format!("REF-{}-{}", appointment_id, n),
                token: format!("snap-token-{}", n),
            })
        }

        async fn update_payment_status(&self, update: &StatusUpdateRequest) -> ApiResult<()> {
            self.updates.borrow_mut().push(update.clone());
            if self.fail_update {
                return Err(ApiError::Network("offline".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeWidget {
        opened_with: RefCell<Vec<String>>,
        handler: RefCell<Option<Callback<WidgetEvent>>>,
        fire_on_open: Option<WidgetEvent>,
        unavailable: bool,
    }

    impl CheckoutWidget for FakeWidget {
        fn open(&self, token: &str, on_event: Callback<WidgetEvent>) -> Result<(), CheckoutError> {
            if self.unavailable {
                return Err(CheckoutError::WidgetUnavailable);
            }
            self.opened_with.borrow_mut().push(token.to_string());
            *self.handler.borrow_mut() = Some(on_event.clone());
            if let Some(event) = self.fire_on_open.clone() {
                on_event.emit(event);
            }
            Ok(())
        }
    }

    impl FakeWidget {
        fn fire(&self, event: WidgetEvent) {
            let handler = self.handler.borrow().clone().expect("widget was not opened");
            handler.emit(event);
        }
    }

    /// Page stand-in: applies dispatched actions to a checkout and queues
    /// widget callbacks the way `spawn_local` defers them.
    struct Page {
        state: Rc<RefCell<PaymentCheckout>>,
        dispatch: Callback<CheckoutAction>,
        queued: Rc<RefCell<Vec<(Rc<CheckoutAttempt>, WidgetEvent)>>>,
    }

    impl Page {
        fn new(booking: Appointment) -> Self {
            let state = Rc::new(RefCell::new(
                PaymentCheckout::new(booking).apply(CheckoutAction::PayRequested),
            ));
            let sink = state.clone();
            let dispatch = Callback::from(move |action: CheckoutAction| {
                let next = sink.borrow().clone().apply(action);
                *sink.borrow_mut() = next;
            });
            Self { state, dispatch, queued: Rc::default() }
        }

        fn handler(&self) -> impl FnOnce(Rc<CheckoutAttempt>) -> Callback<WidgetEvent> {
            let queued = self.queued.clone();
            move |attempt| {
                Callback::from(move |event: WidgetEvent| queued.borrow_mut().push((attempt.clone(), event)))
            }
        }

        fn drain(&self, api: &FakePaymentApi) {
            let pending: Vec<_> = self.queued.borrow_mut().drain(..).collect();
            for (attempt, event) in pending {
                block_on(handle_widget_event(&attempt, event, api, &self.dispatch));
            }
        }

        fn state(&self) -> PaymentCheckout {
            self.state.borrow().clone()
        }
    }

    fn booked() -> Appointment {
        appointment(77, AppointmentStatus::PendingPayment)
    }

    #[test]
    fn missing_booking_makes_no_network_calls() {
        let api = FakePaymentApi::default();
        let widget = FakeWidget::default();
        let page = Page::new(booked());

        let result = block_on(pay_now(&api, &widget, None, &page.dispatch, page.handler()));
        assert!(matches!(result, Err(CheckoutError::MissingBooking)));
        assert!(api.session_calls.borrow().is_empty());
        assert!(api.updates.borrow().is_empty());
        assert!(widget.opened_with.borrow().is_empty());
        assert_eq!(page.state().blocking_error.as_deref(), Some("Data booking tidak ditemukan"));
    }

    #[test]
    fn pending_callback_reports_pending_once() {
        let api = FakePaymentApi::default();
        let widget = FakeWidget::default();
        let page = Page::new(booked());

        let attempt =
            block_on(pay_now(&api, &widget, Some(&booked()), &page.dispatch, page.handler())).unwrap();
        assert_eq!(*api.session_calls.borrow(), vec![77]);
        assert_eq!(widget.opened_with.borrow().len(), 1);
        assert!(page.state().is_busy());

        widget.fire(WidgetEvent::Pending(WidgetResult::default()));
        widget.fire(WidgetEvent::Success(WidgetResult::default()));
        page.drain(&api);

        let updates = api.updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, PaymentStatus::Pending);
        assert_eq!(updates[0].reference_number, attempt.reference_number());

        let state = page.state();
        assert_eq!(state.phase, CheckoutPhase::Terminal(PaymentOutcome::Pending));
        assert_eq!(state.banner.map(|b| b.kind), Some(BannerKind::Warning));
    }

    #[test]
    fn closing_the_widget_reports_nothing_and_allows_retry() {
        let api = FakePaymentApi::default();
        let widget = FakeWidget::default();
        let page = Page::new(booked());

        block_on(pay_now(&api, &widget, Some(&booked()), &page.dispatch, page.handler())).unwrap();
        widget.fire(WidgetEvent::Closed);
        page.drain(&api);

        assert!(api.updates.borrow().is_empty());
        let state = page.state();
        assert_eq!(state.phase, CheckoutPhase::Idle);
        assert_eq!(state.banner.as_ref().map(|b| b.kind), Some(BannerKind::Info));
        assert!(state.can_pay());
        assert_eq!(
            state.apply(CheckoutAction::PayRequested).phase,
            CheckoutPhase::RequestingSession
        );
    }

    #[test]
    fn callback_fired_while_opening_is_settled_and_shown() {
        let api = FakePaymentApi::default();
        let widget = FakeWidget {
            fire_on_open: Some(WidgetEvent::Error(WidgetResult::default())),
            ..FakeWidget::default()
        };
        let page = Page::new(booked());

        let attempt =
            block_on(pay_now(&api, &widget, Some(&booked()), &page.dispatch, page.handler())).unwrap();
        page.drain(&api);

        let updates = api.updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, PaymentStatus::Failed);
        assert_eq!(updates[0].reference_number, attempt.reference_number());

        let state = page.state();
        assert_eq!(state.phase, CheckoutPhase::Terminal(PaymentOutcome::Failed));
        assert!(!state.is_busy());
        assert!(state.can_pay());
    }

    #[test]
    fn late_callback_from_an_earlier_attempt_is_dropped() {
        let api = FakePaymentApi::default();
        let widget = FakeWidget::default();
        let page = Page::new(booked());

        block_on(pay_now(&api, &widget, Some(&booked()), &page.dispatch, page.handler())).unwrap();
        let first_handler = widget.handler.borrow().clone().unwrap();
        widget.fire(WidgetEvent::Closed);
        page.drain(&api);

        page.dispatch.emit(CheckoutAction::PayRequested);
        block_on(pay_now(&api, &widget, Some(&booked()), &page.dispatch, page.handler())).unwrap();
        first_handler.emit(WidgetEvent::Success(WidgetResult::default()));
        page.drain(&api);

        assert!(api.updates.borrow().is_empty());
        assert!(matches!(page.state().phase, CheckoutPhase::AwaitingWidget(_)));
    }

    #[test]
    fn each_attempt_gets_a_fresh_session() {
        let api = FakePaymentApi::default();
        let widget = FakeWidget::default();
        let page = Page::new(booked());
        let booking = booked();

        let first =
            block_on(pay_now(&api, &widget, Some(&booking), &page.dispatch, page.handler())).unwrap();
        let second =
            block_on(pay_now(&api, &widget, Some(&booking), &page.dispatch, page.handler())).unwrap();
        assert_ne!(first.reference_number(), second.reference_number());
        assert_eq!(api.session_calls.borrow().len(), 2);
        assert_eq!(widget.opened_with.borrow().len(), 2);
    }

    #[test]
    fn only_the_first_callback_settles_an_attempt() {
        let attempt = CheckoutAttempt::new(PaymentSession {
            reference_number: "REF-1".to_string(),
            token: "tok".to_string(),
        });
        assert!(attempt.claim());
        assert!(!attempt.claim());
        assert_eq!(attempt.reference_number(), "REF-1");
    }

    #[test]
    fn widget_outcomes_map_to_backend_statuses() {
        let result = WidgetResult::default();
        assert_eq!(WidgetEvent::Success(result.clone()).reported_status(), Some(PaymentStatus::Paid));
        assert_eq!(WidgetEvent::Pending(result.clone()).reported_status(), Some(PaymentStatus::Pending));
        assert_eq!(WidgetEvent::Error(result).reported_status(), Some(PaymentStatus::Failed));
        assert_eq!(WidgetEvent::Closed.reported_status(), None);
    }

    #[test]
    fn failed_reconciliation_is_returned_but_outcome_stands() {
        let api = FakePaymentApi { fail_update: true, ..FakePaymentApi::default() };
        let widget = FakeWidget::default();
        let page = Page::new(booked());

        block_on(pay_now(&api, &widget, Some(&booked()), &page.dispatch, page.handler())).unwrap();
        widget.fire(WidgetEvent::Success(WidgetResult::default()));
        page.drain(&api);

        assert_eq!(api.updates.borrow().len(), 1);
        let state = page.state();
        assert_eq!(state.phase, CheckoutPhase::Terminal(PaymentOutcome::Paid));
        assert!(!state.can_pay());

        let update = StatusUpdateRequest {
            reference_number: "REF-5".to_string(),
            status: PaymentStatus::Paid,
        };
        assert!(block_on(reconcile(&api, update)).is_err());
    }

    #[test]
    fn session_failure_returns_to_idle_with_blocking_error() {
        let api = FakePaymentApi { fail_session: true, ..FakePaymentApi::default() };
        let widget = FakeWidget::default();
        let page = Page::new(booked());

        let result = block_on(pay_now(&api, &widget, Some(&booked()), &page.dispatch, page.handler()));
        assert!(matches!(result, Err(CheckoutError::Api(_))));
        assert!(widget.opened_with.borrow().is_empty());

        let state = page.state();
        assert_eq!(state.phase, CheckoutPhase::Idle);
        assert_eq!(state.blocking_error.as_deref(), Some("Server mengembalikan status 500"));
        assert!(state.can_pay());
    }

    #[test]
    fn unavailable_widget_returns_to_idle() {
        let api = FakePaymentApi::default();
        let widget = FakeWidget { unavailable: true, ..FakeWidget::default() };
        let page = Page::new(booked());

        let result = block_on(pay_now(&api, &widget, Some(&booked()), &page.dispatch, page.handler()));
        assert!(matches!(result, Err(CheckoutError::WidgetUnavailable)));

        let state = page.state();
        assert_eq!(state.phase, CheckoutPhase::Idle);
        assert_eq!(
            state.blocking_error.as_deref(),
            Some(CheckoutError::WidgetUnavailable.to_string().as_str())
        );
        assert!(state.can_pay());
    }

    #[test]
    fn stray_callbacks_outside_an_attempt_are_ignored() {
        let state = PaymentCheckout::new(booked())
            .apply(CheckoutAction::Widget(WidgetEvent::Success(WidgetResult::default())));
        assert_eq!(state.phase, CheckoutPhase::Idle);
        assert_eq!(state.banner, None);
    }

    #[test]
    fn no_payment_while_busy_or_for_settled_appointments() {
        let busy = PaymentCheckout::new(booked()).apply(CheckoutAction::PayRequested);
        assert!(busy.is_busy());
        assert!(!busy.can_pay());

        let confirmed = PaymentCheckout::new(appointment(1, AppointmentStatus::Confirmed));
        assert!(!confirmed.can_pay());
        assert_eq!(confirmed.apply(CheckoutAction::PayRequested).phase, CheckoutPhase::Idle);
    }

    #[test]
    fn price_comes_from_the_consultant_snapshot() {
        let mut booking = booked();
        booking.service_type = crate::models::ServiceType::IndividualJasa;
        assert_eq!(PaymentCheckout::new(booking).price(), Some(150_000));
    }

    #[test]
    fn widget_result_parses_partial_payloads() {
        let result: WidgetResult = serde_json::from_value(serde_json::json!({
            "order_id": "REF-1",
            "transaction_status": "pending",
            "fraud_status": "accept"
        }))
        .unwrap();
        assert_eq!(result.order_id.as_deref(), Some("REF-1"));
        assert_eq!(result.payment_type, None);
    }
}
