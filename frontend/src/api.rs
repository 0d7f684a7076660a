use std::future::Future;
use std::pin::pin;

use futures::future::{select, Either};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlDocument, RequestCredentials};

use crate::auth::session;
use crate::config;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AdminStatusUpdate, Appointment, Consultant, CreateAppointmentRequest, CreateSessionRequest,
    ErrorBody, PaymentSession, Payload, RegisterRequest, SnapTokenResponse, StatusUpdateRequest,
    UpdateUserRequest, UserInfo,
};

/// Backend calls made by the booking wizard.
pub trait BookingApi {
    async fn list_consultants(&self) -> ApiResult<Vec<Consultant>>;
    async fn create_appointment(&self, request: &CreateAppointmentRequest) -> ApiResult<Appointment>;
}

/// Backend calls made during checkout.
pub trait PaymentApi {
    async fn create_payment_session(&self, appointment_id: i64) -> ApiResult<PaymentSession>;
    async fn update_payment_status(&self, update: &StatusUpdateRequest) -> ApiResult<()>;
}

/// Resolves with the future's output, or `ApiError::Timeout` if `deadline`
/// fires first. The losing future is dropped, which cancels it.
pub async fn race_deadline<F, D>(future: F, deadline: D) -> ApiResult<F::Output>
where
    F: Future,
    D: Future<Output = ()>,
{
    let future = pin!(future);
    let deadline = pin!(deadline);
    match select(future, deadline).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(ApiError::Timeout),
    }
}

pub async fn with_deadline<F: Future>(future: F, timeout_ms: u32) -> ApiResult<F::Output> {
    race_deadline(future, TimeoutFuture::new(timeout_ms)).await
}

/// Reads one cookie out of a `document.cookie` string, percent-decoded.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}

fn auth_token() -> Option<String> {
    session::stored(session::TOKEN_KEY)
}

fn xsrf_token() -> Option<String> {
    let document: HtmlDocument = window()?.document()?.dyn_into().ok()?;
    let cookies = document.cookie().ok()?;
    cookie_value(&cookies, "XSRF-TOKEN")
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    base_url: String,
    timeout_ms: u32,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            base_url: config::get_backend_url().to_string(),
            timeout_ms: config::REQUEST_TIMEOUT_MS,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Session cookie, bearer token and CSRF header go on every request.
    fn prepare(&self, request: Request) -> Request {
        let mut request = request
            .credentials(RequestCredentials::Include)
            .header("Accept", "application/json");
        if let Some(token) = auth_token() {
            request = request.header("Authorization", &format!("Bearer {}", token));
        }
        if let Some(xsrf) = xsrf_token() {
            request = request.header("X-XSRF-TOKEN", &xsrf);
        }
        request
    }

    fn with_body<B: Serialize>(&self, request: Request, body: &B) -> ApiResult<Request> {
        self.prepare(request)
            .json(body)
            .map_err(|e| ApiError::Decode(format!("failed to encode request: {}", e)))
    }

    async fn send(request: Request) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        match response.status() {
            401 => Err(ApiError::Unauthorized),
            status if !response.ok() => {
                let message = response
                    .json::<ErrorBody>()
                    .await
                    .ok()
                    .and_then(ErrorBody::into_message);
                warn!("Backend answered {} for {}", status, response.url());
                Err(ApiError::server(status, message))
            }
            _ => Ok(response),
        }
    }

    async fn exchange<T: DeserializeOwned>(request: Request) -> ApiResult<T> {
        let response = Self::send(request).await?;
        response
            .json::<Payload<T>>()
            .await
            .map(Payload::into_inner)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: Request) -> ApiResult<T> {
        with_deadline(Self::exchange(request), self.timeout_ms)
            .await
            .and_then(|result| result)
    }

    async fn fire(&self, request: Request) -> ApiResult<()> {
        with_deadline(Self::send(request), self.timeout_ms)
            .await
            .and_then(|result| result)
            .map(|_| ())
    }

    pub async fn list_appointments(&self) -> ApiResult<Vec<Appointment>> {
        let request = self.prepare(Request::get(&self.url("/api/appointments")));
        self.fetch(request).await
    }

    pub async fn get_user(&self) -> ApiResult<UserInfo> {
        let request = self.prepare(Request::get(&self.url("/api/user")));
        self.fetch(request).await
    }

    pub async fn update_user(&self, update: &UpdateUserRequest) -> ApiResult<UserInfo> {
        let request = self.with_body(Request::put(&self.url("/api/user")), update)?;
        self.fetch(request).await
    }

    pub async fn register(&self, registration: &RegisterRequest) -> ApiResult<()> {
        // Sanctum hands out the XSRF-TOKEN cookie here before any stateful POST.
        let csrf = self.prepare(Request::get(&self.url("/sanctum/csrf-cookie")));
        self.fire(csrf).await?;
        let request = self.with_body(Request::post(&self.url("/register")), registration)?;
        self.fire(request).await?;
        info!("Registered {}", registration.email);
        Ok(())
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let request = self.prepare(Request::post(&self.url("/api/logout")));
        self.fire(request).await
    }

    pub async fn list_all_appointments(&self) -> ApiResult<Vec<Appointment>> {
        let request = self.prepare(Request::get(&self.url("/api/admin/appointments")));
        self.fetch(request).await
    }

    pub async fn update_appointment_status(
        &self,
        appointment_id: i64,
        update: &AdminStatusUpdate,
    ) -> ApiResult<Appointment> {
        let path = format!("/api/admin/appointments/{}/status", appointment_id);
        let request = self.with_body(Request::put(&self.url(&path)), update)?;
        self.fetch(request).await
    }
}

impl BookingApi for ApiClient {
    async fn list_consultants(&self) -> ApiResult<Vec<Consultant>> {
        let request = self.prepare(Request::get(&self.url("/api/consultants")));
        self.fetch(request).await
    }

    async fn create_appointment(&self, request: &CreateAppointmentRequest) -> ApiResult<Appointment> {
        let request = self.with_body(Request::post(&self.url("/api/appointments")), request)?;
        self.fetch(request).await
    }
}

impl PaymentApi for ApiClient {
    async fn create_payment_session(&self, appointment_id: i64) -> ApiResult<PaymentSession> {
        let request = self.with_body(
            Request::post(&self.url("/api/payments/create-snap-token")),
            &CreateSessionRequest { appointment_id },
        )?;
        let response: SnapTokenResponse = self.fetch(request).await?;
        session_from_response(response)
    }

    async fn update_payment_status(&self, update: &StatusUpdateRequest) -> ApiResult<()> {
        let request = self.with_body(Request::post(&self.url("/api/payments/update-status")), update)?;
        self.fire(request).await
    }
}

/// Rejects sessions the checkout widget could not use.
pub fn session_from_response(response: SnapTokenResponse) -> ApiResult<PaymentSession> {
    if response.snap_token.trim().is_empty() {
        return Err(ApiError::Decode("payment session without token".to_string()));
    }
    if response.payment.reference_number.trim().is_empty() {
        return Err(ApiError::Decode("payment session without reference number".to_string()));
    }
    Ok(PaymentSession {
        reference_number: response.payment.reference_number,
        token: response.snap_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionPayment;
    use futures::executor::block_on;
    use futures::future::{pending, ready};

    #[test]
    fn finished_call_beats_deadline() {
        let result = block_on(race_deadline(ready(7), pending::<()>()));
        assert_eq!(result, Ok(7));
    }

    #[test]
    fn hung_call_times_out() {
        let result = block_on(race_deadline(pending::<u8>(), ready(())));
        assert_eq!(result, Err(ApiError::Timeout));
    }

    #[test]
    fn xsrf_cookie_is_found_and_decoded() {
        let cookies = "laravel_session=abc; XSRF-TOKEN=eyJpdiI6%3D%3D; theme=dark";
        assert_eq!(cookie_value(cookies, "XSRF-TOKEN").as_deref(), Some("eyJpdiI6=="));
        assert_eq!(cookie_value(cookies, "missing"), None);
        assert_eq!(cookie_value("", "XSRF-TOKEN"), None);
    }

    #[test]
    fn session_requires_token_and_reference() {
        let ok = session_from_response(SnapTokenResponse {
            snap_token: "tok-123".to_string(),
            payment: SessionPayment { reference_number: "REF-9".to_string() },
        });
        assert_eq!(
            ok,
            Ok(PaymentSession { reference_number: "REF-9".to_string(), token: "tok-123".to_string() })
        );

        let missing_token = session_from_response(SnapTokenResponse {
            snap_token: " ".to_string(),
            payment: SessionPayment { reference_number: "REF-9".to_string() },
        });
        assert!(matches!(missing_token, Err(ApiError::Decode(_))));
    }
}
