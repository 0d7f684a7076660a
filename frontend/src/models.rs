use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Pricing and workflow tier of a consultation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    #[default]
    IndividualService,
    IndividualJasa,
    CompanyService,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::IndividualService,
        ServiceType::IndividualJasa,
        ServiceType::CompanyService,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::IndividualService => "Layanan Individu",
            ServiceType::IndividualJasa => "Jasa Individu",
            ServiceType::CompanyService => "Layanan Perusahaan",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::IndividualService => "individual-service",
            ServiceType::IndividualJasa => "individual-jasa",
            ServiceType::CompanyService => "company-service",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Only the individual-service tier carries a sub-service choice.
    pub fn has_sub_service(&self) -> bool {
        matches!(self, ServiceType::IndividualService)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndividualServiceType {
    #[default]
    SptReporting,
    IncomeTaxCalculation,
}

impl IndividualServiceType {
    pub const ALL: [IndividualServiceType; 2] = [
        IndividualServiceType::SptReporting,
        IndividualServiceType::IncomeTaxCalculation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IndividualServiceType::SptReporting => "Pelaporan SPT",
            IndividualServiceType::IncomeTaxCalculation => {
                "Perhitungan dan Pelaporan Pajak Penghasilan"
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndividualServiceType::SptReporting => "spt-reporting",
            IndividualServiceType::IncomeTaxCalculation => "income-tax-calculation",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationMethod {
    #[default]
    Online,
    Offline,
}

impl ConsultationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            ConsultationMethod::Online => "Online Meeting",
            ConsultationMethod::Offline => "Tatap Muka",
        }
    }
}

/// Lifecycle status of an appointment. Only the backend moves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[serde(alias = "pending")]
    PendingConfirmation,
    PendingPayment,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::PendingConfirmation,
        AppointmentStatus::PendingPayment,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::PendingConfirmation => "Menunggu Konfirmasi",
            AppointmentStatus::PendingPayment => "Menunggu Pembayaran",
            AppointmentStatus::Confirmed => "Terkonfirmasi",
            AppointmentStatus::Cancelled => "Dibatalkan",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            AppointmentStatus::PendingConfirmation => "badge badge-waiting",
            AppointmentStatus::PendingPayment => "badge badge-payment",
            AppointmentStatus::Confirmed => "badge badge-confirmed",
            AppointmentStatus::Cancelled => "badge badge-cancelled",
        }
    }
}

/// Payment outcome reported back to the backend after a checkout attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Consultant {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default, alias = "experience_years")]
    pub experience: u32,
    #[serde(default, deserialize_with = "de_decimal")]
    pub rating: f64,
    #[serde(deserialize_with = "de_amount")]
    pub price_individual_service: u64,
    #[serde(deserialize_with = "de_amount")]
    pub price_individual_jasa: u64,
    #[serde(deserialize_with = "de_amount")]
    pub price_company_service: u64,
}

impl Consultant {
    /// Price of this consultant for the given tier, in rupiah.
    pub fn price_for(&self, service_type: ServiceType) -> u64 {
        match service_type {
            ServiceType::IndividualService => self.price_individual_service,
            ServiceType::IndividualJasa => self.price_individual_jasa,
            ServiceType::CompanyService => self.price_company_service,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PaymentSummary {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
}

/// Server-owned booking record.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Appointment {
    pub id: i64,
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    #[serde(deserialize_with = "de_time")]
    pub time: String,
    pub method: ConsultationMethod,
    pub service_type: ServiceType,
    #[serde(default)]
    pub individual_service_type: Option<IndividualServiceType>,
    pub status: AppointmentStatus,
    #[serde(default, alias = "meeting_link")]
    pub gmeet_link: Option<String>,
    #[serde(default)]
    pub consultant: Option<Consultant>,
    #[serde(default)]
    pub nama: String,
    #[serde(default)]
    pub nik: String,
    #[serde(default)]
    pub npwp: String,
    #[serde(default)]
    pub efin: Option<String>,
    #[serde(default)]
    pub payment: Option<PaymentSummary>,
}

impl Appointment {
    /// Price recomputed from the embedded consultant snapshot.
    pub fn price(&self) -> Option<u64> {
        self.consultant
            .as_ref()
            .map(|c| c.price_for(self.service_type))
    }

    pub fn is_paid(&self) -> bool {
        self.payment
            .as_ref()
            .and_then(|p| p.status.as_deref())
            .map_or(false, |status| status.eq_ignore_ascii_case("paid"))
    }

    /// Meeting link, shown only for paid, confirmed online consultations.
    pub fn meeting_link(&self) -> Option<&str> {
        if self.status != AppointmentStatus::Confirmed
            || self.method != ConsultationMethod::Online
            || !self.is_paid()
        {
            return None;
        }
        self.gmeet_link.as_deref().filter(|link| !link.trim().is_empty())
    }

    pub fn is_payable(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::PendingConfirmation | AppointmentStatus::PendingPayment
        )
    }

    pub fn consultant_name(&self) -> &str {
        self.consultant.as_ref().map(|c| c.name.as_str()).unwrap_or("-")
    }

    pub fn sub_service(&self) -> Option<IndividualServiceType> {
        if self.service_type.has_sub_service() {
            self.individual_service_type
        } else {
            None
        }
    }
}

/// Body of `POST /api/appointments`.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CreateAppointmentRequest {
    pub consultant_id: i64,
    pub date: String,
    pub time: String,
    pub method: ConsultationMethod,
    pub service_type: ServiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual_service_type: Option<IndividualServiceType>,
    pub nama: String,
    pub nik: String,
    pub npwp: String,
    pub efin: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CreateSessionRequest {
    pub appointment_id: i64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SnapTokenResponse {
    #[serde(rename = "snapToken")]
    pub snap_token: String,
    pub payment: SessionPayment,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SessionPayment {
    pub reference_number: String,
}

/// One checkout attempt; never reused across retries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentSession {
    pub reference_number: String,
    pub token: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct StatusUpdateRequest {
    pub reference_number: String,
    pub status: PaymentStatus,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AdminStatusUpdate {
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmeet_link: Option<String>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

/// Backend responses come either bare or wrapped in `{ "data": ... }`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    pub fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } => data,
            Payload::Bare(value) => value,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Unsigned(u64),
    Float(f64),
    Text(String),
}

fn de_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Unsigned(n) => return Ok(n),
        NumberOrText::Float(f) => f,
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid amount: {}", s)))?,
    };
    if value < 0.0 || value.fract() != 0.0 {
        return Err(D::Error::custom(format!("amount must be a whole rupiah value: {}", value)));
    }
    Ok(value as u64)
}

fn de_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Unsigned(n) => Ok(n as f64),
        NumberOrText::Float(f) => Ok(f),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid decimal: {}", s))),
    }
}

// Accepts "2024-01-15" as well as full timestamps such as "2024-01-15T00:00:00.000000Z".
fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = String::deserialize(deserializer)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| D::Error::custom(format!("invalid date: {}", raw)))
}

// "10:00:00" -> "10:00"
fn de_time<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.get(..5).unwrap_or(&raw).to_string())
}
