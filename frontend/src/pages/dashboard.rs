use std::cmp::Reverse;

use chrono::NaiveDate;
use futures::future::join;
use log::{info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_hooks::use_is_mounted;
use yew_router::prelude::*;

use crate::api::{ApiClient, BookingApi};
use crate::booking::draft::business_today;
use crate::components::appointment_card::AppointmentCard;
use crate::error::ApiResult;
use crate::models::{Appointment, AppointmentStatus, Consultant};
use crate::payment::checkout::BookingNavState;
use crate::Route;

/// Upcoming appointments first (soonest on top), then past ones (most recent
/// on top). Cancelled appointments always sink to the bottom.
pub fn sort_for_dashboard(appointments: &mut [Appointment], today: NaiveDate) {
    appointments.sort_by_key(|a| {
        let cancelled = a.status == AppointmentStatus::Cancelled;
        let past = a.date < today;
        let upcoming_key = if past { None } else { Some((a.date, a.time.clone())) };
        let past_key = if past { Some(Reverse((a.date, a.time.clone()))) } else { None };
        (cancelled, past, upcoming_key, past_key)
    });
}

pub fn upcoming_count(appointments: &[Appointment], today: NaiveDate) -> usize {
    appointments
        .iter()
        .filter(|a| a.date >= today && a.status != AppointmentStatus::Cancelled)
        .count()
}

#[derive(Clone, Debug, PartialEq)]
enum Load {
    Loading,
    Ready { consultants: Option<usize>, appointments: Vec<Appointment> },
    Failed(String),
}

/// The two fetches degrade separately: a missing consultant count never
/// hides the user's own appointments.
fn settle_load(
    consultants: ApiResult<Vec<Consultant>>,
    appointments: ApiResult<Vec<Appointment>>,
    today: NaiveDate,
) -> Load {
    let consultants = match consultants {
        Ok(list) => Some(list.len()),
        Err(e) => {
            warn!("Consultant count unavailable: {}", e);
            None
        }
    };
    match appointments {
        Ok(mut appointments) => {
            info!("Dashboard loaded {} appointments", appointments.len());
            sort_for_dashboard(&mut appointments, today);
            Load::Ready { consultants, appointments }
        }
        Err(e) => {
            warn!("Dashboard appointments failed: {}", e);
            Load::Failed(e.to_string())
        }
    }
}

#[function_component]
pub fn Dashboard() -> Html {
    let load = use_state(|| Load::Loading);
    let refresh = use_state(|| 0u32);
    let navigator = use_navigator();
    let is_mounted = use_is_mounted();

    {
        let load = load.clone();
        let is_mounted = is_mounted.clone();
        use_effect_with_deps(
            move |_| {
                load.set(Load::Loading);
                spawn_local(async move {
                    let client = ApiClient::new();
                    let (consultants, appointments) =
                        join(client.list_consultants(), client.list_appointments()).await;
                    if !is_mounted() {
                        return;
                    }
                    load.set(settle_load(consultants, appointments, business_today()));
                });
                || ()
            },
            *refresh,
        );
    }

    let on_refresh = {
        let refresh = refresh.clone();
        Callback::from(move |_: MouseEvent| refresh.set(refresh.wrapping_add(1)))
    };

    let on_pay = Callback::from(move |appointment: Appointment| {
        if let Some(navigator) = navigator.as_ref() {
            navigator.push_with_state(
                &Route::PaymentConfirmation,
                BookingNavState { booking_data: appointment },
            );
        }
    });

    let body = match &*load {
        Load::Loading => html! {
            <div class="dashboard-loading"><span class="loading-spinner"></span>{" Memuat data..."}</div>
        },
        Load::Failed(message) => html! {
            <div class="error-message">{ message }</div>
        },
        Load::Ready { consultants, appointments } => {
            let today = business_today();
            html! {
                <>
                    <div class="dashboard-stats">
                        <div class="stat-card">
                            <span class="stat-value">{ appointments.len() }</span>
                            <span class="stat-label">{"Total Konsultasi"}</span>
                        </div>
                        <div class="stat-card">
                            <span class="stat-value">{ upcoming_count(appointments, today) }</span>
                            <span class="stat-label">{"Akan Datang"}</span>
                        </div>
                        <div class="stat-card">
                            <span class="stat-value">{ consultants.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()) }</span>
                            <span class="stat-label">{"Konsultan Tersedia"}</span>
                        </div>
                    </div>
                    if appointments.is_empty() {
                        <div class="empty-appointments">
                            <p>{"Anda belum memiliki jadwal konsultasi."}</p>
                            <Link<Route> to={Route::Booking} classes="cta-button">{"Book Konsultasi Sekarang"}</Link<Route>>
                        </div>
                    } else {
                        <div class="appointment-grid">
                            { for appointments.iter().map(|a| html! {
                                <AppointmentCard key={a.id} appointment={a.clone()} on_pay={on_pay.clone()} />
                            }) }
                        </div>
                    }
                </>
            }
        }
    };

    html! {
        <div class="dashboard-container">
            <div class="dashboard-header">
                <div>
                    <h1>{"Dashboard"}</h1>
                    <p>{"Pantau jadwal dan status konsultasi pajak Anda"}</p>
                </div>
                <div class="dashboard-actions">
                    <button class="refresh-button" onclick={on_refresh} disabled={*load == Load::Loading}>
                        {"Muat Ulang"}
                    </button>
                    <Link<Route> to={Route::Booking} classes="cta-button">{"+ Booking Baru"}</Link<Route>>
                </div>
            </div>
            { body }
        </div>
    }
}
