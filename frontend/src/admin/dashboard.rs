use std::collections::HashMap;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_hooks::use_is_mounted;
use yew_router::prelude::*;

use crate::api::ApiClient;
use crate::format::short_date;
use crate::models::{AdminStatusUpdate, Appointment, AppointmentStatus, ConsultationMethod};
use crate::Route;

pub fn status_counts(appointments: &[Appointment]) -> HashMap<AppointmentStatus, usize> {
    let mut counts = HashMap::new();
    for appointment in appointments {
        *counts.entry(appointment.status).or_insert(0) += 1;
    }
    counts
}

/// Swaps in the record returned by the backend. Unknown ids are ignored.
pub fn replace_appointment(appointments: &mut [Appointment], updated: Appointment) -> bool {
    match appointments.iter_mut().find(|a| a.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

/// Builds the status change body. A meeting link only travels with a
/// confirmation of an online appointment.
pub fn admin_update(
    appointment: &Appointment,
    status: AppointmentStatus,
    link: &str,
) -> AdminStatusUpdate {
    let link = link.trim();
    let gmeet_link = (status == AppointmentStatus::Confirmed
        && appointment.method == ConsultationMethod::Online
        && !link.is_empty())
    .then(|| link.to_string());
    AdminStatusUpdate { status, gmeet_link }
}

/// The admin table. Updates land on whatever the list holds when the
/// response arrives, so overlapping status changes never undo each other.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdminAppointments {
    pub list: Vec<Appointment>,
}

pub enum AdminAction {
    Loaded(Vec<Appointment>),
    Replace(Appointment),
}

impl Reducible for AdminAppointments {
    type Action = AdminAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            AdminAction::Loaded(list) => Rc::new(Self { list }),
            AdminAction::Replace(updated) => {
                let mut next = (*self).clone();
                if !replace_appointment(&mut next.list, updated) {
                    warn!("Status change for an appointment no longer listed");
                    return self;
                }
                Rc::new(next)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct CancelModalState {
    appointment_id: i64,
    applicant: String,
}

#[function_component]
pub fn AdminDashboard() -> Html {
    let appointments = use_reducer(AdminAppointments::default);
    let error = use_state(|| None::<String>);
    let links = use_state(HashMap::<i64, String>::new);
    let cancel_modal = use_state(|| None::<CancelModalState>);
    let is_mounted = use_is_mounted();

    {
        let dispatcher = appointments.dispatcher();
        let error = error.clone();
        let is_mounted = is_mounted.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    let result = ApiClient::new().list_all_appointments().await;
                    if !is_mounted() {
                        return;
                    }
                    match result {
                        Ok(list) => {
                            info!("Admin view loaded {} appointments", list.len());
                            dispatcher.dispatch(AdminAction::Loaded(list));
                        }
                        Err(e) => {
                            warn!("Admin appointment list failed: {}", e);
                            error.set(Some(e.to_string()));
                        }
                    }
                });
                || ()
            },
            (),
        );
    }

    let change_status = {
        let appointments = appointments.clone();
        let error = error.clone();
        let links = links.clone();
        Callback::from(move |(id, status): (i64, AppointmentStatus)| {
            let Some(current) = appointments.list.iter().find(|a| a.id == id).cloned() else {
                return;
            };
            let link = links.get(&id).cloned().unwrap_or_default();
            let update = admin_update(&current, status, &link);

            let dispatcher = appointments.dispatcher();
            let error = error.clone();
            spawn_local(async move {
                match ApiClient::new().update_appointment_status(id, &update).await {
                    Ok(updated) => {
                        info!("Appointment {} moved to {:?}", id, updated.status);
                        dispatcher.dispatch(AdminAction::Replace(updated));
                        error.set(None);
                    }
                    Err(e) => {
                        warn!("Status change for appointment {} failed: {}", id, e);
                        error.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    let counts = status_counts(&appointments.list);

    let modal = (*cancel_modal).clone().map(|state| {
        let close = {
            let cancel_modal = cancel_modal.clone();
            Callback::from(move |_: MouseEvent| cancel_modal.set(None))
        };
        let confirm = {
            let cancel_modal = cancel_modal.clone();
            let change_status = change_status.clone();
            let id = state.appointment_id;
            Callback::from(move |_: MouseEvent| {
                change_status.emit((id, AppointmentStatus::Cancelled));
                cancel_modal.set(None);
            })
        };
        html! {
            <div class="modal-overlay">
                <div class="modal-content">
                    <h3>{"Batalkan Konsultasi"}</h3>
                    <p>{ format!("Batalkan jadwal milik {}?", state.applicant) }</p>
                    <div class="modal-buttons">
                        <button class="cancel-button" onclick={close}>{"Kembali"}</button>
                        <button class="delete-button" onclick={confirm}>{"Batalkan"}</button>
                    </div>
                </div>
            </div>
        }
    });

    html! {
        <div class="dashboard-container">
            <div class="dashboard-panel">
                <div class="panel-header">
                    <h1 class="panel-title">{"Admin Dashboard"}</h1>
                    <Link<Route> to={Route::Dashboard} classes="back-link">{"Kembali"}</Link<Route>>
                </div>

                <div class="dashboard-stats">
                    { for AppointmentStatus::ALL.iter().map(|status| html! {
                        <div class="stat-card">
                            <span class="stat-value">{ counts.get(status).copied().unwrap_or(0) }</span>
                            <span class="stat-label">{ status.label() }</span>
                        </div>
                    }) }
                </div>

                if let Some(message) = (*error).as_ref() {
                    <div class="error-message">{ message }</div>
                }

                <table class="appointments-table">
                    <thead>
                        <tr>
                            <th>{"Pemohon"}</th>
                            <th>{"Jadwal"}</th>
                            <th>{"Layanan"}</th>
                            <th>{"Metode"}</th>
                            <th>{"Status"}</th>
                            <th>{"Aksi"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for appointments.list.iter().map(|appointment| {
                            let id = appointment.id;
                            let action = |status: AppointmentStatus| {
                                let change_status = change_status.clone();
                                Callback::from(move |_: MouseEvent| change_status.emit((id, status)))
                            };
                            let on_link = {
                                let links = links.clone();
                                Callback::from(move |e: InputEvent| {
                                    let input: HtmlInputElement = e.target_unchecked_into();
                                    let mut next = (*links).clone();
                                    next.insert(id, input.value());
                                    links.set(next);
                                })
                            };
                            let open_cancel = {
                                let cancel_modal = cancel_modal.clone();
                                let applicant = appointment.nama.clone();
                                Callback::from(move |_: MouseEvent| {
                                    cancel_modal.set(Some(CancelModalState { appointment_id: id, applicant: applicant.clone() }))
                                })
                            };
                            let open = appointment.status != AppointmentStatus::Cancelled;
                            html! {
                                <tr key={id}>
                                    <td>{ &appointment.nama }</td>
                                    <td>{ format!("{} {}", short_date(appointment.date), appointment.time) }</td>
                                    <td>{ appointment.service_type.label() }</td>
                                    <td>{ appointment.method.label() }</td>
                                    <td><span class={appointment.status.badge_class()}>{ appointment.status.label() }</span></td>
                                    <td class="admin-actions">
                                        if open && appointment.method == ConsultationMethod::Online {
                                            <input
                                                type="url"
                                                placeholder="Link meeting"
                                                value={links.get(&id).cloned().or_else(|| appointment.gmeet_link.clone()).unwrap_or_default()}
                                                oninput={on_link}
                                            />
                                        }
                                        if open && appointment.status != AppointmentStatus::Confirmed {
                                            <button onclick={action(AppointmentStatus::Confirmed)}>{"Konfirmasi"}</button>
                                        }
                                        if appointment.status == AppointmentStatus::PendingConfirmation {
                                            <button onclick={action(AppointmentStatus::PendingPayment)}>{"Minta Pembayaran"}</button>
                                        }
                                        if open {
                                            <button class="delete-button" onclick={open_cancel}>{"Batalkan"}</button>
                                        }
                                    </td>
                                </tr>
                            }
                        }) }
                    </tbody>
                </table>
            </div>
            { modal.unwrap_or_else(|| html! {}) }
        </div>
    }
}
