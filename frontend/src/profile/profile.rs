use log::{info, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;
use yew_hooks::use_is_mounted;
use yew_router::prelude::*;

use crate::api::ApiClient;
use crate::components::appointment_card::AppointmentCard;
use crate::models::{Appointment, AppointmentStatus, UpdateUserRequest, UserInfo};
use crate::payment::checkout::BookingNavState;
use crate::Route;

#[derive(Clone, Copy, PartialEq)]
enum AppointmentTab {
    All,
    Status(AppointmentStatus),
}

impl AppointmentTab {
    fn label(&self) -> &'static str {
        match self {
            AppointmentTab::All => "Semua",
            AppointmentTab::Status(status) => status.label(),
        }
    }

    fn matches(&self, appointment: &Appointment) -> bool {
        match self {
            AppointmentTab::All => true,
            AppointmentTab::Status(status) => appointment.status == *status,
        }
    }
}

/// Edit buffer for the profile form. Empty optional fields are sent as null.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl ProfileDraft {
    pub fn from_user(user: &UserInfo) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
        }
    }

    pub fn to_request(&self) -> Result<UpdateUserRequest, &'static str> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() {
            return Err("Nama wajib diisi");
        }
        if !email.contains('@') {
            return Err("Alamat email tidak valid");
        }
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        Ok(UpdateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            phone: optional(&self.phone),
            address: optional(&self.address),
        })
    }
}

#[function_component]
pub fn Profile() -> Html {
    let user = use_state(|| None::<UserInfo>);
    let appointments = use_state(Vec::<Appointment>::new);
    let draft = use_state(|| None::<ProfileDraft>);
    let error = use_state(|| None::<String>);
    let success = use_state(|| None::<String>);
    let saving = use_state(|| false);
    let active_tab = use_state(|| AppointmentTab::All);
    let navigator = use_navigator();
    let is_mounted = use_is_mounted();

    // Fetch user and appointments
    {
        let user = user.clone();
        let appointments = appointments.clone();
        let error = error.clone();
        let is_mounted = is_mounted.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    let client = ApiClient::new();
                    let fetched_user = client.get_user().await;
                    let fetched_appointments = client.list_appointments().await;
                    if !is_mounted() {
                        return;
                    }
                    match fetched_user {
                        Ok(data) => user.set(Some(data)),
                        Err(e) => {
                            warn!("Failed to load profile: {}", e);
                            error.set(Some(e.to_string()));
                        }
                    }
                    match fetched_appointments {
                        Ok(list) => appointments.set(list),
                        Err(e) => warn!("Failed to load appointments for profile: {}", e),
                    }
                });
                || ()
            },
            (),
        );
    }

    let start_edit = {
        let user = user.clone();
        let draft = draft.clone();
        let success = success.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(current) = (*user).as_ref() {
                draft.set(Some(ProfileDraft::from_user(current)));
                success.set(None);
            }
        })
    };

    let cancel_edit = {
        let draft = draft.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            draft.set(None);
            error.set(None);
        })
    };

    let save = {
        let user = user.clone();
        let draft = draft.clone();
        let error = error.clone();
        let success = success.clone();
        let saving = saving.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(current) = (*draft).clone() else { return };
            let request = match current.to_request() {
                Ok(request) => request,
                Err(message) => {
                    error.set(Some(message.to_string()));
                    return;
                }
            };
            saving.set(true);
            error.set(None);

            let user = user.clone();
            let draft = draft.clone();
            let error = error.clone();
            let success = success.clone();
            let saving = saving.clone();
            spawn_local(async move {
                match ApiClient::new().update_user(&request).await {
                    Ok(updated) => {
                        info!("Profile {} updated", updated.id);
                        user.set(Some(updated));
                        draft.set(None);
                        success.set(Some("Profil berhasil diperbarui".to_string()));
                    }
                    // The edit buffer stays so nothing typed is lost.
                    Err(e) => error.set(Some(e.to_string())),
                }
                saving.set(false);
            });
        })
    };

    let field = |update: fn(&mut ProfileDraft, String)| {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Some(mut next) = (*draft).clone() {
                update(&mut next, input.value());
                draft.set(Some(next));
            }
        })
    };

    let on_address = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            if let Some(mut next) = (*draft).clone() {
                next.address = input.value();
                draft.set(Some(next));
            }
        })
    };

    let on_pay = Callback::from(move |appointment: Appointment| {
        if let Some(navigator) = navigator.as_ref() {
            navigator.push_with_state(
                &Route::PaymentConfirmation,
                BookingNavState { booking_data: appointment },
            );
        }
    });

    let tabs = std::iter::once(AppointmentTab::All)
        .chain(AppointmentStatus::ALL.into_iter().map(AppointmentTab::Status));

    let details = match ((*user).as_ref(), (*draft).as_ref()) {
        (None, _) => html! { <div class="loading-profile">{"Memuat profil..."}</div> },
        (Some(_), Some(editing)) => html! {
            <div class="profile-form">
                <label>{"Nama"}</label>
                <input type="text" value={editing.name.clone()} oninput={field(|d, v| d.name = v)} />
                <label>{"Email"}</label>
                <input type="email" value={editing.email.clone()} oninput={field(|d, v| d.email = v)} />
                <label>{"Telepon"}</label>
                <input type="tel" value={editing.phone.clone()} oninput={field(|d, v| d.phone = v)} />
                <label>{"Alamat"}</label>
                <textarea value={editing.address.clone()} oninput={on_address} />
                <div class="profile-actions">
                    <button class="save-button" onclick={save} disabled={*saving}>
                        { if *saving { "Menyimpan..." } else { "Simpan" } }
                    </button>
                    <button class="cancel-button" onclick={cancel_edit} disabled={*saving}>{"Batal"}</button>
                </div>
            </div>
        },
        (Some(info), None) => html! {
            <div class="profile-details">
                <div class="detail-row"><span>{"Nama:"}</span><span>{ &info.name }</span></div>
                <div class="detail-row"><span>{"Email:"}</span><span>{ &info.email }</span></div>
                <div class="detail-row"><span>{"Telepon:"}</span><span>{ info.phone.clone().unwrap_or_else(|| "-".to_string()) }</span></div>
                <div class="detail-row"><span>{"Alamat:"}</span><span>{ info.address.clone().unwrap_or_else(|| "-".to_string()) }</span></div>
                if let Some(created_at) = info.created_at.as_ref() {
                    <div class="detail-row"><span>{"Bergabung:"}</span><span>{ created_at.chars().take(10).collect::<String>() }</span></div>
                }
                <button class="edit-button" onclick={start_edit}>{"Edit Profil"}</button>
            </div>
        },
    };

    html! {
        <div class="profile-container">
            <div class="profile-panel">
                <div class="profile-header">
                    <h1 class="profile-title">{"Profil"}</h1>
                    <Link<Route> to={Route::Dashboard} classes="back-link">{"Kembali ke Dashboard"}</Link<Route>>
                </div>
                if let Some(message) = (*error).as_ref() {
                    <div class="message error-message">{ message }</div>
                } else if let Some(message) = (*success).as_ref() {
                    <div class="message success-message">{ message }</div>
                }
                { details }
            </div>

            <div class="profile-panel">
                <h2>{"Riwayat Konsultasi"}</h2>
                <div class="profile-tabs">
                    { for tabs.map(|tab| {
                        let count = appointments.iter().filter(|a| tab.matches(a)).count();
                        let active_tab = active_tab.clone();
                        html! {
                            <button
                                class={classes!("tab-button", (*active_tab == tab).then(|| "active"))}
                                onclick={Callback::from(move |_| active_tab.set(tab))}
                            >
                                { format!("{} ({})", tab.label(), count) }
                            </button>
                        }
                    }) }
                </div>
                <div class="appointment-grid">
                    { for appointments.iter().filter(|a| active_tab.matches(a)).map(|a| html! {
                        <AppointmentCard key={a.id} appointment={a.clone()} on_pay={on_pay.clone()} />
                    }) }
                </div>
            </div>
        </div>
    }
}
