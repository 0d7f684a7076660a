use chrono::NaiveDate;
use log::info;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;
use yew_hooks::use_is_mounted;
use yew_router::prelude::*;

use crate::api::ApiClient;
use crate::booking::draft::{business_today, TIME_SLOTS};
use crate::booking::wizard::{
    load_consultants, submit_booking, BookingWizard, ConsultantsState, Submission, WizardAction,
};
use crate::components::notification::Notification;
use crate::format::{long_date, rupiah};
use crate::models::{ConsultationMethod, Consultant, IndividualServiceType, ServiceType};
use crate::payment::checkout::BookingNavState;
use crate::Route;

fn text_input(
    wizard: &UseReducerHandle<BookingWizard>,
    action: fn(String) -> WizardAction,
) -> Callback<InputEvent> {
    let dispatcher = wizard.dispatcher();
    Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        dispatcher.dispatch(action(input.value()));
    })
}

#[derive(Properties, PartialEq)]
struct ConsultantListProps {
    state: ConsultantsState,
    selected: Option<i64>,
    service_type: ServiceType,
    on_select: Callback<i64>,
}

#[function_component(ConsultantList)]
fn consultant_list(props: &ConsultantListProps) -> Html {
    match &props.state {
        ConsultantsState::Loading => html! {
            <div class="consultants-loading"><span class="loading-spinner"></span>{" Memuat konsultan..."}</div>
        },
        ConsultantsState::Failed(message) => html! {
            <div class="consultants-error error-message">
                {"Gagal memuat daftar konsultan: "}{message}
            </div>
        },
        ConsultantsState::Loaded(list) if list.is_empty() => html! {
            <div class="consultants-empty">{"Belum ada konsultan yang tersedia."}</div>
        },
        ConsultantsState::Loaded(list) => html! {
            <div class="consultant-list">
                { for list.iter().map(|consultant| consultant_option(consultant, props)) }
            </div>
        },
    }
}

fn consultant_option(consultant: &Consultant, props: &ConsultantListProps) -> Html {
    let id = consultant.id;
    let onclick = {
        let on_select = props.on_select.clone();
        Callback::from(move |_: MouseEvent| on_select.emit(id))
    };
    let selected = props.selected == Some(id);
    html! {
        <div class={classes!("consultant-option", selected.then(|| "selected"))} {onclick}>
            <div class="consultant-header">
                <h3>{ &consultant.name }</h3>
                <span class="consultant-price">{ rupiah(consultant.price_for(props.service_type)) }</span>
            </div>
            <p class="consultant-specialty">{ &consultant.specialty }</p>
            <div class="consultant-meta">
                <span>{ format!("Pengalaman: {} tahun", consultant.experience) }</span>
                <span>{ format!("Rating: ⭐ {:.1}", consultant.rating) }</span>
            </div>
        </div>
    }
}

#[function_component]
pub fn Booking() -> Html {
    let wizard = use_reducer(BookingWizard::default);
    let navigator = use_navigator();
    let is_mounted = use_is_mounted();
    let today = business_today();

    // Consultants are fetched once; a late answer after unmount is dropped.
    {
        let dispatcher = wizard.dispatcher();
        let is_mounted = is_mounted.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    let result = load_consultants(&ApiClient::new()).await;
                    if !is_mounted() {
                        return;
                    }
                    match result {
                        Ok(list) => dispatcher.dispatch(WizardAction::ConsultantsLoaded(list)),
                        Err(e) => dispatcher.dispatch(WizardAction::ConsultantsFailed(e.to_string())),
                    }
                });
                || ()
            },
            (),
        );
    }

    let on_submit = {
        let wizard = wizard.clone();
        let navigator = navigator.clone();
        let is_mounted = is_mounted.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            let request = match wizard.begin_submit(business_today()) {
                Submission::Busy => return,
                Submission::Rejected(reason) => {
                    wizard.dispatch(WizardAction::Reject(reason));
                    return;
                }
                Submission::Ready(request) => request,
            };
            wizard.dispatch(WizardAction::SubmitStarted);

            let dispatcher = wizard.dispatcher();
            let navigator = navigator.clone();
            let is_mounted = is_mounted.clone();
            spawn_local(async move {
                let result = submit_booking(&ApiClient::new(), &request).await;
                if !is_mounted() {
                    return;
                }
                match result {
                    Ok(appointment) => {
                        dispatcher.dispatch(WizardAction::SubmitSucceeded);
                        info!("Moving to payment for appointment {}", appointment.id);
                        if let Some(navigator) = navigator {
                            navigator.push_with_state(
                                &Route::PaymentConfirmation,
                                BookingNavState { booking_data: appointment },
                            );
                        }
                    }
                    Err(e) => dispatcher.dispatch(WizardAction::SubmitFailed(e.to_string())),
                }
            });
        })
    };

    let on_date = {
        let dispatcher = wizard.dispatcher();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(date) = NaiveDate::parse_from_str(&input.value(), "%Y-%m-%d") {
                dispatcher.dispatch(WizardAction::SelectDate { date, today: business_today() });
            }
        })
    };

    let on_service_type = {
        let dispatcher = wizard.dispatcher();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Some(service_type) = ServiceType::from_value(&select.value()) {
                dispatcher.dispatch(WizardAction::SetServiceType(service_type));
            }
        })
    };

    let on_sub_service = {
        let dispatcher = wizard.dispatcher();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Some(sub_service) = IndividualServiceType::from_value(&select.value()) {
                dispatcher.dispatch(WizardAction::SetSubService(sub_service));
            }
        })
    };

    let set_method = |method: ConsultationMethod| {
        let dispatcher = wizard.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(WizardAction::SetMethod(method)))
    };

    let on_select_consultant = {
        let dispatcher = wizard.dispatcher();
        Callback::from(move |id: i64| dispatcher.dispatch(WizardAction::SelectConsultant(id)))
    };

    let dismiss_notice = |id: u32| {
        let dispatcher = wizard.dispatcher();
        Callback::from(move |_| dispatcher.dispatch(WizardAction::DismissNotice(id)))
    };

    let draft = &wizard.draft;
    let submitting = wizard.is_submitting();

    html! {
        <div class="booking-container">
            <div class="booking-header">
                <h1>{"Book Konsultasi"}</h1>
                <p>{"Jadwalkan konsultasi dengan ahli pajak terpercaya"}</p>
            </div>

            if let Some(notice) = wizard.notice.clone() {
                <Notification
                    key={notice.id}
                    message={notice.message}
                    kind="warning"
                    on_dismiss={dismiss_notice(notice.id)}
                />
            }

            <div class="booking-grid">
                <div class="booking-form">
                    <section class="booking-card">
                        <h2>{"Jenis Layanan"}</h2>
                        <select onchange={on_service_type} disabled={submitting}>
                            { for ServiceType::ALL.iter().map(|t| html! {
                                <option value={t.as_str()} selected={*t == draft.service_type}>{ t.label() }</option>
                            }) }
                        </select>
                        if draft.service_type.has_sub_service() {
                            <label for="sub-service">{"Sub-layanan"}</label>
                            <select id="sub-service" onchange={on_sub_service} disabled={submitting}>
                                { for IndividualServiceType::ALL.iter().map(|s| html! {
                                    <option value={s.as_str()} selected={*s == draft.sub_service}>{ s.label() }</option>
                                }) }
                            </select>
                        }
                    </section>

                    <section class="booking-card">
                        <h2>{"Pilih Tanggal & Waktu"}</h2>
                        <input
                            type="date"
                            min={today.format("%Y-%m-%d").to_string()}
                            value={draft.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()}
                            onchange={on_date}
                            disabled={submitting}
                        />
                        <p class="hint">{"Kantor tutup setiap hari Minggu."}</p>
                        if draft.date.is_some() {
                            <div class="time-slots">
                                { for TIME_SLOTS.iter().map(|slot| {
                                    let dispatcher = wizard.dispatcher();
                                    let value = slot.to_string();
                                    let onclick = Callback::from(move |_: MouseEvent| {
                                        dispatcher.dispatch(WizardAction::SelectTime(value.clone()))
                                    });
                                    let active = draft.time.as_deref() == Some(*slot);
                                    html! {
                                        <button class={classes!("time-slot", active.then(|| "active"))} {onclick} disabled={submitting}>
                                            { *slot }
                                        </button>
                                    }
                                }) }
                            </div>
                        }
                    </section>

                    <section class="booking-card">
                        <h2>{"Metode Konsultasi"}</h2>
                        <div class="method-options">
                            { for [ConsultationMethod::Online, ConsultationMethod::Offline].into_iter().map(|method| html! {
                                <button
                                    class={classes!("method-option", (draft.method == method).then(|| "active"))}
                                    onclick={set_method(method)}
                                    disabled={submitting}
                                >
                                    { method.label() }
                                </button>
                            }) }
                        </div>
                    </section>

                    <section class="booking-card">
                        <h2>{"Pilih Konsultan"}</h2>
                        <ConsultantList
                            state={wizard.consultants.clone()}
                            selected={draft.consultant_id}
                            service_type={draft.service_type}
                            on_select={on_select_consultant}
                        />
                    </section>

                    <section class="booking-card">
                        <h2>{"Data Pemohon"}</h2>
                        <label>{"Nama Lengkap"}</label>
                        <input type="text" value={draft.applicant.nama.clone()}
                            oninput={text_input(&wizard, WizardAction::SetName)} disabled={submitting} />
                        <label>{"NIK"}</label>
                        <input type="text" value={draft.applicant.nik.clone()}
                            oninput={text_input(&wizard, WizardAction::SetNik)} disabled={submitting} />
                        <label>{"NPWP"}</label>
                        <input type="text" value={draft.applicant.npwp.clone()}
                            oninput={text_input(&wizard, WizardAction::SetNpwp)} disabled={submitting} />
                        <label>{"EFIN (opsional)"}</label>
                        <input type="text" value={draft.applicant.efin.clone()}
                            oninput={text_input(&wizard, WizardAction::SetEfin)} disabled={submitting} />
                    </section>
                </div>

                <aside class="booking-summary">
                    <h2>{"Ringkasan Booking"}</h2>
                    if let Some(date) = draft.date {
                        <div class="summary-row"><span>{"Tanggal:"}</span><span>{ long_date(date) }</span></div>
                    }
                    if let Some(time) = draft.time.as_ref() {
                        <div class="summary-row"><span>{"Waktu:"}</span><span>{ format!("{} WIB", time) }</span></div>
                    }
                    <div class="summary-row"><span>{"Layanan:"}</span><span>{ draft.service_type.label() }</span></div>
                    if let Some(sub_service) = draft.submitted_sub_service() {
                        <div class="summary-row"><span>{"Sub-layanan:"}</span><span>{ sub_service.label() }</span></div>
                    }
                    <div class="summary-row"><span>{"Metode:"}</span><span>{ draft.method.label() }</span></div>
                    <div class="summary-row">
                        <span>{"Konsultan:"}</span>
                        <span>{ wizard.selected_consultant().map(|c| c.name.clone()).unwrap_or_else(|| "-".to_string()) }</span>
                    </div>
                    <div class="summary-total">
                        <span>{"Total Biaya:"}</span>
                        <span>{ wizard.price().map(rupiah).unwrap_or_else(|| "-".to_string()) }</span>
                    </div>

                    if let Some(error) = wizard.submit_error.as_ref() {
                        <div class="error-message">{ error }</div>
                    }

                    <button class="submit-booking" onclick={on_submit} disabled={submitting}>
                        if submitting {
                            <span class="loading-spinner"></span>{" Memproses..."}
                        } else {
                            {"Lanjut ke Pembayaran"}
                        }
                    </button>
                    <p class="terms-hint">{"Dengan melanjutkan, Anda menyetujui syarat dan ketentuan kami"}</p>
                </aside>
            </div>
        </div>
    }
}
