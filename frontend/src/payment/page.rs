use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_hooks::use_is_mounted;
use yew_router::prelude::*;

use crate::api::ApiClient;
use crate::format::{long_date, rupiah};
use crate::models::Appointment;
use crate::payment::checkout::{
    handle_widget_event, pay_now, BannerKind, BookingNavState, CheckoutAction, CheckoutAttempt,
    CheckoutError, CheckoutPhase, PaymentCheckout, PaymentOutcome, WidgetEvent,
};
use crate::payment::snap::SnapWidget;
use crate::Route;

#[function_component]
pub fn PaymentConfirmation() -> Html {
    let location = use_location();
    let navigator = use_navigator();
    let booking = location.and_then(|l| l.state::<BookingNavState>());

    match booking {
        Some(state) => html! { <CheckoutPanel appointment={state.booking_data.clone()} /> },
        None => {
            let back = Callback::from(move |_: MouseEvent| {
                if let Some(navigator) = navigator.as_ref() {
                    navigator.push(&Route::Booking);
                }
            });
            html! {
                <div class="payment-container">
                    <div class="payment-missing">
                        <h2>{ CheckoutError::MissingBooking.to_string() }</h2>
                        <p>{"Silakan buat booking terlebih dahulu sebelum melakukan pembayaran."}</p>
                        <button class="back-button" onclick={back}>{"Kembali ke Booking"}</button>
                    </div>
                </div>
            }
        }
    }
}

#[derive(Properties, PartialEq)]
struct CheckoutPanelProps {
    appointment: Appointment,
}

fn banner_class(kind: BannerKind) -> &'static str {
    match kind {
        BannerKind::Info => "payment-banner info",
        BannerKind::Success => "payment-banner success",
        BannerKind::Warning => "payment-banner warning",
        BannerKind::Error => "payment-banner error",
    }
}

#[function_component(CheckoutPanel)]
fn checkout_panel(props: &CheckoutPanelProps) -> Html {
    let checkout = {
        let appointment = props.appointment.clone();
        use_reducer(move || PaymentCheckout::new(appointment))
    };
    let is_mounted = use_is_mounted();

    let on_pay = {
        let checkout = checkout.clone();
        let is_mounted = is_mounted.clone();
        Callback::from(move |_: MouseEvent| {
            if !checkout.can_pay() {
                return;
            }
            checkout.dispatch(CheckoutAction::PayRequested);

            let dispatch = {
                let dispatcher = checkout.dispatcher();
                let is_mounted = is_mounted.clone();
                Callback::from(move |action: CheckoutAction| {
                    if is_mounted() {
                        dispatcher.dispatch(action);
                    }
                })
            };
            let appointment = checkout.appointment.clone();
            spawn_local(async move {
                let on_event = {
                    let dispatch = dispatch.clone();
                    move |current: Rc<CheckoutAttempt>| {
                        Callback::from(move |event: WidgetEvent| {
                            let current = current.clone();
                            let dispatch = dispatch.clone();
                            spawn_local(async move {
                                handle_widget_event(&current, event, &ApiClient::new(), &dispatch).await;
                            });
                        })
                    }
                };
                match pay_now(&ApiClient::new(), &SnapWidget, Some(&appointment), &dispatch, on_event).await {
                    Ok(current) => info!("Checkout open for reference {}", current.reference_number()),
                    Err(e) => warn!("Checkout for appointment {} did not start: {}", appointment.id, e),
                }
            });
        })
    };

    let dismiss_error = {
        let dispatcher = checkout.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(CheckoutAction::DismissError))
    };

    let appointment = &checkout.appointment;
    let paid = checkout.phase == CheckoutPhase::Terminal(PaymentOutcome::Paid);

    html! {
        <div class="payment-container">
            <div class="payment-header">
                <h1>{"Konfirmasi Pembayaran"}</h1>
                <p>{"Periksa kembali detail booking Anda sebelum membayar"}</p>
            </div>

            if let Some(banner) = checkout.banner.as_ref() {
                <div class={banner_class(banner.kind)}>{ &banner.message }</div>
            }

            if let Some(error) = checkout.blocking_error.as_ref() {
                <div class="payment-error">
                    <span>{ error }</span>
                    <button class="notification-close" onclick={dismiss_error}>{"×"}</button>
                </div>
            }

            <div class="payment-details">
                <h2>{"Detail Booking"}</h2>
                <div class="detail-row"><span>{"Konsultan:"}</span><span>{ appointment.consultant_name() }</span></div>
                <div class="detail-row"><span>{"Tanggal:"}</span><span>{ long_date(appointment.date) }</span></div>
                <div class="detail-row"><span>{"Waktu:"}</span><span>{ format!("{} WIB", appointment.time) }</span></div>
                <div class="detail-row"><span>{"Layanan:"}</span><span>{ appointment.service_type.label() }</span></div>
                if let Some(sub_service) = appointment.sub_service() {
                    <div class="detail-row"><span>{"Sub-layanan:"}</span><span>{ sub_service.label() }</span></div>
                }
                <div class="detail-row"><span>{"Metode:"}</span><span>{ appointment.method.label() }</span></div>
                <div class="detail-row"><span>{"Nama:"}</span><span>{ &appointment.nama }</span></div>
                <div class="detail-row"><span>{"NIK:"}</span><span>{ &appointment.nik }</span></div>
                <div class="detail-row"><span>{"NPWP:"}</span><span>{ &appointment.npwp }</span></div>
                <div class="detail-row">
                    <span>{"Status:"}</span>
                    <span class={classes!("status-badge", appointment.status.badge_class())}>{ appointment.status.label() }</span>
                </div>
                <div class="payment-total">
                    <span>{"Total Pembayaran:"}</span>
                    <span>{ checkout.price().map(rupiah).unwrap_or_else(|| "-".to_string()) }</span>
                </div>
            </div>

            if let CheckoutPhase::AwaitingWidget(session) = &checkout.phase {
                <p class="payment-reference">{ format!("Nomor referensi: {}", session.reference_number) }</p>
            }

            if paid {
                <Link<Route> to={Route::Dashboard} classes="pay-button">{"Kembali ke Dashboard"}</Link<Route>>
            } else {
                <button class="pay-button" onclick={on_pay} disabled={!checkout.can_pay()}>
                    if checkout.is_busy() {
                        <span class="loading-spinner"></span>{" Memproses..."}
                    } else {
                        {"Bayar Sekarang"}
                    }
                </button>
            }
        </div>
    }
}
