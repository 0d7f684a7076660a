use yew::prelude::*;

use crate::format::{rupiah, short_date};
use crate::models::{Appointment, AppointmentStatus};

#[derive(Properties, PartialEq)]
pub struct AppointmentCardProps {
    pub appointment: Appointment,
    #[prop_or_default]
    pub on_pay: Callback<Appointment>,
}

#[function_component(AppointmentCard)]
pub fn appointment_card(props: &AppointmentCardProps) -> Html {
    let appointment = &props.appointment;

    let pay = {
        let on_pay = props.on_pay.clone();
        let appointment = appointment.clone();
        Callback::from(move |_: MouseEvent| on_pay.emit(appointment.clone()))
    };

    html! {
        <div class="appointment-card">
            <div class="appointment-card-header">
                <h3>{ appointment.service_type.label() }</h3>
                <span class={appointment.status.badge_class()}>{ appointment.status.label() }</span>
            </div>
            if let Some(sub_service) = appointment.sub_service() {
                <p class="appointment-sub-service">{ sub_service.label() }</p>
            }
            <div class="appointment-meta">
                <span>{ format!("📅 {}", short_date(appointment.date)) }</span>
                <span>{ format!("🕐 {} WIB", appointment.time) }</span>
                <span>{ appointment.method.label() }</span>
            </div>
            <p class="appointment-consultant">{ format!("Konsultan: {}", appointment.consultant_name()) }</p>
            if let Some(price) = appointment.price() {
                <p class="appointment-price">{ rupiah(price) }</p>
            }
            <div class="appointment-actions">
                if let Some(link) = appointment.meeting_link() {
                    <a class="join-button" href={link.to_string()} target="_blank" rel="noopener noreferrer">
                        {"Gabung Meeting"}
                    </a>
                }
                if appointment.status == AppointmentStatus::PendingPayment {
                    <button class="pay-button" onclick={pay}>{"Bayar Sekarang"}</button>
                }
            </div>
        </div>
    }
}
