use gloo_timers::callback::Timeout;
use yew::prelude::*;

use crate::config::NOTICE_DISMISS_MS;

#[derive(Properties, PartialEq)]
pub struct NotificationProps {
    pub message: String,
    #[prop_or("info")]
    pub kind: &'static str,
    #[prop_or_default]
    pub on_dismiss: Callback<()>,
    /// `None` keeps the notification until the user closes it.
    #[prop_or(Some(NOTICE_DISMISS_MS))]
    pub auto_dismiss_ms: Option<u32>,
}

/// Inline notification, optionally dismissing itself after a delay.
#[function_component(Notification)]
pub fn notification(props: &NotificationProps) -> Html {
    {
        let on_dismiss = props.on_dismiss.clone();
        let delay = props.auto_dismiss_ms;
        use_effect_with_deps(
            move |_| {
                let timeout = delay.map(|ms| Timeout::new(ms, move || on_dismiss.emit(())));
                // Dropping the timer cancels it when the message changes.
                move || drop(timeout)
            },
            props.message.clone(),
        );
    }

    let close = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(()))
    };

    html! {
        <div class={classes!("notification", format!("notification-{}", props.kind))} role="alert">
            <span class="notification-message">{ &props.message }</span>
            <button class="notification-close" onclick={close}>{"×"}</button>
        </div>
    }
}
