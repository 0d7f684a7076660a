use log::{info, warn};
use thiserror::Error;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::api::ApiClient;
use crate::models::RegisterRequest;
use crate::Route;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterValidationError {
    #[error("Nama lengkap wajib diisi")]
    MissingName,
    #[error("Alamat email tidak valid")]
    InvalidEmail,
    #[error("Password minimal 8 karakter")]
    ShortPassword,
    #[error("Konfirmasi password tidak cocok")]
    PasswordMismatch,
    #[error("Anda harus menyetujui syarat dan ketentuan")]
    TermsNotAccepted,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub accept_terms: bool,
}

impl RegisterForm {
    /// First failing rule wins: name, email, password length, confirmation, terms.
    pub fn validate(&self) -> Result<RegisterRequest, RegisterValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() {
            return Err(RegisterValidationError::MissingName);
        }
        if email.is_empty() || !email.contains('@') {
            return Err(RegisterValidationError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegisterValidationError::ShortPassword);
        }
        if self.password != self.password_confirmation {
            return Err(RegisterValidationError::PasswordMismatch);
        }
        if !self.accept_terms {
            return Err(RegisterValidationError::TermsNotAccepted);
        }
        Ok(RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
        })
    }
}

#[function_component]
pub fn Register() -> Html {
    let form = use_state(RegisterForm::default);
    let error = use_state(|| None::<String>);
    let is_loading = use_state(|| false);
    let navigator = use_navigator();

    let field = |update: fn(&mut RegisterForm, String)| {
        let form = form.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*form).clone();
            update(&mut next, input.value());
            form.set(next);
        })
    };

    let on_terms = {
        let form = form.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            form.set(RegisterForm { accept_terms: input.checked(), ..(*form).clone() });
        })
    };

    let onsubmit = {
        let form = form.clone();
        let error = error.clone();
        let is_loading = is_loading.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *is_loading {
                return;
            }
            let request = match form.validate() {
                Ok(request) => request,
                Err(reason) => {
                    error.set(Some(reason.to_string()));
                    return;
                }
            };
            error.set(None);
            is_loading.set(true);

            let error = error.clone();
            let is_loading = is_loading.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                match ApiClient::new().register(&request).await {
                    Ok(()) => {
                        info!("Registration complete, moving to dashboard");
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Dashboard);
                        }
                    }
                    Err(e) => {
                        warn!("Registration failed: {}", e);
                        error.set(Some(e.to_string()));
                    }
                }
                is_loading.set(false);
            });
        })
    };

    html! {
        <div class="auth-container">
            <form class="auth-form" {onsubmit}>
                <h1>{"Daftar Akun"}</h1>
                <p>{"Buat akun untuk mulai menjadwalkan konsultasi pajak"}</p>

                <label for="name">{"Nama Lengkap"}</label>
                <input id="name" type="text" value={form.name.clone()}
                    oninput={field(|f, v| f.name = v)} />

                <label for="email">{"Email"}</label>
                <input id="email" type="email" value={form.email.clone()}
                    oninput={field(|f, v| f.email = v)} />

                <label for="password">{"Password"}</label>
                <input id="password" type="password" value={form.password.clone()}
                    oninput={field(|f, v| f.password = v)} />

                <label for="password-confirmation">{"Konfirmasi Password"}</label>
                <input id="password-confirmation" type="password" value={form.password_confirmation.clone()}
                    oninput={field(|f, v| f.password_confirmation = v)} />

                <label class="terms-checkbox">
                    <input type="checkbox" checked={form.accept_terms} onchange={on_terms} />
                    {" Saya menyetujui syarat dan ketentuan"}
                </label>

                if let Some(message) = (*error).as_ref() {
                    <div class="error-message">{ message }</div>
                }

                <button type="submit" disabled={*is_loading}>
                    if *is_loading {
                        <span class="loading-spinner"></span>{" Mendaftarkan..."}
                    } else {
                        {"Daftar"}
                    }
                </button>
            </form>
        </div>
    }
}
