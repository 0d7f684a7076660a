use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, warn, Level};
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, MouseEvent};

mod api;
mod cache;
mod config;
mod error;
mod format;
mod models;
mod booking {
    pub mod draft;
    pub mod page;
    pub mod wizard;
}
mod payment {
    pub mod checkout;
    pub mod page;
    pub mod snap;
}
mod pages {
    pub mod dashboard;
    pub mod not_found;
}
mod components {
    pub mod appointment_card;
    pub mod chat_widget;
    pub mod notification;
}
mod profile {
    pub mod profile;
}
mod auth {
    pub mod register;
    pub mod session;
}
mod admin {
    pub mod dashboard;
}

use admin::dashboard::AdminDashboard;
use api::ApiClient;
use auth::session;
use auth::register::Register;
use booking::page::Booking;
use cache::ChatCache;
use error::ApiError;
use components::chat_widget::ChatWidget;
use pages::{dashboard::Dashboard, not_found::NotFound};
use payment::page::PaymentConfirmation;
use profile::profile::Profile;

#[derive(Clone, Debug, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/dashboard")]
    Dashboard,
    #[at("/booking")]
    Booking,
    #[at("/payment-confirmation")]
    PaymentConfirmation,
    #[at("/profile")]
    Profile,
    #[at("/register")]
    Register,
    #[at("/admin")]
    Admin,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home | Route::Dashboard => {
            info!("Rendering Dashboard page");
            html! { <Dashboard /> }
        }
        Route::Booking => {
            info!("Rendering Booking page");
            html! { <Booking /> }
        }
        Route::PaymentConfirmation => {
            info!("Rendering Payment confirmation page");
            html! { <PaymentConfirmation /> }
        }
        Route::Profile => {
            info!("Rendering Profile page");
            html! { <Profile /> }
        }
        Route::Register => {
            info!("Rendering Register page");
            html! { <Register /> }
        }
        Route::Admin => match session::admin_redirect(session::stored_role().as_deref()) {
            None => {
                info!("Rendering Admin page");
                html! { <AdminDashboard /> }
            }
            Some(target) => {
                warn!("Admin page refused, redirecting");
                html! { <Redirect<Route> to={target} /> }
            }
        },
        Route::NotFound => {
            info!("Rendering Not found page");
            html! { <NotFound /> }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct NavProps {
    pub logged_in: bool,
    pub on_logout: Callback<()>,
}

#[function_component(Nav)]
pub fn nav(props: &NavProps) -> Html {
    let NavProps { logged_in, on_logout } = props;
    let menu_open = use_state(|| false);
    let user_name = use_state(|| None::<String>);

    {
        let user_name = user_name.clone();
        use_effect_with_deps(
            move |logged_in: &bool| {
                if *logged_in {
                    spawn_local(async move {
                        match ApiClient::new().get_user().await {
                            Ok(user) => user_name.set(Some(user.name)),
                            Err(e) => warn!("Could not load user for header: {}", e),
                        }
                    });
                }
                || ()
            },
            *logged_in,
        );
    }

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            menu_open.set(!*menu_open);
        })
    };

    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(false))
    };

    let logout = {
        let on_logout = on_logout.clone();
        let close = close_menu.clone();
        Callback::from(move |e: MouseEvent| {
            close.emit(e);
            on_logout.emit(());
        })
    };

    let menu_class = if *menu_open { "nav-right mobile-menu-open" } else { "nav-right" };

    html! {
        <nav class="top-nav">
            <div class="nav-content">
                <Link<Route> to={Route::Dashboard} classes="nav-logo">
                    {"ConsultaTax"}
                </Link<Route>>

                <button class="burger-menu" onclick={toggle_menu}>
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <div class={menu_class}>
                    <div onclick={close_menu.clone()}>
                        <Link<Route> to={Route::Dashboard} classes="nav-link">{"Dashboard"}</Link<Route>>
                    </div>
                    <div onclick={close_menu.clone()}>
                        <Link<Route> to={Route::Booking} classes="nav-link">{"Booking"}</Link<Route>>
                    </div>
                    if *logged_in {
                        <div onclick={close_menu.clone()}>
                            <Link<Route> to={Route::Profile} classes="nav-profile-link">
                                { (*user_name).clone().unwrap_or_else(|| "Profil".to_string()) }
                            </Link<Route>>
                        </div>
                        <button onclick={logout} class="nav-logout-button">{"Keluar"}</button>
                    } else {
                        <div onclick={close_menu.clone()}>
                            <Link<Route> to={Route::Register} classes="nav-login-button">{"Daftar"}</Link<Route>>
                        </div>
                    }
                </div>
            </div>
        </nav>
    }
}

#[function_component]
fn App() -> Html {
    let logged_in = use_state(session::is_logged_in);
    let chat_cache = use_memo(|_| ChatCache::new(config::CHAT_CACHE_CAPACITY), ());

    let handle_logout = Callback::from(move |_| {
        spawn_local(async move {
            match ApiClient::new().logout().await {
                // An expired session is already logged out server-side.
                Ok(()) | Err(ApiError::Unauthorized) => {
                    info!("Logged out");
                    session::clear();
                    if let Some(window) = window() {
                        let _ = window.location().reload();
                    }
                }
                Err(e) => {
                    warn!("Logout failed: {}", e);
                    if let Some(window) = window() {
                        let _ = window.alert_with_message("Gagal logout, coba lagi.");
                    }
                }
            }
        });
    });

    html! {
        <ContextProvider<ChatCache> context={(*chat_cache).clone()}>
            <BrowserRouter>
                <Nav logged_in={*logged_in} on_logout={handle_logout} />
                <main class="page-content">
                    <Switch<Route> render={switch} />
                </main>
                <ChatWidget />
            </BrowserRouter>
        </ContextProvider<ChatCache>>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting ConsultaTax client");
    yew::Renderer::<App>::new().render();
}
