use yew::prelude::*;
use yew_router::prelude::*;

use crate::Route;

#[function_component]
pub fn NotFound() -> Html {
    html! {
        <div class="not-found-container">
            <div class="not-found-card">
                <div class="not-found-code">{"404"}</div>
                <h1>{"Halaman Tidak Ditemukan"}</h1>
                <p>
                    {"Maaf, halaman yang Anda cari tidak dapat ditemukan. "}
                    {"Mungkin halaman telah dihapus atau alamat URL salah."}
                </p>
                <Link<Route> to={Route::Dashboard} classes="cta-button">{"Kembali ke Dashboard"}</Link<Route>>
                <Link<Route> to={Route::Booking} classes="secondary-button">{"Book Konsultasi"}</Link<Route>>
            </div>
        </div>
    }
}
