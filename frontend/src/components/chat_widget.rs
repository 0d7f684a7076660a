use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use log::debug;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_hooks::use_is_mounted;

use crate::cache::{normalize, ChatCache};

const TYPING_DELAY_MS: u32 = 1_000;
const GREETING: &str = "Halo! Saya asisten virtual ConsultaTax. Ada yang bisa saya bantu?";

const FALLBACK_REPLIES: [&str; 2] = [
    "Terima kasih atas pertanyaannya. Apakah ada hal lain yang ingin Anda tanyakan?",
    "Untuk informasi lebih detail, saya sarankan untuk melakukan konsultasi langsung dengan konsultan pajak kami.",
];

fn mentions(question: &str, words: &[&str]) -> bool {
    words.iter().any(|w| question.contains(w))
}

/// Keyword reply for a normalised question; `turn` rotates the fallback.
pub fn canned_reply(question: &str, turn: usize) -> &'static str {
    if mentions(question, &["bayar", "pembayaran", "payment", "harga", "biaya"]) {
        "Pembayaran dilakukan setelah booking melalui halaman konfirmasi pembayaran. Anda juga bisa membayar dari dashboard."
    } else if mentions(question, &["booking", "jadwal", "konsultasi", "book"]) {
        "Silakan booking konsultasi melalui halaman booking untuk mendapatkan jadwal yang sesuai."
    } else if mentions(question, &["pajak", "spt", "pph", "npwp", "tax"]) {
        "Untuk pertanyaan seputar pajak penghasilan, Anda bisa berkonsultasi dengan tim ahli kami."
    } else if mentions(question, &["admin", "cs", "bantuan"]) {
        "Tim admin kami siap membantu Anda. Apakah Anda ingin saya hubungkan dengan admin?"
    } else {
        FALLBACK_REPLIES[turn % FALLBACK_REPLIES.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: usize,
    pub sender: Sender,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatLog {
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage { id: 0, sender: Sender::Bot, text: GREETING.to_string() }],
            typing: false,
        }
    }
}

pub enum ChatAction {
    Asked(String),
    Answered(String),
}

impl Reducible for ChatLog {
    type Action = ChatAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        let id = next.messages.len();
        match action {
            ChatAction::Asked(text) => {
                next.messages.push(ChatMessage { id, sender: Sender::User, text });
                next.typing = true;
            }
            ChatAction::Answered(text) => {
                next.messages.push(ChatMessage { id, sender: Sender::Bot, text });
                next.typing = false;
            }
        }
        Rc::new(next)
    }
}

#[function_component(ChatWidget)]
pub fn chat_widget() -> Html {
    let cache = use_context::<ChatCache>();
    let log = use_reducer(ChatLog::default);
    let is_open = use_state(|| false);
    let input = use_state(String::new);
    let is_mounted = use_is_mounted();

    let send = {
        let log = log.clone();
        let input = input.clone();
        let cache = cache.clone();
        let is_mounted = is_mounted.clone();
        Callback::from(move |_: ()| {
            let question = input.trim().to_string();
            if question.is_empty() {
                return;
            }
            input.set(String::new());
            log.dispatch(ChatAction::Asked(question.clone()));

            let turn = log.messages.len();
            let reply = match cache.as_ref().and_then(|c| c.reply_for(&question)) {
                Some(hit) => {
                    debug!("Chat reply served from cache");
                    hit
                }
                None => {
                    let fresh = canned_reply(&normalize(&question), turn).to_string();
                    if let Some(cache) = cache.as_ref() {
                        cache.remember(&question, fresh.clone());
                    }
                    fresh
                }
            };

            let dispatcher = log.dispatcher();
            let is_mounted = is_mounted.clone();
            spawn_local(async move {
                TimeoutFuture::new(TYPING_DELAY_MS).await;
                if is_mounted() {
                    dispatcher.dispatch(ChatAction::Answered(reply));
                }
            });
        })
    };

    let on_click_send = {
        let send = send.clone();
        Callback::from(move |_: MouseEvent| send.emit(()))
    };

    let on_keypress = {
        let send = send.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                send.emit(());
            }
        })
    };

    let on_input = {
        let input = input.clone();
        Callback::from(move |e: InputEvent| {
            let el: HtmlInputElement = e.target_unchecked_into();
            input.set(el.value());
        })
    };

    let toggle = {
        let is_open = is_open.clone();
        Callback::from(move |_: MouseEvent| is_open.set(!*is_open))
    };

    html! {
        <div class="chat-widget">
            if *is_open {
                <div class="chat-window">
                    <div class="chat-header">
                        <span>{"Chat Support"}</span>
                        <button class="chat-close" onclick={toggle.clone()}>{"×"}</button>
                    </div>
                    <div class="chat-messages">
                        { for log.messages.iter().map(|m| html! {
                            <div key={m.id} class={classes!("chat-message", match m.sender {
                                Sender::User => "from-user",
                                Sender::Bot => "from-bot",
                            })}>
                                { &m.text }
                            </div>
                        }) }
                        if log.typing {
                            <div class="chat-message from-bot typing">{"..."}</div>
                        }
                    </div>
                    <div class="chat-input">
                        <input
                            type="text"
                            placeholder="Ketik pesan..."
                            value={(*input).clone()}
                            oninput={on_input}
                            onkeypress={on_keypress}
                        />
                        <button onclick={on_click_send}>{"Kirim"}</button>
                    </div>
                </div>
            }
            <button class="chat-toggle" onclick={toggle}>{ if *is_open { "×" } else { "💬" } }</button>
        </div>
    }
}
