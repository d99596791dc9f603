//=============================================================================
// File: src/components/dialogs.rs
//=============================================================================
use api::rider_requests::Decision;
use api::rider_requests::Notice;
use dioxus::prelude::*;

use crate::components::pico::Button;
use crate::components::pico::ButtonType;
use crate::components::pico::Modal;

/// A yes/no prompt. Closing the dialog any other way counts as cancelling.
#[component]
pub fn ConfirmModal(message: String, on_answer: EventHandler<Decision>) -> Element {
    rsx! {
        Modal {
            title: "Confirm",
            on_close: move |_| on_answer.call(Decision::Cancelled),

            p { "{message}" }

            footer {
                div {
                    style: "display: flex; justify-content: flex-end; gap: 1rem;",
                    Button {
                        button_type: ButtonType::Secondary,
                        outline: true,
                        on_click: move |_| on_answer.call(Decision::Cancelled),
                        "Cancel"
                    }
                    Button {
                        button_type: ButtonType::Primary,
                        on_click: move |_| on_answer.call(Decision::Confirmed),
                        "OK"
                    }
                }
            }
        }
    }
}

/// Reports the outcome of a status write until dismissed.
#[component]
pub fn NoticeModal(notice: Notice, on_dismiss: EventHandler<()>) -> Element {
    let color = if notice.kind.is_error() {
        "var(--pico-del-color)"
    } else {
        "var(--pico-ins-color)"
    };

    rsx! {
        Modal {
            title: "{notice.title}",
            on_close: move |_| on_dismiss.call(()),

            p { style: "color: {color};", "{notice.message}" }

            footer {
                Button {
                    on_click: move |_| on_dismiss.call(()),
                    "OK"
                }
            }
        }
    }
}
