use api::car_selection::CarSelectionRequest;
use api::rider_requests::RequestCardText;
use dioxus::prelude::*;

use crate::components::pico::Button;
use crate::components::pico::ButtonType;
use crate::components::pico::Card;

/// One car selection with its Accept and Decline actions. The handlers
/// receive the request id.
#[component]
pub fn RequestCard(
    request: CarSelectionRequest,
    currency_label: String,
    on_accept: EventHandler<String>,
    on_decline: EventHandler<String>,
) -> Element {
    let text = RequestCardText::new(&request, &currency_label);
    let accept_id = request.id.clone();
    let decline_id = request.id.clone();

    rsx! {
        Card {
            div {
                class: "request-card",
                if !request.status.is_pending() {
                    mark { class: "status-{request.status}", "{request.status}" }
                }
                for line in text.lines() {
                    p { class: "item-text", "{line}" }
                }
                div {
                    class: "button-row",
                    Button {
                        button_type: ButtonType::Success,
                        on_click: move |_| on_accept.call(accept_id.clone()),
                        "Accept"
                    }
                    Button {
                        button_type: ButtonType::Danger,
                        on_click: move |_| on_decline.call(decline_id.clone()),
                        "Decline"
                    }
                }
            }
        }
    }
}
