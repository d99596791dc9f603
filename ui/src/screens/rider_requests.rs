//=============================================================================
// File: src/screens/rider_requests.rs
//=============================================================================
use api::prefs::user_prefs::UserPrefs;
use api::rider_requests;
use api::rider_requests::ConfirmAction;
use api::rider_requests::Decision;
use api::rider_requests::Notice;
use api::rider_requests::RenderBranch;
use api::rider_requests::RiderRequestsState;
use api::rider_requests::NO_DATA_MESSAGE;
use api::store::server::ServerStore;
use dioxus::prelude::*;

use crate::components::dialogs::ConfirmModal;
use crate::components::dialogs::NoticeModal;
use crate::components::empty_state::EmptyState;
use crate::components::request_card::RequestCard;
use crate::components::request_map::RequestMap;

/// A confirmation prompt waiting for the rider's answer.
#[derive(Clone, PartialEq, Debug)]
struct Prompt {
    action: ConfirmAction,
    id: String,
}

#[component]
pub fn RiderRequestScreen() -> Element {
    let prefs = use_context::<UserPrefs>();

    let mut state = use_signal(RiderRequestsState::default);
    let mut prompt = use_signal::<Option<Prompt>>(|| None);
    let mut notice = use_signal::<Option<Notice>>(|| None);

    // Exactly one read per mount. No polling and no retry; a failure stays on
    // screen until the screen is mounted again.
    use_future(move || async move {
        let result = rider_requests::fetch_pending(&ServerStore).await;
        state.write().apply_fetch(result);
    });

    // Answers the open prompt. Only a confirmed answer for a request that is
    // still listed reaches the store, and the local list is patched only after
    // the store accepted the write.
    let mut answer = move |decision: Decision| {
        let Some(Prompt { action, id }) = std::mem::take(&mut *prompt.write()) else {
            return;
        };
        let Some(change) = rider_requests::gate(action, &id, decision) else {
            return;
        };
        if let Err(refused) = state.peek().check_change(&change) {
            notice.set(Some(refused));
            return;
        }
        spawn(async move {
            let result = rider_requests::write_status(&ServerStore, &change).await;
            let outcome = state.write().apply_status_update(&change, result);
            notice.set(Some(outcome));
        });
    };

    let currency_label = prefs.fare_currency_label().to_string();
    let map_view = state.read().map_view(prefs.missing_coordinates());

    rsx! {
        div {
            class: "rider-requests",
            match state.read().branch() {
                RenderBranch::Loading => rsx! {
                    div {
                        class: "loading",
                        "aria-busy": "true",
                        progress {}
                    }
                },
                RenderBranch::Error(message) => rsx! {
                    p { class: "error-text", "{message}" }
                },
                RenderBranch::Empty => rsx! {
                    EmptyState { title: NO_DATA_MESSAGE.to_string() }
                },
                RenderBranch::List(requests) => rsx! {
                    div {
                        class: "request-list",
                        for request in requests.iter() {
                            RequestCard {
                                key: "{request.id}",
                                request: request.clone(),
                                currency_label: currency_label.clone(),
                                on_accept: move |id: String| {
                                    prompt.set(Some(Prompt { action: ConfirmAction::Accept, id }));
                                },
                                on_decline: move |id: String| {
                                    prompt.set(Some(Prompt { action: ConfirmAction::Decline, id }));
                                },
                            }
                        }
                    }
                    if let Some(view) = map_view.clone() {
                        RequestMap { view }
                    }
                },
            }

            if let Some(Prompt { action, .. }) = prompt() {
                ConfirmModal {
                    message: action.prompt().to_string(),
                    on_answer: move |decision| answer(decision),
                }
            }

            if let Some(current) = notice() {
                NoticeModal {
                    notice: current,
                    on_dismiss: move |_| notice.set(None),
                }
            }
        }
    }
}
