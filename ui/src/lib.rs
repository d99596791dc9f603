// The client-side Dioxus application logic.

use dioxus::prelude::*;

mod components;
mod screens;

use api::prefs::user_prefs::UserPrefs;
use components::pico::Container;
use screens::rider_requests::RiderRequestScreen;

const PICO_CSS: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.cyan.min.css";

const PREFS_FAILED_MESSAGE: &str = "Failed to load settings. Please try again.";

//=============================================================================
// MAIN APPLICATION COMPONENT (Client-side)
//=============================================================================

#[allow(non_snake_case)]
pub fn App() -> Element {
    let responsive_css = r#"
    /* --- RESET --- */
    * { box-sizing: border-box; }

    html, body {
        height: 100%;
        width: 100%;
        margin: 0;
        padding: 0;
        background-color: var(--pico-background-color);
    }

    /* --- APP FRAME --- */
    .app-main-container {
        display: flex;
        flex-direction: column;
        min-height: 100vh;
        padding: 20px;
    }

    .app-main-container header {
        flex-shrink: 0;
        margin-bottom: 1rem;
    }

    /* --- REQUEST CARDS --- */
    .request-card .item-text {
        font-size: 16px;
        margin-bottom: 5px;
    }

    .request-card mark {
        float: right;
        text-transform: capitalize;
    }

    .button-row {
        display: flex;
        justify-content: space-between;
        gap: 10px;
        margin-top: 10px;
    }

    .button-row button { flex: 1; }
    button.success { background-color: green; border-color: green; color: #fff; }
    button.danger { background-color: red; border-color: red; color: #fff; }

    .error-text {
        color: red;
        font-size: 16px;
        text-align: center;
    }

    .loading {
        display: flex;
        justify-content: center;
        padding: 2rem 0;
    }

    /* --- MAP --- */
    .map-container {
        position: relative;
        height: 300px;
        margin-top: 20px;
        overflow: hidden;
        border-radius: var(--pico-border-radius);
    }

    .map-frame {
        position: absolute;
        inset: 0;
        width: 100%;
        height: 100%;
        border: 0;
    }

    .map-marker {
        position: absolute;
        width: 14px;
        height: 14px;
        margin: -14px 0 0 -7px;
        border-radius: 50% 50% 50% 0;
        transform: rotate(-45deg);
        background: var(--pico-primary);
        border: 2px solid #fff;
        pointer-events: none;
    }

    .map-marker-label {
        position: absolute;
        left: 16px;
        top: -4px;
        transform: rotate(45deg);
        font-size: 12px;
        white-space: nowrap;
    }

    .map-legend {
        margin-top: 0.5rem;
        font-size: 14px;
    }
"#;

    rsx! {
        document::Meta {
            name: "viewport",
            content: "width=device-width, initial-scale=1.0",
        }
        document::Link {
            rel: "stylesheet",
            href: "{PICO_CSS}",
        }
        style {
            "{responsive_css}"
        }
        AppBody {}
    }
}

#[component]
fn AppBody() -> Element {
    // this will be processed on server before initial page is delivered.
    let prefs_future = use_server_future(move || async move { api::get_user_prefs().await })?;

    let body = match &*prefs_future.read() {
        Some(Ok(prefs)) => {
            dioxus_logger::tracing::info!("prefs: {:#?}", prefs);
            rsx! {
                LoadedApp {
                    user_prefs: prefs.clone(),
                }
            }
        }
        Some(Err(e)) => rsx! {
            p {
                class: "error-text",
                {prefs_failure(e)}
            }
        },
        _ => rsx! {
            p {
                "Loading..."
            }
        },
    };
    body
}

/// This component holds the main app logic and only runs when prefs are ready.
#[component]
fn LoadedApp(user_prefs: UserPrefs) -> Element {
    use_context_provider(|| user_prefs.clone());

    rsx! {
        div {
            class: "app-main-container",
            Container {
                header {
                    nav {
                        ul {
                            li {
                                h1 {
                                    style: "margin: 0; font-size: 1.5rem;",
                                    "Rider Requests"
                                }
                            }
                        }
                    }
                }
                RiderRequestScreen {}
            }
        }
    }
}

/// Logs why the prefs could not be loaded and returns the text shown instead.
fn prefs_failure(error: &impl std::fmt::Display) -> &'static str {
    dioxus_logger::tracing::warn!("failed to load user prefs: {error}");
    PREFS_FAILED_MESSAGE
}
