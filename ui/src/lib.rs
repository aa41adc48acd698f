//! The client-side Dioxus application: splash boot sequence, then the dashboard.

use dioxus::prelude::*;

pub mod app_state;
pub mod hooks;
pub mod screens;
pub mod splash;

use chain::data_loader::data_loader;
use chain::preload::PreloadResult;
use hooks::use_chain_status::ChainConnectionStatus;
use screens::home::HomeScreen;
use splash::SplashScreen;

const APP_CSS: &str = r#"
    * { box-sizing: border-box; }
    html, body { height: 100%; width: 100%; margin: 0; padding: 0; }
    body { font-family: "Press Start 2P", ui-monospace, monospace; background: #f6f6f4; color: #111; }

    .homepage { min-height: 100vh; display: flex; flex-direction: column; }
    .homepage header {
        display: flex; align-items: baseline; gap: 16px;
        padding: 16px 24px; border-bottom: 2px solid #111; background: #fff;
    }
    .homepage header h1 { margin: 0; font-size: 24px; letter-spacing: 4px; }
    .homepage header .tag { font-size: 11px; color: #555; letter-spacing: 2px; }
    .homepage header .status { margin-left: auto; font-size: 11px; }
    .status.ok { color: #15803d; }
    .status.err { color: #b91c1c; }

    .homepage main { flex: 1; width: 100%; max-width: 960px; margin: 0 auto; padding: 24px; }

    .stats-row { display: grid; grid-template-columns: repeat(5, 1fr); gap: 12px; margin-bottom: 24px; }
    .stat-cell { background: #fff; border: 2px solid #111; border-radius: 10px; padding: 14px; text-align: center; }
    .stat-value { font-size: 18px; }
    .stat-label { margin-top: 8px; font-size: 10px; color: #555; letter-spacing: 1px; }

    .card { background: #fff; border: 2px solid #111; border-radius: 10px; padding: 18px; margin-bottom: 24px; }
    .card h3 { margin-top: 0; font-size: 14px; letter-spacing: 2px; }
    .card table { width: 100%; border-collapse: collapse; font-size: 11px; }
    .card th, .card td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #ddd; }
    .card tr:last-child td { border-bottom: none; }

    .card button {
        font-family: inherit; font-size: 12px; padding: 10px 18px;
        background: #111; color: #fff; border: none; border-radius: 8px; cursor: pointer;
    }
    .card button:disabled { opacity: 0.5; cursor: default; }

    .error-card { border-color: #b91c1c; }
    .error-card h3 { color: #b91c1c; }

    .surf-result {
        margin-top: 16px; padding: 12px; border-left: 4px solid #eab308;
        background: #fef9c3; border-radius: 6px; font-size: 11px; word-break: break-all;
    }
    .surf-result h4 { margin: 0 0 8px 0; font-size: 12px; }
"#;

#[allow(non_snake_case)]
pub fn App() -> Element {
    rsx! {
        style { "{APP_CSS}" }
        AppBody {}
    }
}

#[component]
fn AppBody() -> Element {
    use_context_provider(|| Signal::new(ChainConnectionStatus::Connected));

    // The process-wide loader; handed explicitly to the splash screen, which
    // starts the preload at mount.
    let loader = use_hook(|| data_loader().clone());
    let mut boot = use_signal(|| None::<PreloadResult>);

    match boot() {
        None => {
            let loader = loader.clone();
            rsx! {
                SplashScreen {
                    loader,
                    on_boot_complete: move |result| boot.set(Some(result)),
                }
            }
        }
        Some(result) => {
            let retry_loader = loader.clone();
            rsx! {
                HomeScreen {
                    result,
                    on_retry: move |_| {
                        // Explicit retry: discard the settled result and run
                        // the boot sequence again from scratch.
                        retry_loader.clear();
                        boot.set(None);
                    },
                }
            }
        }
    }
}
