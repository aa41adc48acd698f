//! The splash screen: boot animation, status phrases, and the one-time
//! handoff of the preloaded data to the main view.

pub mod sequencer;

use chain::data_loader::DataLoader;
use chain::preload::PreloadResult;
use dioxus::prelude::*;

use sequencer::run_transition_steps;
use sequencer::type_delay;
use sequencer::BootEvent;
use sequencer::BootPhase;
use sequencer::SequencerCore;
use sequencer::TransitionStage;
use sequencer::CONFIRM_LABEL;
use sequencer::PHRASES;
use sequencer::PHRASE_FADE_OUT;
use sequencer::PHRASE_LEAD_IN;
use sequencer::TAGLINE;
use sequencer::TITLE;

const SPLASH_CSS: &str = r#"
    .splash { position: fixed; inset: 0; display: flex; align-items: center; justify-content: center; background: #fff; overflow: hidden; z-index: 50; }
    .splash-content { display: flex; flex-direction: column; align-items: center; opacity: 1; transition: opacity 0.7s cubic-bezier(0.4, 0, 0.2, 1); }
    .splash-content.faded { opacity: 0; }

    .title-row { display: flex; gap: 12px; }
    .unit {
        width: 90px; height: 120px; background: #000; border-radius: 10px;
        color: #fff; font-size: 64px; display: flex; align-items: center; justify-content: center;
        user-select: none;
    }
    .unit.fall { animation: unit-fall 0.7s cubic-bezier(0.22, 0.61, 0.36, 1) both; animation-delay: var(--stagger); }
    @keyframes unit-fall { from { transform: translateY(-200px); } to { transform: translateY(0); } }
    .unit.bob { animation: unit-bob var(--bob-duration) ease-in-out infinite alternate; }
    @keyframes unit-bob { from { transform: translateY(0); } to { transform: translateY(40px); } }
    .unit.grow { animation: unit-grow 1.2s cubic-bezier(0.65, 0, 0.35, 1) forwards; }
    @keyframes unit-grow { to { transform: scale(30); } }

    .tagline { margin-top: 24px; font-size: 20px; letter-spacing: 4px; opacity: 1; transition: opacity 0.5s cubic-bezier(0.4, 0, 0.2, 1); }
    .tagline.hidden { opacity: 0; }

    .confirm {
        margin-top: 40px; padding: 12px 24px; font-size: 18px; font-family: inherit;
        background: #fff; color: #000; border: none; border-radius: 12px;
        box-shadow: 0 2px 16px 0 #0006; cursor: pointer; z-index: 60;
        transition: transform 0.18s cubic-bezier(0.4, 0, 0.2, 1);
        animation: confirm-in 0.4s ease-out both;
    }
    .confirm:hover { transform: scale(1.08); }
    @keyframes confirm-in { from { opacity: 0; transform: translateY(40px) scale(0.7); } to { opacity: 1; transform: none; } }

    .boot-phrase {
        position: fixed; right: 18px; bottom: 14px; font-size: 14px; letter-spacing: 1px;
        opacity: 0; transform: translateY(20px); pointer-events: none;
        transition: opacity 0.4s cubic-bezier(0.4, 0, 0.2, 1), transform 0.4s cubic-bezier(0.4, 0, 0.2, 1);
    }
    .boot-phrase.visible { opacity: 1; transform: none; }
    .cursor { display: inline-block; width: 1ch; color: #0ff; text-shadow: 0 0 4px #0ff; animation: cursor-blink 0.7s steps(1) infinite; }
    @keyframes cursor-blink { 0%, 60% { opacity: 1; } 61%, 100% { opacity: 0; } }

    .cube-overlay { position: fixed; inset: 0; background: #000; display: flex; align-items: center; justify-content: center; pointer-events: none; z-index: 1000; }
    .cube { width: 80px; height: 80px; background: #fff; border-radius: 16px; box-shadow: 0 0 40px 10px #22c55e, 0 0 80px 20px #22c55e44; transition: all 1.5s cubic-bezier(0.25, 0.46, 0.45, 0.94); }
    .cube.pulse { animation: cube-pulse 0.8s ease-in-out infinite; }
    @keyframes cube-pulse { 0%, 100% { opacity: 1; transform: scale(1); } 50% { opacity: 0.3; transform: scale(1.05); } }
    .cube.expand { width: 100vw; height: 100vh; border-radius: 0; box-shadow: none; }
"#;

#[component]
pub fn SplashScreen(loader: DataLoader, on_boot_complete: EventHandler<PreloadResult>) -> Element {
    let unit_count = TITLE.chars().count();

    let core = use_signal(SequencerCore::new);
    let mut fallen = use_signal(|| 0usize);
    let phrase_idx = use_signal(|| 0usize);
    let phrase_visible = use_signal(|| false);
    let typed_end = use_signal(String::new);
    let show_cursor = use_signal(|| false);
    let fade_out = use_signal(|| false);
    let show_cube = use_signal(|| false);
    let cube_pulse = use_signal(|| false);
    let cube_expand = use_signal(|| false);

    // Kick the preload off at mount. The animation never waits on it; the
    // handoff at the end of the exit transition does.
    {
        let loader = loader.clone();
        use_future(move || {
            let loader = loader.clone();
            async move {
                let result = loader.load_all().await;
                dioxus_logger::tracing::info!(status = ?result.status, "boot preload settled");
            }
        });
    }

    // Unmount: stale every outstanding timer before the tasks are dropped.
    {
        let mut core = core;
        use_drop(move || core.write().invalidate());
    }

    let phase = core.read().phase();
    let unit_class = match phase {
        BootPhase::Entering => "unit fall",
        BootPhase::Cycling | BootPhase::AwaitingConfirm => "unit bob",
        _ => "unit grow",
    };
    let content_class = if fade_out() { "splash-content faded" } else { "splash-content" };
    let tagline_class = if phase.is_entering() { "tagline hidden" } else { "tagline" };

    let idx = *phrase_idx.read() % PHRASES.len();
    let phrase = &PHRASES[idx];
    let phrase_shown = (phase.is_cycling() || phase.is_awaiting_confirm()) && phrase_visible();
    let phrase_class = if phrase_shown { "boot-phrase visible" } else { "boot-phrase" };
    let cursor_shown =
        show_cursor() && typed_end.read().chars().count() < phrase.end.chars().count();
    let cube_class = if cube_expand() {
        "cube expand"
    } else if cube_pulse() {
        "cube pulse"
    } else {
        "cube"
    };

    let units = TITLE.chars().enumerate().map(|(i, ch)| {
        let stagger = i * 80;
        let bob_duration = 1100 + i * 80;
        let loader = loader.clone();
        let mut core = core;
        let on_unit_animation_end = move |_: Event<AnimationData>| {
            let phase = core.peek().phase();
            if phase.is_entering() {
                let done = *fallen.peek() + 1;
                fallen.set(done);
                if done == unit_count {
                    let maybe_token = core.write().apply(BootEvent::EntranceComplete);
                    if let Some(token) = maybe_token {
                        start_phrase_cycle(
                            token,
                            core,
                            phrase_idx,
                            phrase_visible,
                            typed_end,
                            show_cursor,
                        );
                    }
                }
            } else if phase.is_growing() && i + 1 == unit_count {
                let maybe_token = core.write().apply(BootEvent::GrowthComplete);
                if let Some(token) = maybe_token {
                    start_exit_transition(
                        token,
                        core,
                        loader.clone(),
                        on_boot_complete,
                        fade_out,
                        show_cube,
                        cube_pulse,
                        cube_expand,
                    );
                }
            }
        };
        rsx! {
            div {
                key: "{i}",
                class: "{unit_class}",
                style: "--stagger: {stagger}ms; --bob-duration: {bob_duration}ms;",
                onanimationend: on_unit_animation_end,
                "{ch}"
            }
        }
    });

    let mut confirm_core = core;
    let on_confirm = move |_| {
        confirm_core.write().apply(BootEvent::Confirm);
    };

    rsx! {
        style { "{SPLASH_CSS}" }
        div {
            class: "splash",
            div {
                class: "{content_class}",
                div {
                    class: "title-row",
                    {units}
                }
                div {
                    class: "{tagline_class}",
                    "{TAGLINE}"
                }
                if phase.is_awaiting_confirm() {
                    button {
                        class: "confirm",
                        onclick: on_confirm,
                        "{CONFIRM_LABEL}"
                    }
                }
            }
            div {
                class: "{phrase_class}",
                "{phrase.base}"
                span { "{typed_end}" }
                if cursor_shown {
                    span { class: "cursor", "|" }
                }
            }
            if show_cube() {
                div {
                    class: "cube-overlay",
                    div { class: "{cube_class}" }
                }
            }
        }
    }
}

/// Drives the status phrases while the preload runs in the background.
///
/// One task owns the whole cycle, so no two phrase timers ever coexist; the
/// epoch token retires the task the moment the machine moves on.
fn start_phrase_cycle(
    token: u64,
    core: Signal<SequencerCore>,
    mut phrase_idx: Signal<usize>,
    mut phrase_visible: Signal<bool>,
    mut typed_end: Signal<String>,
    mut show_cursor: Signal<bool>,
) {
    spawn(async move {
        let mut core = core;
        loop {
            if !core.peek().is_current(token) {
                return;
            }
            let idx = *phrase_idx.peek() % PHRASES.len();
            let phrase = &PHRASES[idx];
            typed_end.set(String::new());
            show_cursor.set(true);

            tokio::time::sleep(PHRASE_LEAD_IN).await;
            if !core.peek().is_current(token) {
                return;
            }
            phrase_visible.set(true);

            let mut revealed = String::new();
            for ch in phrase.end.chars() {
                tokio::time::sleep(type_delay()).await;
                if !core.peek().is_current(token) {
                    return;
                }
                revealed.push(ch);
                typed_end.set(revealed.clone());
            }
            show_cursor.set(false);

            if idx + 1 == PHRASES.len() {
                // The final phrase holds; the confirm action takes it from here.
                core.write().apply(BootEvent::FinalPhraseRevealed);
                return;
            }

            tokio::time::sleep(phrase.dwell).await;
            if !core.peek().is_current(token) {
                return;
            }
            phrase_visible.set(false);
            tokio::time::sleep(PHRASE_FADE_OUT).await;
            if !core.peek().is_current(token) {
                return;
            }
            phrase_idx.set((idx + 1) % PHRASES.len());
        }
    });
}

/// Runs the timed exit sub-phases, then completes the boot: waits for the
/// preload to settle and hands the result off exactly once.
#[allow(clippy::too_many_arguments)]
fn start_exit_transition(
    token: u64,
    core: Signal<SequencerCore>,
    loader: DataLoader,
    on_boot_complete: EventHandler<PreloadResult>,
    mut fade_out: Signal<bool>,
    mut show_cube: Signal<bool>,
    mut cube_pulse: Signal<bool>,
    mut cube_expand: Signal<bool>,
) {
    spawn(async move {
        let mut core = core;
        run_transition_steps(|stage| {
            if !core.peek().is_current(token) {
                return false;
            }
            dioxus_logger::tracing::debug!(?stage, "exit transition");
            match stage {
                TransitionStage::FadeOut => fade_out.set(true),
                TransitionStage::Pulse => {
                    show_cube.set(true);
                    cube_pulse.set(true);
                }
                TransitionStage::Expand => {
                    cube_pulse.set(false);
                    cube_expand.set(true);
                }
                TransitionStage::Hold => {}
            }
            true
        })
        .await;
        if !core.peek().is_current(token) {
            return;
        }
        core.write().apply(BootEvent::TransitionComplete);

        // Entering Done is gated on the load settling; a failed result is
        // handed off like any other.
        let result = loader.load_all().await;
        if core.write().try_hand_off() {
            dioxus_logger::tracing::info!(status = ?result.status, "boot complete");
            on_boot_complete.call(result);
        }
    });
}
