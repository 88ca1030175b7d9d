use url::Url;

use crate::{
    AuthSession, CoordinatorState, Effect, ErrorKind, ErrorPayload, Msg, PanelOutbound, RunPhase,
    ScoreFailure, TabId,
};

/// Selections shorter than this (after trimming) are rejected before any
/// request is made; below the floor the scorer's output is too noisy to be
/// worth computing.
pub const MIN_SELECTION_CHARS: usize = 300;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: CoordinatorState, msg: Msg) -> (CoordinatorState, Vec<Effect>) {
    let effects = match msg {
        Msg::PanelReady { tab_id } => {
            state.mark_ready(tab_id);
            Vec::new()
        }
        Msg::CommandInvoked { tab_id, url } => {
            let generation = state.begin_run(tab_id);
            let mut effects = vec![
                Effect::OpenPanel { tab_id },
                Effect::Deliver {
                    tab_id,
                    message: PanelOutbound::Loading,
                },
            ];
            // Restricted schemes (internal pages, PDF viewer, web store)
            // cannot host injectable scripts.
            if let Some(offending) = unsupported_page(url.as_deref()) {
                state.finish_run(tab_id);
                effects.push(deliver_error(
                    tab_id,
                    ErrorKind::UnsupportedPage,
                    ErrorPayload::for_url(offending),
                ));
            } else {
                effects.push(Effect::ExtractSelection { tab_id, generation });
            }
            effects
        }
        Msg::SelectionDone {
            tab_id,
            generation,
            result,
        } => {
            if !state.is_current(tab_id, generation, RunPhase::AwaitingSelection) {
                // Superseded run; its late result is dropped, not delivered.
                return (state, Vec::new());
            }
            match result {
                Err(message) => {
                    state.finish_run(tab_id);
                    vec![deliver_error(
                        tab_id,
                        ErrorKind::SelectionExtractionFailed,
                        ErrorPayload::for_message(message),
                    )]
                }
                Ok(text) => {
                    let trimmed_chars = text.trim().chars().count();
                    if trimmed_chars < MIN_SELECTION_CHARS {
                        state.finish_run(tab_id);
                        vec![deliver_error(
                            tab_id,
                            ErrorKind::SelectionTooShort,
                            ErrorPayload::for_char_count(trimmed_chars),
                        )]
                    } else {
                        state.advance_to_requesting(tab_id);
                        // The service receives the raw selection, untrimmed.
                        vec![Effect::RequestScore {
                            tab_id,
                            generation,
                            text,
                        }]
                    }
                }
            }
        }
        Msg::ScoreDone {
            tab_id,
            generation,
            result,
        } => {
            if !state.is_current(tab_id, generation, RunPhase::Requesting) {
                return (state, Vec::new());
            }
            state.finish_run(tab_id);
            let message = match result {
                Ok(report) => PanelOutbound::Data { payload: report },
                Err(ScoreFailure::Upstream { detail }) => PanelOutbound::Error {
                    error: ErrorKind::UpstreamError,
                    payload: Some(ErrorPayload::for_message(detail)),
                },
                Err(ScoreFailure::Network { message }) => PanelOutbound::Error {
                    error: ErrorKind::NetworkOrTimeout,
                    payload: Some(ErrorPayload::for_message(message)),
                },
            };
            vec![Effect::Deliver { tab_id, message }]
        }
        Msg::AuthChanged { session } => {
            state.set_session(session.clone());
            let broadcast = session.clone().unwrap_or_else(AuthSession::signed_out);
            vec![
                Effect::PersistSession { session },
                Effect::BroadcastAuth { session: broadcast },
            ]
        }
    };

    (state, effects)
}

fn deliver_error(tab_id: TabId, error: ErrorKind, payload: ErrorPayload) -> Effect {
    Effect::Deliver {
        tab_id,
        message: PanelOutbound::Error {
            error,
            payload: Some(payload),
        },
    }
}

/// Returns the offending URL string when a page cannot be scored.
fn unsupported_page(url: Option<&str>) -> Option<String> {
    match url {
        None => Some("(unknown)".to_string()),
        Some(raw) => match Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => None,
            _ => Some(raw.to_string()),
        },
    }
}
