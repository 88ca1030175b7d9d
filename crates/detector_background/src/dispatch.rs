use detector_core::{Msg, TabId};
use detector_logging::detector_debug;
use serde_json::{json, Value};

use crate::coordinator::Background;
use crate::wire::RuntimeMessage;

/// Routes one runtime message to its handler. Returns the reply to resolve
/// the sender with, or `None` for fire-and-forget messages. Unrecognized
/// messages are ignored; other surfaces share the same channel.
pub async fn handle_runtime_message(
    background: &Background,
    raw: Value,
    sender_tab: Option<TabId>,
) -> Option<Value> {
    let message = match serde_json::from_value::<RuntimeMessage>(raw) {
        Ok(message) => message,
        Err(err) => {
            detector_debug!("unrecognized runtime message ignored: {}", err);
            return None;
        }
    };

    match message {
        RuntimeMessage::PanelReady => {
            match sender_tab {
                Some(tab_id) => background.inject(Msg::PanelReady { tab_id }).await,
                None => detector_debug!("PANEL_READY without a sender tab ignored"),
            }
            None
        }
        RuntimeMessage::GetAuth => {
            Some(serde_json::to_value(background.session()).unwrap_or(Value::Null))
        }
        RuntimeMessage::SignedOut => {
            background.inject(Msg::AuthChanged { session: None }).await;
            Some(json!({ "ok": true }))
        }
        RuntimeMessage::AuthUpdated { payload } => {
            background
                .inject(Msg::AuthChanged {
                    session: Some(payload),
                })
                .await;
            None
        }
        RuntimeMessage::SignInWithGoogle => match background.sign_in_with_google().await {
            Ok(session) => Some(json!({ "ok": true, "uid": session.uid })),
            Err(error) => Some(json!({ "ok": false, "error": error })),
        },
        RuntimeMessage::SignOut => match background.sign_out().await {
            Ok(()) => Some(json!({ "ok": true })),
            Err(error) => Some(json!({ "ok": false, "error": error })),
        },
        RuntimeMessage::GetIdToken => match background.session().id_token {
            Some(token) => Some(json!({ "ok": true, "token": token })),
            None => Some(json!({ "ok": false, "error": "not_signed_in" })),
        },
        RuntimeMessage::LogEvent { payload } => match background.log_event(payload).await {
            Ok(()) => Some(json!({ "ok": true })),
            Err(error) => Some(json!({ "ok": false, "error": error })),
        },
        RuntimeMessage::AuthResult { target, payload } => {
            // The hidden document addresses the background explicitly; the
            // same tag travels to other targets on this channel.
            if target.as_deref() == Some("background") {
                background.resolve_auth_result(payload);
            } else {
                detector_debug!("auth result addressed elsewhere; ignored");
            }
            None
        }
    }
}
