//! Drop rules for the two known-bad message shapes.
//!
//! Client → child: `notifications/*` without an id. The child answers the
//! startup `notifications/initialized` with an error response carrying
//! `"id": null`, which strict clients refuse to decode. Notifications expect
//! no reply, so dropping them is invisible to the client.
//!
//! Child → client: error responses with `"id": null` and no `method`. They
//! can never be matched to a pending request. The request they belonged to
//! times out on the client instead.

use std::fmt;

use serde_json::Value;

/// Method prefix of the notification namespace.
pub const NOTIFICATION_PREFIX: &str = "notifications/";

/// Why a message was not forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// An id-less notification on its way to the child.
    Notification {
        /// The notification's method.
        method: String,
    },
    /// An error response with a null id on its way to the client.
    NullIdErrorResponse,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notification { method } => write!(f, "dropped notification: {method}"),
            Self::NullIdErrorResponse => {
                f.write_str("dropped invalid error response with id=null")
            }
        }
    }
}

/// Filter decision for one parsed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Forward,
    Drop(DropReason),
}

/// `true` if `id` is absent or explicitly null.
fn has_no_id(msg: &Value) -> bool {
    msg.get("id").is_none_or(Value::is_null)
}

/// Method of an id-less `notifications/*` message, if `msg` is one.
pub fn unhandled_notification(msg: &Value) -> Option<&str> {
    let method = msg.get("method")?.as_str()?;
    (method.starts_with(NOTIFICATION_PREFIX) && has_no_id(msg)).then_some(method)
}

/// An object with an `error`, an `id` that is present and null, and no `method`.
pub fn is_null_id_error_response(msg: &Value) -> bool {
    let Some(obj) = msg.as_object() else {
        return false;
    };
    obj.contains_key("error")
        && obj.get("id").is_some_and(Value::is_null)
        && !obj.contains_key("method")
}

/// Decide whether a client message may go to the child.
pub fn inbound_verdict(msg: &Value) -> Verdict {
    match unhandled_notification(msg) {
        Some(method) => Verdict::Drop(DropReason::Notification {
            method: method.to_string(),
        }),
        None => Verdict::Forward,
    }
}

/// Decide whether a child message may go to the client.
pub fn outbound_verdict(msg: &Value) -> Verdict {
    if is_null_id_error_response(msg) {
        Verdict::Drop(DropReason::NullIdErrorResponse)
    } else {
        Verdict::Forward
    }
}
