//! JSON protocols spoken by workwheel.
//!
//! Two line-delimited request/response protocols share the same envelope:
//! - `Command`: operations a client can ask of a wheel (`workwheel serve`)
//! - `ProviderCommand`: what workwheel asks of a `workwheel-provider-*`
//!   binary to get today's events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::day_window::DayWindow;
use crate::error::{WorkWheelError, WorkWheelResult};
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Classify,
    MoveToStatus,
    Tick,
    Calibrate,
    State,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Classify => "classify",
            Command::MoveToStatus => "move_to_status",
            Command::Tick => "tick",
            Command::Calibrate => "calibrate",
            Command::State => "state",
        }
    }
}

/// Request sent to a wheel (or to a provider, with `ProviderCommand`).
#[derive(Debug, Serialize, Deserialize)]
pub struct Request<C = Command> {
    pub command: C,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response to a request.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data })
            .unwrap_or_else(|e| Response::error(&format!("Failed to serialize response: {e}")))
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        let response = Response::<()>::Error {
            error: msg.to_string(),
        };
        serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"status":"error","error":"unserializable error"}"#.to_string())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AtParams {
    /// Evaluate at this instant instead of the current time.
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MoveToStatusParams {
    status: Status,
}

/// A fully-typed wheel operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Classify { now: Option<DateTime<Utc>> },
    MoveToStatus { status: Status },
    Tick { now: Option<DateTime<Utc>> },
    Calibrate,
    State,
}

impl TryFrom<Request> for Operation {
    type Error = WorkWheelError;

    fn try_from(request: Request) -> WorkWheelResult<Self> {
        let command = request.command;
        let params = request.params;
        Ok(match command {
            Command::Classify => Operation::Classify {
                now: parse_params::<AtParams>(command, params)?.now,
            },
            Command::MoveToStatus => Operation::MoveToStatus {
                status: parse_params::<MoveToStatusParams>(command, params)?.status,
            },
            Command::Tick => Operation::Tick {
                now: parse_params::<AtParams>(command, params)?.now,
            },
            Command::Calibrate => Operation::Calibrate,
            Command::State => Operation::State,
        })
    }
}

/// Missing params are treated as an empty object.
fn parse_params<P: DeserializeOwned>(command: Command, params: serde_json::Value) -> WorkWheelResult<P> {
    let params = if params.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| WorkWheelError::InvalidParams {
        command: command.name().to_string(),
        message: e.to_string(),
    })
}

// ============================================================================
// Provider protocol
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCommand {
    ListEvents,
}

/// Params for `ProviderCommand::ListEvents`, mirroring an events.list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub calendar_id: String,
    pub time_min: String,
    pub time_max: String,
    /// Expand recurring events into instances.
    pub single_events: bool,
    pub order_by: String,
}

impl ListEvents {
    pub fn for_day(account: Option<String>, calendar_id: String, window: &DayWindow) -> Self {
        ListEvents {
            account,
            calendar_id,
            time_min: window.time_min(),
            time_max: window.time_max(),
            single_events: true,
            order_by: "startTime".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn request(value: serde_json::Value) -> Request {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tick_without_params() {
        let op = Operation::try_from(request(json!({"command": "tick"}))).unwrap();
        assert_eq!(op, Operation::Tick { now: None });
    }

    #[test]
    fn test_classify_with_now() {
        let op = Operation::try_from(request(json!({
            "command": "classify",
            "params": {"now": "2025-11-09T10:00:00Z"}
        })))
        .unwrap();

        assert_eq!(
            op,
            Operation::Classify {
                now: Some(Utc.with_ymd_and_hms(2025, 11, 9, 10, 0, 0).unwrap())
            }
        );
    }

    #[test]
    fn test_move_to_status_requires_status() {
        let op = Operation::try_from(request(json!({
            "command": "move_to_status",
            "params": {"status": "focus_time"}
        })))
        .unwrap();
        assert_eq!(
            op,
            Operation::MoveToStatus {
                status: Status::FocusTime
            }
        );

        let err = Operation::try_from(request(json!({"command": "move_to_status"}))).unwrap_err();
        assert!(matches!(err, WorkWheelError::InvalidParams { .. }));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let parsed = serde_json::from_value::<Request>(json!({"command": "set_credentials"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_response_envelope() {
        assert_eq!(
            Response::success(Status::Available),
            r#"{"status":"success","data":"available"}"#
        );
        assert_eq!(
            Response::error("boom"),
            r#"{"status":"error","error":"boom"}"#
        );
    }

    #[test]
    fn test_list_events_for_day() {
        let window = DayWindow::containing(Utc.with_ymd_and_hms(2025, 11, 9, 10, 0, 0).unwrap());
        let params = ListEvents::for_day(None, "primary".to_string(), &window);
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(value["time_min"], "2025-11-09T00:00:00+00:00");
        assert_eq!(value["time_max"], "2025-11-10T00:00:00+00:00");
        assert_eq!(value["order_by"], "startTime");
        assert!(value.get("account").is_none());
    }
}
