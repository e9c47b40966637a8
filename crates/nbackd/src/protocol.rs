//! Newline-delimited JSON protocol between the daemon and UI clients.

use nback::{Modality, NBackError, SessionConfig, SessionSnapshot, Trainer};
use serde::{Deserialize, Serialize};
use tracing::info;

fn default_grid_size() -> u32 {
    SessionConfig::default().grid_size
}

fn default_n() -> usize {
    SessionConfig::default().n
}

fn default_interval_ms() -> u64 {
    SessionConfig::default().interval_ms
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Introspect the daemon API surface.
    ApiCatalog,

    /// Start a new session; resets history, responses and scores.
    Configure {
        #[serde(default = "default_grid_size")]
        grid_size: u32,
        #[serde(default = "default_n")]
        n: usize,
        modalities: Vec<String>,
        #[serde(default = "default_interval_ms")]
        interval_ms: u64,
        #[serde(default)]
        seed: Option<u64>,
    },

    Start,
    Stop,
    Toggle,

    Declare {
        modality: String,
        is_match: bool,
    },

    GetState,

    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub request: String,
    pub input: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    ApiCatalog { endpoints: Vec<ApiEndpoint> },
    State(Box<SessionSnapshot>),
    Success { message: String },
    Error { message: String },
}

impl From<NBackError> for Response {
    fn from(e: NBackError) -> Self {
        Response::Error {
            message: e.to_string(),
        }
    }
}

fn endpoint(request: &str, input: &str, description: &str) -> ApiEndpoint {
    ApiEndpoint {
        request: request.to_string(),
        input: input.to_string(),
        description: description.to_string(),
    }
}

fn api_catalog() -> Vec<ApiEndpoint> {
    vec![
        endpoint(
            "Configure",
            "{ grid_size?, n?, modalities: [..], interval_ms?, seed? }",
            "Start a fresh session (stops the timer, clears history and scores).",
        ),
        endpoint("Start", "{}", "Begin presenting rounds every interval."),
        endpoint("Stop", "{}", "Stop presenting rounds."),
        endpoint("Toggle", "{}", "Flip between running and stopped."),
        endpoint(
            "Declare",
            "{ modality, is_match }",
            "Declare match / no-match for the round on screen.",
        ),
        endpoint("GetState", "{}", "Snapshot of the current session."),
        endpoint("Shutdown", "{}", "Stop the timer and exit the daemon."),
    ]
}

fn parse_modalities(names: &[String]) -> Result<Vec<Modality>, NBackError> {
    names.iter().map(|n| n.parse()).collect()
}

/// Apply one request to the trainer.
pub fn handle_request(trainer: &Trainer, request: Request) -> Response {
    match request {
        Request::ApiCatalog => Response::ApiCatalog {
            endpoints: api_catalog(),
        },
        Request::Configure {
            grid_size,
            n,
            modalities,
            interval_ms,
            seed,
        } => {
            let modalities = match parse_modalities(&modalities) {
                Ok(m) => m,
                Err(e) => return e.into(),
            };
            let mut config = SessionConfig::new(grid_size, n, modalities, interval_ms);
            config.seed = seed;
            match trainer.reconfigure(config) {
                Ok(()) => Response::Success {
                    message: "Session configured".to_string(),
                },
                Err(e) => e.into(),
            }
        }
        Request::Start => match trainer.start() {
            Ok(true) => Response::Success {
                message: "Started".to_string(),
            },
            Ok(false) => Response::Success {
                message: "Already running".to_string(),
            },
            Err(e) => e.into(),
        },
        Request::Stop => {
            let message = if trainer.stop() {
                "Stopped"
            } else {
                "Already stopped"
            };
            Response::Success {
                message: message.to_string(),
            }
        }
        Request::Toggle => match trainer.toggle() {
            Ok(running) => Response::Success {
                message: if running { "Started" } else { "Stopped" }.to_string(),
            },
            Err(e) => e.into(),
        },
        Request::Declare { modality, is_match } => {
            let result = modality
                .parse::<Modality>()
                .and_then(|m| trainer.declare_response(m, is_match));
            match result {
                Ok(()) => Response::Success {
                    message: format!(
                        "{} declared {}",
                        modality.trim().to_ascii_lowercase(),
                        if is_match { "match" } else { "no match" }
                    ),
                },
                Err(e) => e.into(),
            }
        }
        Request::GetState => Response::State(Box::new(trainer.snapshot())),
        Request::Shutdown => {
            trainer.stop();
            info!("Shutdown requested");
            Response::Success {
                message: "Shutting down".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trainer() -> Trainer {
        Trainer::configure(SessionConfig::new(3, 2, [Modality::Position], 100).with_seed(9))
            .unwrap()
    }

    fn request(json: &str) -> Request {
        serde_json::from_str(json).unwrap()
    }

    fn is_error(resp: &Response) -> bool {
        matches!(resp, Response::Error { .. })
    }

    #[test]
    fn configure_applies_defaults_and_validates() {
        let t = trainer();
        let resp = handle_request(
            &t,
            request(r#"{"type":"Configure","modalities":["color","Audio"],"n":3}"#),
        );
        assert!(!is_error(&resp), "{:?}", resp);
        let snap = t.snapshot();
        assert_eq!(snap.config.n, 3);
        assert_eq!(snap.config.grid_size, 3);
        assert_eq!(snap.scores.len(), 2);

        let resp = handle_request(
            &t,
            request(r#"{"type":"Configure","grid_size":0,"modalities":["color"]}"#),
        );
        match resp {
            Response::Error { message } => assert!(message.contains("grid size")),
            other => panic!("expected error, got {:?}", other),
        }
        // Rejected configure leaves the previous session in place.
        assert_eq!(t.snapshot().config.n, 3);
    }

    #[test]
    fn unknown_modality_is_reported() {
        let t = trainer();
        let resp = handle_request(
            &t,
            request(r#"{"type":"Configure","modalities":["smell"]}"#),
        );
        assert!(is_error(&resp));

        let resp = handle_request(
            &t,
            request(r#"{"type":"Declare","modality":"smell","is_match":true}"#),
        );
        assert!(is_error(&resp));
    }

    #[test]
    fn declare_for_inactive_modality_is_rejected() {
        let t = trainer();
        let resp = handle_request(
            &t,
            request(r#"{"type":"Declare","modality":"color","is_match":true}"#),
        );
        assert!(is_error(&resp));

        let resp = handle_request(
            &t,
            request(r#"{"type":"Declare","modality":"position","is_match":false}"#),
        );
        assert!(!is_error(&resp));
        assert_eq!(t.snapshot().responses[0].declared, Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn start_stop_round_trip() {
        let t = trainer();
        let resp = handle_request(&t, Request::Start);
        assert!(matches!(resp, Response::Success { ref message } if message == "Started"));
        let resp = handle_request(&t, Request::Start);
        assert!(matches!(resp, Response::Success { ref message } if message == "Already running"));

        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        match handle_request(&t, Request::GetState) {
            Response::State(snap) => {
                assert!(snap.running);
                assert_eq!(snap.rounds_presented, 2);
            }
            other => panic!("expected state, got {:?}", other),
        }

        handle_request(&t, Request::Shutdown);
        assert!(!t.is_running());
    }

    #[test]
    fn state_response_serializes_with_type_tag() {
        let t = trainer();
        let json = serde_json::to_value(handle_request(&t, Request::GetState)).unwrap();
        assert_eq!(json["type"], "State");
        assert_eq!(json["running"], false);
        assert_eq!(json["rounds_presented"], 0);
    }
}
