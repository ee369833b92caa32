use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rfq_core::{
    Channel, ConnectionState, Effect, Msg, ProjectRef, RfqSubmission, RfqSubmitted,
    VendorRequirement,
};
use rfq_engine::{
    ClientConfig, EngineEvent, EngineHandle, FetchRequest, NewProject, ProjectSelection,
    RfqPayload, SocketChannel, SocketEventKind, SocketState, SubmissionRequest,
    VendorRequirementPayload,
};
use rfq_logging::{rfq_info, rfq_warn};

use super::app::Input;
use super::ui;

pub struct EffectRunner {
    engine: Arc<EngineHandle>,
}

impl EffectRunner {
    pub fn new(config: ClientConfig, input_tx: mpsc::Sender<Input>) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(config).context("failed to start the engine")?;
        let runner = Self {
            engine: Arc::new(engine),
        };
        runner.spawn_event_loop(input_tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenSocket { channel, path } => {
                    rfq_info!("OpenSocket channel={} path={}", channel.label(), path);
                    self.engine.open_socket(engine_channel(channel), path);
                }
                Effect::CloseSocket { channel } => {
                    rfq_info!("CloseSocket channel={}", channel.label());
                    self.engine.close_socket(engine_channel(channel));
                }
                Effect::SendSocket { channel, message } => {
                    self.engine.send_socket(engine_channel(channel), message);
                }
                Effect::SubmitRfq(submission) => {
                    self.engine.submit(submission_request(submission));
                }
                Effect::ShowToast(toast) => {
                    ui::print_lines(&[ui::render::render_toast(&toast)]);
                }
            }
        }
    }

    pub fn fetch(&self, request: FetchRequest) {
        self.engine.fetch(request);
    }

    fn spawn_event_loop(&self, input_tx: mpsc::Sender<Input>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if input_tx.send(input_for(event, Utc::now())).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn input_for(event: EngineEvent, now: DateTime<Utc>) -> Input {
    match event {
        EngineEvent::Socket(event) => {
            let channel = core_channel(event.channel);
            Input::Msg(match event.kind {
                SocketEventKind::StateChanged(state) => Msg::ConnectionChanged {
                    channel,
                    state: map_state(state),
                },
                SocketEventKind::Frame(text) => Msg::FrameReceived { channel, text },
                SocketEventKind::ReconnectScheduled { attempt } => {
                    Msg::ReconnectScheduled { channel, attempt }
                }
                SocketEventKind::ReconnectsExhausted => Msg::ReconnectsExhausted { channel },
            })
        }
        EngineEvent::SubmissionFinished(outcome) => {
            let (payload, failures) = match outcome {
                Ok(created) => (created.payload, Vec::new()),
                Err(failure) => {
                    rfq_warn!("{}", failure);
                    let failures = failure.failures();
                    (failure.payload, failures)
                }
            };
            Input::Msg(Msg::SubmissionFinished {
                submitted: submitted_rfq(payload),
                failures,
                now,
            })
        }
        EngineEvent::Fetched { request, result } => Input::Fetched { request, result },
    }
}

fn submitted_rfq(payload: RfqPayload) -> RfqSubmitted {
    RfqSubmitted {
        rfq_id: payload.rfq_id,
        project_id: payload.project_id,
        status: payload.status,
        deadline: payload.deadline,
        vendor_requirements: payload
            .vendor_requirements
            .into_iter()
            .map(|requirement| VendorRequirement {
                vendor_id: requirement.vendor_id,
                required_documents: requirement.required_documents.into_iter().collect(),
            })
            .collect(),
        created_at: payload.created_at,
    }
}

fn submission_request(submission: RfqSubmission) -> SubmissionRequest {
    let project = match submission.project {
        ProjectRef::Existing { project_id } => ProjectSelection::Existing(project_id),
        ProjectRef::New { name, description } => {
            ProjectSelection::New(NewProject { name, description })
        }
    };
    SubmissionRequest {
        rfq_id: submission.rfq_id,
        description: submission.description,
        deadline: submission.deadline,
        project,
        vendor_requirements: submission
            .vendor_requirements
            .into_iter()
            .map(|requirement| VendorRequirementPayload {
                vendor_id: requirement.vendor_id,
                required_documents: requirement.required_documents.into_iter().collect(),
            })
            .collect(),
        requested_at: submission.requested_at,
    }
}

fn engine_channel(channel: Channel) -> SocketChannel {
    match channel {
        Channel::Dashboard => SocketChannel::Dashboard,
        Channel::Documents => SocketChannel::Documents,
        Channel::Rfq => SocketChannel::Rfq,
    }
}

fn core_channel(channel: SocketChannel) -> Channel {
    match channel {
        SocketChannel::Dashboard => Channel::Dashboard,
        SocketChannel::Documents => Channel::Documents,
        SocketChannel::Rfq => Channel::Rfq,
    }
}

fn map_state(state: SocketState) -> ConnectionState {
    match state {
        SocketState::Connecting => ConnectionState::Connecting,
        SocketState::Connected => ConnectionState::Connected,
        SocketState::Disconnected => ConnectionState::Disconnected,
        SocketState::Error => ConnectionState::Error,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use rfq_engine::{ApiError, PartialFailure, SocketEvent};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap()
    }

    #[test]
    fn socket_events_become_messages() {
        let input = input_for(
            EngineEvent::Socket(SocketEvent {
                channel: SocketChannel::Rfq,
                generation: 1,
                kind: SocketEventKind::StateChanged(SocketState::Error),
            }),
            now(),
        );
        assert_eq!(
            input,
            Input::Msg(Msg::ConnectionChanged {
                channel: Channel::Rfq,
                state: ConnectionState::Error
            })
        );
    }

    #[test]
    fn partial_failure_reports_each_failed_call() {
        let payload = RfqPayload {
            rfq_id: "RFQ_000001".to_string(),
            description: "Pumps and valves".to_string(),
            deadline: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            project_id: "PRJ_1".to_string(),
            vendor_requirements: vec![VendorRequirementPayload {
                vendor_id: "v-3".to_string(),
                required_documents: vec!["vendor_quote".to_string()],
            }],
            status: "draft".to_string(),
            created_at: now(),
            updated_at: now(),
        };
        let input = input_for(
            EngineEvent::SubmissionFinished(Err(PartialFailure {
                payload,
                project_error: Some(ApiError::Timeout),
                rfq_error: None,
            })),
            now(),
        );
        assert_eq!(
            input,
            Input::Msg(Msg::SubmissionFinished {
                submitted: RfqSubmitted {
                    rfq_id: "RFQ_000001".to_string(),
                    project_id: "PRJ_1".to_string(),
                    status: "draft".to_string(),
                    deadline: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
                    vendor_requirements: vec![VendorRequirement {
                        vendor_id: "v-3".to_string(),
                        required_documents: BTreeSet::from(["vendor_quote".to_string()]),
                    }],
                    created_at: now(),
                },
                failures: vec![
                    "project not created (The server took too long to respond.)".to_string()
                ],
                now: now(),
            })
        );
    }

    #[test]
    fn submission_keeps_selected_documents_sorted() {
        let submission = RfqSubmission {
            rfq_id: "RFQ_000002".to_string(),
            description: "Structural steel".to_string(),
            deadline: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            project: ProjectRef::New {
                name: "Bridge".to_string(),
                description: String::new(),
            },
            vendor_requirements: vec![VendorRequirement {
                vendor_id: "v-1".to_string(),
                required_documents: BTreeSet::from([
                    "vendor_quote".to_string(),
                    "technical_offer".to_string(),
                ]),
            }],
            requested_at: now(),
        };
        let request = submission_request(submission);
        assert_eq!(request.requested_at, now());
        assert_eq!(
            request.project,
            ProjectSelection::New(NewProject {
                name: "Bridge".to_string(),
                description: String::new(),
            })
        );
        assert_eq!(
            request.vendor_requirements[0].required_documents,
            vec!["technical_offer".to_string(), "vendor_quote".to_string()]
        );
    }
}
