use rfq_logging::{rfq_debug, rfq_info, rfq_warn};

use crate::connection::endpoint_path;
use crate::event::{parse_frame, InboundEvent};
use crate::toast::{connection_lost, connection_opened, toast_for_event};
use crate::{AppState, Channel, ConnectionState, Effect, Msg, Toast};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut changed = true;
    let effects = match msg {
        Msg::AppStarted => vec![
            Effect::OpenSocket {
                channel: Channel::Dashboard,
                path: endpoint_path(Channel::Dashboard, None),
            },
            Effect::OpenSocket {
                channel: Channel::Documents,
                path: endpoint_path(Channel::Documents, None),
            },
        ],
        Msg::WizardOpened => {
            state.wizard.open();
            Vec::new()
        }
        Msg::WizardClosed { now } => {
            state.wizard.reset(now);
            Vec::new()
        }
        Msg::RfqIdChanged(rfq_id) => {
            state.wizard.set_rfq_id(rfq_id);
            Vec::new()
        }
        Msg::DescriptionChanged(description) => {
            state.wizard.set_description(description);
            Vec::new()
        }
        Msg::DeadlineChanged(deadline) => {
            state.wizard.set_deadline(deadline);
            Vec::new()
        }
        Msg::ProjectModeChanged(mode) => {
            state.wizard.set_project_mode(mode);
            Vec::new()
        }
        Msg::ProjectSelected(project_id) => {
            state.wizard.select_project(project_id);
            Vec::new()
        }
        Msg::NewProjectNameChanged(name) => {
            state.wizard.set_new_project_name(name);
            Vec::new()
        }
        Msg::NewProjectDescriptionChanged(description) => {
            state.wizard.set_new_project_description(description);
            Vec::new()
        }
        Msg::VendorRequirementAdded => {
            state.wizard.add_requirement();
            Vec::new()
        }
        Msg::VendorRequirementRemoved { index } => {
            changed = state.wizard.remove_requirement(index);
            Vec::new()
        }
        Msg::RequirementVendorSelected { index, vendor_id } => {
            changed = state.wizard.select_requirement_vendor(index, vendor_id);
            Vec::new()
        }
        Msg::RequirementDocumentToggled {
            index,
            document_type,
        } => {
            changed = state
                .wizard
                .toggle_requirement_document(index, document_type);
            Vec::new()
        }
        Msg::NextClicked { today } => {
            // Errors are refreshed either way, so the view always changes.
            state.wizard.go_next(today);
            Vec::new()
        }
        Msg::BackClicked => {
            changed = state.wizard.go_back();
            Vec::new()
        }
        Msg::SubmitClicked { now } => match state.wizard.begin_submit(now) {
            Some(submission) => {
                rfq_info!("Submitting {}", submission.rfq_id);
                vec![Effect::SubmitRfq(submission)]
            }
            None => Vec::new(),
        },
        Msg::SubmissionFinished {
            submitted,
            failures,
            now,
        } => {
            let rfq_id = &submitted.rfq_id;
            let toast = if failures.is_empty() {
                Toast::success(
                    "RFQ created",
                    format!(
                        "{rfq_id} was created successfully under project {}.",
                        submitted.project_id
                    ),
                )
            } else {
                rfq_warn!("{} submitted with backend failures: {:?}", rfq_id, failures);
                Toast::warning(
                    "RFQ saved with warnings",
                    format!("{rfq_id}: {}", failures.join("; ")),
                )
            };
            state.last_submission = Some(submitted);
            // A wizard closed mid-flight was already reset and may hold a new draft.
            if state.wizard.is_submitting() {
                state.wizard.reset(now);
            }
            vec![Effect::ShowToast(toast)]
        }
        Msg::ConnectionChanged {
            channel,
            state: connection,
        } => {
            changed = state.realtime.connection(channel) != connection;
            state.realtime.set_connection(channel, connection);
            if connection == ConnectionState::Connected && channel.announces_connection() {
                vec![Effect::ShowToast(connection_opened(channel))]
            } else {
                Vec::new()
            }
        }
        Msg::FrameReceived { channel, text } => match parse_frame(&text) {
            Ok(frame) => {
                let event = InboundEvent::from_frame(&frame);
                match &event {
                    InboundEvent::ConnectionEstablished { message } => {
                        rfq_info!(
                            "{} socket established: {}",
                            channel.label(),
                            message.as_deref().unwrap_or("")
                        );
                    }
                    InboundEvent::Unknown { event_type } => {
                        rfq_debug!(
                            "Ignoring unknown event type {:?} on {} socket",
                            event_type,
                            channel.label()
                        );
                    }
                    _ => {}
                }
                changed = state.realtime.record(&event);
                toast_for_event(&event)
                    .map(Effect::ShowToast)
                    .into_iter()
                    .collect()
            }
            Err(err) => {
                rfq_warn!(
                    "Dropping malformed frame on {} socket: {}",
                    channel.label(),
                    err
                );
                changed = false;
                Vec::new()
            }
        },
        Msg::ReconnectScheduled { channel, attempt } => {
            rfq_info!(
                "{} socket reconnect attempt {} scheduled",
                channel.label(),
                attempt
            );
            changed = false;
            Vec::new()
        }
        Msg::ReconnectsExhausted { channel } => {
            state.realtime.set_connection(channel, ConnectionState::Error);
            vec![Effect::ShowToast(connection_lost(channel))]
        }
        Msg::SubscribeToRfq(rfq_id) => {
            let rfq_id = rfq_id.trim().to_string();
            let change = if rfq_id.is_empty() {
                None
            } else {
                state.realtime.subscribe_to_rfq(&rfq_id)
            };
            match change {
                Some(previous) => {
                    let mut effects = Vec::with_capacity(2);
                    if previous.is_some() {
                        effects.push(Effect::CloseSocket {
                            channel: Channel::Rfq,
                        });
                    }
                    effects.push(Effect::OpenSocket {
                        channel: Channel::Rfq,
                        path: endpoint_path(Channel::Rfq, Some(&rfq_id)),
                    });
                    effects
                }
                None => {
                    changed = false;
                    Vec::new()
                }
            }
        }
        Msg::UnsubscribeFromRfq => match state.realtime.unsubscribe_from_rfq() {
            Some(_) => vec![Effect::CloseSocket {
                channel: Channel::Rfq,
            }],
            None => {
                changed = false;
                Vec::new()
            }
        },
        Msg::SendRequested { channel, message } => {
            changed = false;
            vec![Effect::SendSocket { channel, message }]
        }
        Msg::Tick | Msg::NoOp => {
            changed = false;
            Vec::new()
        }
    };

    if changed {
        state.mark_dirty();
    }
    (state, effects)
}
