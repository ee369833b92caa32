use chrono::{DateTime, Utc};

use crate::realtime::RealtimeState;
use crate::view_model::{AppViewModel, ChannelStatus, WizardView};
use crate::wizard::{RfqSubmitted, WizardState};
use crate::Channel;

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(crate) wizard: WizardState,
    pub(crate) realtime: RealtimeState,
    pub(crate) last_submission: Option<RfqSubmitted>,
    dirty: bool,
}

impl AppState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            wizard: WizardState::new(now),
            realtime: RealtimeState::new(),
            last_submission: None,
            dirty: false,
        }
    }

    pub fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    pub fn realtime(&self) -> &RealtimeState {
        &self.realtime
    }

    /// Most recent finished submission, including partial failures.
    pub fn last_submission(&self) -> Option<&RfqSubmitted> {
        self.last_submission.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let wizard = &self.wizard;
        let errors = wizard.errors();
        AppViewModel {
            connection_state: self.realtime.connection_state(),
            is_connected: self.realtime.is_connected(),
            channels: Channel::ALL
                .iter()
                .map(|&channel| ChannelStatus {
                    channel,
                    state: self.realtime.connection(channel),
                })
                .collect(),
            processing: self.realtime.document_processing(),
            rfq_status: self
                .realtime
                .subscribed_rfq()
                .map(|rfq_id| self.realtime.rfq_status(rfq_id)),
            system: self.realtime.system_status(),
            wizard: WizardView {
                is_open: wizard.is_open(),
                step: wizard.step(),
                step_number: wizard.step().number(),
                can_go_back: wizard.step().previous().is_some() && !wizard.is_submitting(),
                is_submitting: wizard.is_submitting(),
                rfq_id: wizard.draft().rfq_id.clone(),
                requirement_count: wizard.draft().vendor_requirements.len(),
                errors: errors
                    .iter()
                    .map(|(field, message)| (field, message.to_string()))
                    .collect(),
            },
            last_submission: self.last_submission.clone(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
