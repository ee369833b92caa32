use std::collections::BTreeSet;

use crate::bounded::BoundedLog;
use crate::connection::{aggregate_state, Channel, ConnectionState};
use crate::event::{DocumentStatus, DocumentUpdate, InboundEvent, RfqUpdate, SystemUpdate};

pub const DOCUMENT_UPDATE_CAPACITY: usize = 100;
pub const RFQ_UPDATE_CAPACITY: usize = 50;
pub const SYSTEM_UPDATE_CAPACITY: usize = 50;
pub const RECENT_DOCUMENT_UPDATES: usize = 10;
pub const RECENT_SYSTEM_UPDATES: usize = 5;

/// Merged read model over the dashboard, documents and RFQ sockets.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeState {
    connections: [ConnectionState; 3],
    document_updates: BoundedLog<DocumentUpdate>,
    rfq_updates: BoundedLog<RfqUpdate>,
    system_updates: BoundedLog<SystemUpdate>,
    processing: BTreeSet<String>,
    subscribed_rfq: Option<String>,
}

impl Default for RealtimeState {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeState {
    pub fn new() -> Self {
        Self {
            connections: [ConnectionState::Disconnected; 3],
            document_updates: BoundedLog::with_capacity(DOCUMENT_UPDATE_CAPACITY),
            rfq_updates: BoundedLog::with_capacity(RFQ_UPDATE_CAPACITY),
            system_updates: BoundedLog::with_capacity(SYSTEM_UPDATE_CAPACITY),
            processing: BTreeSet::new(),
            subscribed_rfq: None,
        }
    }

    pub fn connection(&self, channel: Channel) -> ConnectionState {
        self.connections[channel.index()]
    }

    pub fn set_connection(&mut self, channel: Channel, state: ConnectionState) {
        self.connections[channel.index()] = state;
    }

    pub fn is_connected(&self) -> bool {
        self.connections.contains(&ConnectionState::Connected)
    }

    pub fn connection_state(&self) -> ConnectionState {
        aggregate_state(self.connections)
    }

    pub fn subscribed_rfq(&self) -> Option<&str> {
        self.subscribed_rfq.as_deref()
    }

    /// Returns the previous subscription when the tracked RFQ changes, or
    /// `None` when `rfq_id` was already tracked.
    pub fn subscribe_to_rfq(&mut self, rfq_id: &str) -> Option<Option<String>> {
        if self.subscribed_rfq.as_deref() == Some(rfq_id) {
            return None;
        }
        Some(self.subscribed_rfq.replace(rfq_id.to_string()))
    }

    pub fn unsubscribe_from_rfq(&mut self) -> Option<String> {
        let previous = self.subscribed_rfq.take();
        if previous.is_some() {
            self.connections[Channel::Rfq.index()] = ConnectionState::Disconnected;
        }
        previous
    }

    /// Folds a classified event into the lists; returns false when the event
    /// carries nothing to record.
    pub fn record(&mut self, event: &InboundEvent) -> bool {
        match event {
            InboundEvent::Document(update) => {
                if let Some(id) = &update.document_id {
                    match update.status {
                        DocumentStatus::Started => {
                            self.processing.insert(id.clone());
                        }
                        DocumentStatus::Completed | DocumentStatus::Failed => {
                            self.processing.remove(id);
                        }
                    }
                }
                self.document_updates.push(update.clone());
                true
            }
            InboundEvent::Rfq(update) => {
                self.rfq_updates.push(update.clone());
                true
            }
            InboundEvent::System(update) => {
                self.system_updates.push(update.clone());
                true
            }
            InboundEvent::ConnectionEstablished { .. } | InboundEvent::Unknown { .. } => false,
        }
    }

    pub fn is_processing(&self, document_id: &str) -> bool {
        self.processing.contains(document_id)
    }

    pub fn document_updates(&self) -> impl Iterator<Item = &DocumentUpdate> + '_ {
        self.document_updates.iter()
    }

    pub fn rfq_updates(&self) -> impl Iterator<Item = &RfqUpdate> + '_ {
        self.rfq_updates.iter()
    }

    pub fn system_updates(&self) -> impl Iterator<Item = &SystemUpdate> + '_ {
        self.system_updates.iter()
    }

    pub fn document_processing(&self) -> DocumentProcessingView {
        DocumentProcessingView {
            is_processing: !self.processing.is_empty(),
            processing_ids: self.processing.iter().cloned().collect(),
            recent_updates: self.document_updates.recent(RECENT_DOCUMENT_UPDATES),
        }
    }

    pub fn rfq_status(&self, rfq_id: &str) -> RfqStatusView {
        let updates: Vec<RfqUpdate> = self
            .rfq_updates
            .iter()
            .filter(|update| update.rfq_id.as_deref() == Some(rfq_id))
            .cloned()
            .collect();
        RfqStatusView {
            rfq_id: rfq_id.to_string(),
            latest: updates.first().cloned(),
            updates,
        }
    }

    pub fn system_status(&self) -> SystemStatusView {
        SystemStatusView {
            recent: self.system_updates.recent(RECENT_SYSTEM_UPDATES),
            last_rfq_email: self
                .system_updates
                .iter()
                .find(|update| update.is_rfq_email())
                .cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentProcessingView {
    pub is_processing: bool,
    pub processing_ids: Vec<String>,
    pub recent_updates: Vec<DocumentUpdate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RfqStatusView {
    pub rfq_id: String,
    /// Newest first.
    pub updates: Vec<RfqUpdate>,
    pub latest: Option<RfqUpdate>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SystemStatusView {
    pub recent: Vec<SystemUpdate>,
    pub last_rfq_email: Option<SystemUpdate>,
}
