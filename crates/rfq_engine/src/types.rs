use std::fmt;
use std::path::PathBuf;

use crate::api::{ApiError, Page};
use crate::models::{
    AnalysisAvailability, AnalysisReport, DocumentRef, DocumentType, Project, Vendor,
};
use crate::submit::{PartialFailure, RfqCreated};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketChannel {
    Dashboard,
    Documents,
    Rfq,
}

impl fmt::Display for SocketChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketChannel::Dashboard => write!(f, "dashboard"),
            SocketChannel::Documents => write!(f, "documents"),
            SocketChannel::Rfq => write!(f, "rfq"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEventKind {
    StateChanged(SocketState),
    /// Raw text frame; parsing happens downstream.
    Frame(String),
    ReconnectScheduled { attempt: u32 },
    ReconnectsExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEvent {
    pub channel: SocketChannel,
    /// Identifies the [`SocketHandle`](crate::SocketHandle) that produced the
    /// event; a reopened channel gets a new one.
    pub generation: u64,
    pub kind: SocketEventKind,
}

/// Lookups and downloads the dashboard shell can ask the engine for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Projects,
    Vendors { page: u32, per_page: u32 },
    DocumentTypes,
    AnalysisAvailability { rfq_id: String },
    AnalysisReport { rfq_id: String },
    /// Saves the document under `dir`.
    Document { document: DocumentRef, dir: PathBuf },
    AnalysisPdf { rfq_id: String, dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Projects(Vec<Project>),
    Vendors(Page<Vendor>),
    DocumentTypes(Vec<DocumentType>),
    AnalysisAvailability(AnalysisAvailability),
    AnalysisReport(AnalysisReport),
    Saved(PathBuf),
}

#[derive(Debug, Clone)]
pub enum EngineEvent {
    Socket(SocketEvent),
    SubmissionFinished(Result<RfqCreated, PartialFailure>),
    Fetched {
        request: FetchRequest,
        result: Result<FetchResult, ApiError>,
    },
}
