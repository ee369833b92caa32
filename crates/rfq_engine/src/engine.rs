use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use rfq_logging::{rfq_error, rfq_warn};

use crate::api::{ApiClient, ApiError, PageRequest};
use crate::config::ClientConfig;
use crate::socket::{ChannelSocketSink, SocketHandle, SocketSink};
use crate::submit::{submit_rfq, SubmissionRequest};
use crate::{EngineEvent, FetchRequest, FetchResult, SocketChannel};

enum EngineCommand {
    OpenSocket { channel: SocketChannel, path: String },
    CloseSocket { channel: SocketChannel },
    SendSocket { channel: SocketChannel, message: String },
    Submit(SubmissionRequest),
    Fetch(FetchRequest),
}

/// Runs sockets and REST calls on a background tokio runtime.
///
/// Commands go in through the handle's methods; results come back as
/// [`EngineEvent`]s via [`EngineHandle::try_recv`]. The handle is `Sync`, so
/// one thread can poll events while another issues commands.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let api = Arc::new(ApiClient::new(config)?);
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    rfq_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let sink = Arc::new(ChannelSocketSink::new(event_tx.clone()));
            let mut sockets: HashMap<SocketChannel, SocketHandle> = HashMap::new();

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::OpenSocket { channel, path } => {
                        if let Some(previous) = sockets.remove(&channel) {
                            sink.retire(previous.generation());
                            previous.close();
                        }
                        let url = api.config().socket_url(&path);
                        let handle = SocketHandle::connect(
                            runtime.handle(),
                            channel,
                            url,
                            api.config().reconnect,
                            sink.clone() as Arc<dyn SocketSink>,
                        );
                        sockets.insert(channel, handle);
                    }
                    EngineCommand::CloseSocket { channel } => {
                        if let Some(handle) = sockets.remove(&channel) {
                            sink.retire(handle.generation());
                            handle.close();
                        }
                    }
                    EngineCommand::SendSocket { channel, message } => match sockets.get(&channel) {
                        Some(handle) => {
                            handle.send_message(&message);
                        }
                        None => rfq_warn!("No {} socket; dropping outbound message", channel),
                    },
                    EngineCommand::Submit(request) => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let outcome = submit_rfq(api.as_ref(), request).await;
                            let _ = event_tx.send(EngineEvent::SubmissionFinished(outcome));
                        });
                    }
                    EngineCommand::Fetch(request) => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = fetch(api.as_ref(), &request).await;
                            let _ = event_tx.send(EngineEvent::Fetched { request, result });
                        });
                    }
                }
            }

            for (_, handle) in sockets.drain() {
                handle.close();
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        })
    }

    /// Replaces any socket already open on `channel`.
    pub fn open_socket(&self, channel: SocketChannel, path: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::OpenSocket {
            channel,
            path: path.into(),
        });
    }

    pub fn close_socket(&self, channel: SocketChannel) {
        let _ = self.cmd_tx.send(EngineCommand::CloseSocket { channel });
    }

    pub fn send_socket(&self, channel: SocketChannel, message: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::SendSocket {
            channel,
            message: message.into(),
        });
    }

    pub fn submit(&self, request: SubmissionRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Submit(request));
    }

    pub fn fetch(&self, request: FetchRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Fetch(request));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        let rx = self.event_rx.lock().ok()?;
        rx.try_recv().ok()
    }
}

async fn fetch(api: &ApiClient, request: &FetchRequest) -> Result<FetchResult, ApiError> {
    match request {
        FetchRequest::Projects => api.list_projects().await.map(FetchResult::Projects),
        FetchRequest::Vendors { page, per_page } => {
            let page = PageRequest {
                page: *page,
                per_page: *per_page,
                search: None,
            };
            api.list_vendors(&page).await.map(FetchResult::Vendors)
        }
        FetchRequest::DocumentTypes => api
            .list_document_types()
            .await
            .map(FetchResult::DocumentTypes),
        FetchRequest::AnalysisAvailability { rfq_id } => api
            .analysis_availability(rfq_id)
            .await
            .map(FetchResult::AnalysisAvailability),
        FetchRequest::AnalysisReport { rfq_id } => api
            .analysis_report(rfq_id)
            .await
            .map(FetchResult::AnalysisReport),
        FetchRequest::Document { document, dir } => api
            .download_document(document, dir)
            .await
            .map(FetchResult::Saved),
        FetchRequest::AnalysisPdf { rfq_id, dir } => api
            .download_analysis_pdf(rfq_id, dir)
            .await
            .map(FetchResult::Saved),
    }
}
