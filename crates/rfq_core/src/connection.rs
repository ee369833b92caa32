/// One of the three real-time sockets the dashboard keeps open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Dashboard,
    Documents,
    Rfq,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Dashboard, Channel::Documents, Channel::Rfq];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Dashboard => "dashboard",
            Channel::Documents => "documents",
            Channel::Rfq => "rfq",
        }
    }

    /// Whether a successful open is announced with a toast.
    ///
    /// Only the long-lived dashboard and documents sockets announce; the
    /// RFQ-scoped socket reconnects silently whenever the subscription moves.
    pub fn announces_connection(self) -> bool {
        !matches!(self, Channel::Rfq)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Channel::Dashboard => 0,
            Channel::Documents => 1,
            Channel::Rfq => 2,
        }
    }
}

/// Endpoint path for a channel. The RFQ channel needs the subscribed id.
pub fn endpoint_path(channel: Channel, rfq_id: Option<&str>) -> String {
    match channel {
        Channel::Dashboard => "/ws/dashboard".to_string(),
        Channel::Documents => "/ws/documents".to_string(),
        Channel::Rfq => match rfq_id {
            Some(id) if !id.is_empty() => format!("/ws/rfq/{id}"),
            _ => String::new(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Connecting,
    Connected,
    #[default]
    Disconnected,
    Error,
}

impl ConnectionState {
    fn priority(self) -> u8 {
        match self {
            ConnectionState::Connected => 3,
            ConnectionState::Connecting => 2,
            ConnectionState::Error => 1,
            ConnectionState::Disconnected => 0,
        }
    }
}

/// Collapses several socket states into one: connected > connecting > error >
/// disconnected. A single connected socket masks errors on the others.
pub fn aggregate_state<I>(states: I) -> ConnectionState
where
    I: IntoIterator<Item = ConnectionState>,
{
    states
        .into_iter()
        .max_by_key(|state| state.priority())
        .unwrap_or_default()
}
