/// Per-entry state of the metadata-write operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WriteStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Session-wide progress of an operation spanning all entries
/// (AI annotation or batch write)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AggregateStatus {
    #[default]
    Idle,
    Loading(String),
    Success(String),
    Error(String),
}

impl AggregateStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, AggregateStatus::Loading(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            AggregateStatus::Idle => None,
            AggregateStatus::Loading(msg)
            | AggregateStatus::Success(msg)
            | AggregateStatus::Error(msg) => Some(msg),
        }
    }
}
