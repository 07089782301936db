use std::fmt;

/// Lifecycle status shared by `GroupInfo` and `ChainNodeInfo` (spec §3).
///
/// `Creating`, `Starting`, `Stopping`, `Deleting`, and `Recovering` are
/// *recorded intents*: the previous transition is durable, but the
/// fleet-side effect may or may not have completed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Creating,
    Created,
    Starting,
    Started,
    Stopping,
    Stopped,
    Deleting,
    Deleted,
    Recovering,
}

impl Status {
    /// Recorded-intent statuses are durable markers of in-flight work that
    /// survive a crash; see `Manager::reconcile`.
    pub fn is_recorded_intent(self) -> bool {
        matches!(
            self,
            Status::Creating | Status::Starting | Status::Stopping | Status::Deleting | Status::Recovering
        )
    }

    fn as_str(self) -> &'static str {
        match self {
            Status::Creating => "creating",
            Status::Created => "created",
            Status::Starting => "starting",
            Status::Started => "started",
            Status::Stopping => "stopping",
            Status::Stopped => "stopped",
            Status::Deleting => "deleting",
            Status::Deleted => "deleted",
            Status::Recovering => "recovering",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creating" => Ok(Status::Creating),
            "created" => Ok(Status::Created),
            "starting" => Ok(Status::Starting),
            "started" => Ok(Status::Started),
            "stopping" => Ok(Status::Stopping),
            "stopped" => Ok(Status::Stopped),
            "deleting" => Ok(Status::Deleting),
            "deleted" => Ok(Status::Deleted),
            "recovering" => Ok(Status::Recovering),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("cannot parse {0:?} as a lifecycle status")]
pub struct StatusParseError(String);
