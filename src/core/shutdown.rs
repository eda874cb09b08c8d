//! # What ends a `run_until_signal`.
//!
//! [`termination`] resolves once the process is asked to stop and reports why, so the
//! orchestrator can put the trigger on the bus before it starts unwinding components.
//!
//! | Platform | Triggers                                |
//! |----------|-----------------------------------------|
//! | unix     | `SIGINT`, `SIGTERM`, `SIGQUIT`, Ctrl-C  |
//! | other    | Ctrl-C                                  |
//!
//! A handler that cannot be installed resolves immediately as
//! [`Trigger::Unavailable`]: without it the process could never be stopped cleanly.

use crate::events::{Event, EventKind};

/// Why the wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Trigger {
    /// A termination signal arrived.
    Signal(&'static str),
    /// Signal handlers could not be installed.
    Unavailable(String),
}

impl Trigger {
    /// Bus event describing this trigger.
    pub(crate) fn event(&self) -> Event {
        match self {
            Trigger::Signal(name) => Event::new(EventKind::SignalReceived).with_reason(*name),
            Trigger::Unavailable(err) => {
                Event::new(EventKind::SignalUnavailable).with_reason(err.as_str())
            }
        }
    }
}

#[cfg(unix)]
pub(crate) async fn termination() -> Trigger {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    let install = |kind: SignalKind| -> Result<Signal, Trigger> {
        signal(kind).map_err(|e| Trigger::Unavailable(e.to_string()))
    };
    let handlers = install(SignalKind::interrupt()).and_then(|int| {
        Ok((
            int,
            install(SignalKind::terminate())?,
            install(SignalKind::quit())?,
        ))
    });
    let (mut sigint, mut sigterm, mut sigquit) = match handlers {
        Ok(handlers) => handlers,
        Err(trigger) => return trigger,
    };

    tokio::select! {
        res = tokio::signal::ctrl_c() => match res {
            Ok(()) => Trigger::Signal("SIGINT"),
            Err(e) => Trigger::Unavailable(e.to_string()),
        },
        _ = sigint.recv() => Trigger::Signal("SIGINT"),
        _ = sigterm.recv() => Trigger::Signal("SIGTERM"),
        _ = sigquit.recv() => Trigger::Signal("SIGQUIT"),
    }
}

#[cfg(not(unix))]
pub(crate) async fn termination() -> Trigger {
    match tokio::signal::ctrl_c().await {
        Ok(()) => Trigger::Signal("ctrl-c"),
        Err(e) => Trigger::Unavailable(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_map_to_events() {
        let ev = Trigger::Signal("SIGTERM").event();
        assert_eq!(ev.kind, EventKind::SignalReceived);
        assert_eq!(ev.reason.as_deref(), Some("SIGTERM"));

        let ev = Trigger::Unavailable("no reactor".into()).event();
        assert_eq!(ev.kind, EventKind::SignalUnavailable);
        assert_eq!(ev.reason.as_deref(), Some("no reactor"));
    }
}
