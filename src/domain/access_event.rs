//! Access event model for asynchronous access counting.

/// One successful resolution of a short code.
///
/// Sent from the redirect handler to the background access worker so the
/// redirect never waits on the counter update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub short_code: String,
}

impl AccessEvent {
    pub fn new(short_code: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_event_creation() {
        let event = AccessEvent::new("abc123");
        assert_eq!(event.short_code, "abc123");
    }
}
