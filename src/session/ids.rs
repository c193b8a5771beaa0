//! Session ID and consistency token generation.

use uuid::Uuid;

use super::types::{ConsistencyToken, SessionId};

/// Source of fresh session IDs and consistency tokens.
pub trait IdGenerator: Send + Sync + 'static {
    fn session_id(&self) -> SessionId;
    fn token(&self) -> ConsistencyToken;
}

/// Random UUID v4 values for both IDs and tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn session_id(&self) -> SessionId {
        SessionId::new(Uuid::new_v4().to_string())
    }

    fn token(&self) -> ConsistencyToken {
        ConsistencyToken::new(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_generator_yields_distinct_values() {
        let generator = UuidGenerator;
        let ids: HashSet<_> = (0..256).map(|_| generator.session_id()).collect();
        assert_eq!(ids.len(), 256);

        let a = generator.token();
        let b = generator.token();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }
}
