use std::sync::Arc;

use dashmap::DashMap;
use tandem_netproto::RoomCode;
use tracing::debug;

use super::Room;
use crate::error::RelayError;

/// Maps room codes to rooms, creating a room the first time its code is seen.
///
/// Rooms are never removed: a code resolves to the same [`Room`] for the lifetime of the
/// process, so a participant can leave and rejoin the same session.
#[derive(Debug, Default)]
pub struct RoomRouter {
    rooms: DashMap<RoomCode, Arc<Room>>,
}

impl RoomRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `room_id` to its room, creating it on first reference.
    ///
    /// A malformed id fails with `InvalidRequest` before any room is created.
    pub fn resolve(&self, room_id: &str) -> Result<Arc<Room>, RelayError> {
        let code = RoomCode::parse(room_id)?;
        let key = code.clone();
        let room = self.rooms.entry(code).or_insert_with(move || {
            debug!(room = %key, "Room created");
            Arc::new(Room::new(key))
        });
        Ok(Arc::clone(room.value()))
    }

    /// Look up an existing room without creating it.
    pub fn get(&self, room_id: &str) -> Option<Arc<Room>> {
        let code = RoomCode::parse(room_id).ok()?;
        self.rooms.get(&code).map(|room| Arc::clone(room.value()))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_idempotent() {
        let router = RoomRouter::new();
        let a = router.resolve("ABCD").unwrap();
        let b = router.resolve("ABCD").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(router.room_count(), 1);

        let other = router.resolve("WXYZ").unwrap();
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(router.room_count(), 2);
    }

    #[test]
    fn malformed_id_creates_nothing() {
        let router = RoomRouter::new();
        let too_long = "x".repeat(64);
        for raw in ["", "bad code", too_long.as_str()] {
            assert!(matches!(
                router.resolve(raw),
                Err(RelayError::InvalidRequest(_))
            ));
        }
        assert_eq!(router.room_count(), 0);
    }

    #[test]
    fn get_does_not_create() {
        let router = RoomRouter::new();
        assert!(router.get("ABCD").is_none());
        let room = router.resolve("ABCD").unwrap();
        assert!(Arc::ptr_eq(&router.get("ABCD").unwrap(), &room));
    }

    #[test]
    fn concurrent_resolves_agree() {
        let router = Arc::new(RoomRouter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let router = Arc::clone(&router);
                std::thread::spawn(move || router.resolve("RACE").unwrap())
            })
            .collect();
        let rooms: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(rooms.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(router.room_count(), 1);
    }
}
