use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use stockroom_core::{ProductId, ReservationId};
use stockroom_inventory::{Reservation, ReservationStatus};

use super::r#trait::{Claim, RegistryError, ReservationRegistry};

/// In-memory reservation registry backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryReservationRegistry {
    entries: DashMap<ReservationId, Reservation>,
}

impl InMemoryReservationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of reservations that still hold units.
    pub fn active_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status() == ReservationStatus::Active)
            .count()
    }
}

impl ReservationRegistry for InMemoryReservationRegistry {
    fn claim(&self, reservation: Reservation) -> Result<Claim, RegistryError> {
        match self.entries.entry(reservation.id().clone()) {
            Entry::Vacant(slot) => {
                slot.insert(reservation);
                Ok(Claim::Claimed)
            }
            Entry::Occupied(existing) => Ok(Claim::Existing(existing.get().clone())),
        }
    }

    fn activate(&self, id: &ReservationId, at: DateTime<Utc>) -> Result<(), RegistryError> {
        let mut entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        entry.activate(at);
        Ok(())
    }

    fn abandon(&self, id: &ReservationId) -> Result<(), RegistryError> {
        self.entries
            .remove_if(id, |_, r| r.status() == ReservationStatus::Pending);
        Ok(())
    }

    fn begin_release(
        &self,
        id: &ReservationId,
        product_id: &ProductId,
        quantity: u64,
        at: DateTime<Utc>,
    ) -> Result<Reservation, RegistryError> {
        let mut entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        entry
            .release(product_id, quantity, at)
            .map_err(RegistryError::Rejected)?;
        Ok(entry.clone())
    }

    fn restore(&self, id: &ReservationId, quantity: u64, at: DateTime<Utc>) -> Result<(), RegistryError> {
        let mut entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        entry.restore(quantity, at);
        Ok(())
    }

    fn get(&self, id: &ReservationId) -> Result<Option<Reservation>, RegistryError> {
        Ok(self.entries.get(id).map(|e| e.clone()))
    }
}
