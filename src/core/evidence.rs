//! Evidence providers, consulted in priority order.
//!
//! Each provider answers one question: given a reservation and which end of
//! the stay we are looking at, does this source know when it happened?

use crate::core::presence_index::PresenceIndex;
use crate::core::segmenter::CabinVisitTripGroup;
use crate::models::{CheckEvent, CheckKind, EvidenceSource, PresenceStatus, ReferenceZone, Reservation};

pub trait EvidenceProvider {
    fn source(&self) -> EvidenceSource;

    fn evidence(&self, reservation: &Reservation, kind: CheckKind) -> Option<CheckEvent>;
}

/// Arrival / departure of a segmented cabin visit.
pub struct VehicleTripEvidence<'a> {
    groups: &'a [CabinVisitTripGroup],
    zone: ReferenceZone,
}

impl<'a> VehicleTripEvidence<'a> {
    pub fn new(groups: &'a [CabinVisitTripGroup], zone: ReferenceZone) -> Self {
        Self { groups, zone }
    }
}

impl EvidenceProvider for VehicleTripEvidence<'_> {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::VehicleTrip
    }

    fn evidence(&self, reservation: &Reservation, kind: CheckKind) -> Option<CheckEvent> {
        let date = reservation.anchor_date(kind, self.zone);

        let group = match kind {
            CheckKind::In => self.groups.iter().find(|g| g.has_arrived_at(date))?,
            CheckKind::Out => self.groups.iter().find(|g| g.has_departed_at(date))?,
        };

        let (time, id) = match kind {
            CheckKind::In => (group.arrival_instant()?, group.to_cabin_trip_id()?),
            CheckKind::Out => (group.departure_instant()?, group.from_cabin_trip_id()?),
        };
        Some(CheckEvent::new(time, self.source(), id))
    }
}

/// First matching sensor reading on the anchor date.
pub struct PresenceEvidence<'a> {
    index: &'a PresenceIndex,
    zone: ReferenceZone,
}

impl<'a> PresenceEvidence<'a> {
    pub fn new(index: &'a PresenceIndex, zone: ReferenceZone) -> Self {
        Self { index, zone }
    }
}

impl EvidenceProvider for PresenceEvidence<'_> {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::PresenceSensor
    }

    fn evidence(&self, reservation: &Reservation, kind: CheckKind) -> Option<CheckEvent> {
        let date = reservation.anchor_date(kind, self.zone);
        let status = match kind {
            CheckKind::In => PresenceStatus::CheckedIn,
            CheckKind::Out => PresenceStatus::CheckedOut,
        };

        self.index
            .first_with_status(date, status)
            .map(|r| CheckEvent::new(r.instant, self.source(), r.id.clone()))
    }
}

/// The reservation's own bounds. Always answers.
pub struct CalendarEvidence;

impl EvidenceProvider for CalendarEvidence {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::CalendarReservation
    }

    fn evidence(&self, reservation: &Reservation, kind: CheckKind) -> Option<CheckEvent> {
        Some(CheckEvent::new(
            reservation.bound(kind),
            self.source(),
            reservation.id.clone(),
        ))
    }
}
