//! Trip phase segmentation.
//!
//! Splits the chronological trip log into cabin visits. Each visit has up to
//! three phases: the drive out (`to_cabin`), local trips around the cabin
//! (`at_cabin`) and the drive back (`from_cabin`). Errand stops on either
//! drive stay in the same phase as long as the chain does not cross a
//! cabin/non-cabin boundary. Any trip that reaches the cabin after a group
//! has started its drive back opens the next visit.

use crate::models::{ReferenceZone, VehicleTrip};
use chrono::{DateTime, Days, NaiveDate, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinVisitTripGroup {
    pub to_cabin: Vec<VehicleTrip>,
    pub at_cabin: Vec<VehicleTrip>,
    pub from_cabin: Vec<VehicleTrip>,
    zone: ReferenceZone,
}

impl CabinVisitTripGroup {
    fn new(zone: ReferenceZone) -> Self {
        Self {
            to_cabin: Vec::new(),
            at_cabin: Vec::new(),
            from_cabin: Vec::new(),
            zone,
        }
    }

    /// End of the last trip of the drive out.
    pub fn arrival_instant(&self) -> Option<DateTime<Utc>> {
        self.to_cabin.last().map(|t| t.end)
    }

    /// Start of the first trip of the drive back.
    pub fn departure_instant(&self) -> Option<DateTime<Utc>> {
        self.from_cabin.first().map(|t| t.start)
    }

    pub fn arrival_date(&self) -> Option<NaiveDate> {
        self.arrival_instant().map(|i| self.zone.date_of(i))
    }

    pub fn departure_date(&self) -> Option<NaiveDate> {
        self.departure_instant().map(|i| self.zone.date_of(i))
    }

    pub fn to_cabin_trip_id(&self) -> Option<String> {
        phase_id(&self.to_cabin)
    }

    pub fn at_cabin_trip_id(&self) -> Option<String> {
        phase_id(&self.at_cabin)
    }

    pub fn from_cabin_trip_id(&self) -> Option<String> {
        phase_id(&self.from_cabin)
    }

    /// Arrived on `date`, or after midnight on the day that follows it.
    pub fn has_arrived_at(&self, date: NaiveDate) -> bool {
        let Some(arrived) = self.arrival_date() else {
            return false;
        };
        arrived == date || date.checked_add_days(Days::new(1)) == Some(arrived)
    }

    /// Left on exactly `date`.
    pub fn has_departed_at(&self, date: NaiveDate) -> bool {
        self.departure_date() == Some(date)
    }

    pub fn is_empty(&self) -> bool {
        self.to_cabin.is_empty() && self.at_cabin.is_empty() && self.from_cabin.is_empty()
    }

    /// The drive back has reached home; later away trips are unrelated errands.
    fn is_back_home(&self) -> bool {
        self.from_cabin
            .last()
            .is_some_and(|t| t.end_location.is_home())
    }
}

/// Provenance id of a phase: the single trip id, or `first-last` for several.
fn phase_id(trips: &[VehicleTrip]) -> Option<String> {
    match trips {
        [] => None,
        [only] => Some(only.id.clone()),
        [first, .., last] => Some(format!("{}-{}", first.id, last.id)),
    }
}

/// Partition `trips` into cabin visits, in chronological order.
pub fn segment(trips: &[VehicleTrip], zone: ReferenceZone) -> Vec<CabinVisitTripGroup> {
    let mut sorted = trips.to_vec();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    let mut groups = Vec::new();
    let mut current: Option<CabinVisitTripGroup> = None;
    // Away trips since the last return home, not yet attributed to a phase.
    let mut pending: Vec<VehicleTrip> = Vec::new();

    for trip in sorted {
        if trip.is_away() {
            match current.as_mut() {
                Some(g) if !g.from_cabin.is_empty() && !g.is_back_home() => {
                    g.from_cabin.push(trip);
                }
                _ => {
                    let ends_home = trip.end_location.is_home();
                    pending.push(trip);
                    if ends_home {
                        pending.clear();
                    }
                }
            }
        } else if trip.is_arriving() {
            // Only a group still on its drive out can take another arriving trip.
            let starts_new = current
                .as_ref()
                .is_none_or(|g| !g.from_cabin.is_empty() || !g.at_cabin.is_empty());
            if starts_new {
                if let Some(done) = current.take() {
                    groups.push(done);
                }
                current = Some(CabinVisitTripGroup::new(zone));
            }
            if let Some(g) = current.as_mut() {
                g.to_cabin.append(&mut pending);
                g.to_cabin.push(trip);
            }
        } else if trip.is_at_cabin() {
            pending.clear();
            match current.as_mut() {
                Some(g) if g.from_cabin.is_empty() => g.at_cabin.push(trip),
                _ => {
                    if let Some(done) = current.take() {
                        groups.push(done);
                    }
                    let mut g = CabinVisitTripGroup::new(zone);
                    g.at_cabin.push(trip);
                    current = Some(g);
                }
            }
        } else {
            // leaving
            pending.clear();
            match current.as_mut() {
                Some(g) if !g.is_back_home() => g.from_cabin.push(trip),
                _ => {
                    if let Some(done) = current.take() {
                        groups.push(done);
                    }
                    let mut g = CabinVisitTripGroup::new(zone);
                    g.from_cabin.push(trip);
                    current = Some(g);
                }
            }
        }
    }

    if let Some(done) = current.take() {
        groups.push(done);
    }

    groups.retain(|g| !g.is_empty());
    groups
}
