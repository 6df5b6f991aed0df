pub mod audit;
pub mod check_event;
pub mod checkpoint;
pub mod location;
pub mod presence;
pub mod reservation;
pub mod vehicle_trip;
pub mod zone;

pub use audit::AuditInfo;
pub use check_event::{CheckEvent, CheckKind, EvidenceSource};
pub use checkpoint::SyncCheckpoint;
pub use location::LocationClass;
pub use presence::{PresenceReading, PresenceStatus};
pub use reservation::Reservation;
pub use vehicle_trip::VehicleTrip;
pub use zone::ReferenceZone;
