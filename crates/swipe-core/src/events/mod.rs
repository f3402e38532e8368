//! Domain events

mod domain_event;

pub use domain_event::{
    DomainEvent, MatchCreatedEvent, MatchViewedEvent, MemberJoinedEvent, MemberLeftEvent,
    RoomCreatedEvent, RoomDeactivatedEvent, SwipeRecordedEvent,
};
