//! Ports implemented by the infrastructure crates

mod repositories;

pub use repositories::{
    CandidateProvider, MatchRepository, MembershipUpdate, RepoResult, RoomRepository,
    SwipeRepository,
};
