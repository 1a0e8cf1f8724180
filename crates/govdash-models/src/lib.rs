pub mod mode;
pub mod proposal;

pub use mode::{RuntimeMode, RUNTIME_MODE_ENV};
pub use proposal::{
    sort_newest_first, ModelError, Proposal, ProposalFilter, ProposalStatus,
    DEFAULT_PROPOSAL_TITLE,
};
