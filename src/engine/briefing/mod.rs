pub mod assembler;
pub mod request;

pub use assembler::{Briefing, BriefingAssembler};
pub use request::BriefingRequest;
