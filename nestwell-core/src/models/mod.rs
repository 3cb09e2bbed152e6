mod appointment;
mod conversation;
mod dashboard;
mod journey;
mod ledger;
mod matching;
mod participant;
mod screening;
mod task;

pub use appointment::*;
pub use conversation::*;
pub use dashboard::*;
pub use journey::*;
pub use ledger::*;
pub use matching::*;
pub use participant::*;
pub use screening::*;
pub use task::*;
