pub mod backup;
pub mod calc;
pub mod db;
pub mod error;
pub mod form;
pub mod ipc;
pub mod store;

pub use calc::{LetterGrade, StudentSummary};
pub use error::{GradeError, GradeResult};
pub use store::{GradeRecord, GradeStore};
