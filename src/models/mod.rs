// Models module - Database entity representations

pub mod attendance;
pub mod branch;
pub mod card;
pub mod device;
pub mod event;
pub mod member;
pub mod staff;
pub mod transaction;
pub mod transfer;

pub use attendance::AttendanceRecord;
pub use branch::Branch;
pub use card::MemberCard;
pub use device::CardDevice;
pub use event::AttendanceEvent;
pub use member::Member;
pub use staff::StaffAccount;
pub use transaction::FinancialTransaction;
pub use transfer::TransferRequest;
