pub mod attendance;
pub mod regularization_request;
pub mod user;

pub use attendance::{AttendanceRepository, PgAttendanceCorrections};
pub use regularization_request::PgRegularizationStore;
pub use user::UserRepository;
