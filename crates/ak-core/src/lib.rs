pub mod email;
pub mod error;
pub mod masking;
pub mod models;
pub mod phone;

pub use email::validate_email;
pub use error::{CoreError, CoreResult};
pub use masking::mask_email;
pub use models::identity::Identity;
pub use models::profile::Profile;
pub use models::profile_update::ProfileUpdate;
pub use models::session::Session;
pub use models::session_change::SessionChange;
pub use models::session_event_kind::SessionEventKind;
pub use phone::{count_digits, format_phone};
