pub mod dialogs;
pub mod events;
pub mod gateway;
pub mod log;
pub mod registry;
pub mod session;

pub use dialogs::{ResultDisplay, ResultProvenance, TranslationRequestState};
pub use events::{Notice, NoticeKind, SessionEvent};
pub use gateway::{Endpoint, Gateway, GatewayConfig, GatewayError, HttpGateway};
pub use registry::{Anchor, SourceInteractionState};
pub use session::{
    Dispatch, IgnoreReason, SessionController, SessionSnapshot, SubmissionPhase,
};
pub use shared::domain::{verification_color, Language, VerificationColor};
