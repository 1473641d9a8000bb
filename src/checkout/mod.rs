//! Client-side checkout flow: a typed state machine that mints an order,
//! hands it to the gateway's checkout UI, and treats the server's
//! verification response as the only source of truth for success.

pub mod api;
pub mod orchestrator;
pub mod script;

pub use api::PaymentsApi;
pub use orchestrator::{
    CheckoutOrchestrator, CheckoutPhase, GatewayCallback, GatewayCheckout, GatewayOutcome,
    PaymentAttempt,
};
pub use script::{checkout_script_gate, LoadScript, ScriptGate, ScriptHandle};

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("checkout script failed to load: {0}")]
    ScriptLoad(String),

    /// Server refused to mint the order; carries the sanitized message.
    #[error("{0}")]
    OrderRejected(String),

    /// Verification round trip failed; carries the sanitized message.
    #[error("{0}")]
    VerificationFailed(String),

    #[error("could not reach the server")]
    Network,

    #[error("action not available in the {0:?} phase")]
    InvalidPhase(orchestrator::CheckoutPhase),
}
