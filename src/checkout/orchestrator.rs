use futures_util::future::BoxFuture;

use crate::models::payments::CreateOrderResponse;
use crate::models::plans::{BillingPeriod, PlanTier};

use super::api::PaymentsApi;
use super::script::{LoadScript, ScriptGate};
use super::CheckoutError;

/// Where a checkout attempt currently stands. The pay action is only
/// available in `ScriptReady`; everything between `OrderRequested` and the
/// terminal phases keeps it disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    ScriptLoading,
    ScriptReady,
    OrderRequested,
    GatewayOpen,
    Verifying,
    Succeeded,
    Failed,
}

/// What the gateway's checkout UI reported back. `Completed` carries the
/// identifiers and signature the server will verify; it is a display hint
/// until then, never a state transition trigger on its own.
#[derive(Debug, Clone)]
pub enum GatewayOutcome {
    Completed(GatewayCallback),
    Dismissed,
}

#[derive(Debug, Clone)]
pub struct GatewayCallback {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// The gateway's native checkout UI. Opening it suspends the flow until
/// the user completes or dismisses it; there is no other way out.
pub trait GatewayCheckout {
    fn open(&self, order: &CreateOrderResponse) -> BoxFuture<'_, GatewayOutcome>;
}

/// Result of a completed `pay` call. Cancellation is a normal outcome, not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAttempt {
    Succeeded,
    Cancelled,
}

pub struct CheckoutOrchestrator<'gate, G> {
    api: PaymentsApi,
    gateway: G,
    gate: &'gate ScriptGate,
    phase: CheckoutPhase,
    last_error: Option<String>,
}

impl<'gate, G: GatewayCheckout> CheckoutOrchestrator<'gate, G> {
    pub fn new(api: PaymentsApi, gateway: G, gate: &'gate ScriptGate) -> Self {
        Self {
            api,
            gateway,
            gate,
            phase: CheckoutPhase::Idle,
            last_error: None,
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// The sanitized message behind the current `Failed` phase, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Idle → ScriptReady, loading the gateway script through the shared
    /// gate. A script already loaded by an earlier mount skips the load.
    pub async fn ensure_script<L: LoadScript>(&mut self, loader: &L) -> Result<(), CheckoutError> {
        if self.phase != CheckoutPhase::Idle {
            return Err(CheckoutError::InvalidPhase(self.phase));
        }

        if self.gate.is_loaded() {
            self.phase = CheckoutPhase::ScriptReady;
            return Ok(());
        }

        self.phase = CheckoutPhase::ScriptLoading;
        match self.gate.ensure(loader).await {
            Ok(_) => {
                self.phase = CheckoutPhase::ScriptReady;
                Ok(())
            }
            Err(error) => {
                self.fail(error.to_string());
                Err(error)
            }
        }
    }

    /// Run one checkout attempt: mint the order, hand it to the gateway's
    /// UI, and on completion verify server-side before reporting success.
    pub async fn pay(
        &mut self,
        plan_type: PlanTier,
        period: BillingPeriod,
    ) -> Result<PaymentAttempt, CheckoutError> {
        if self.phase != CheckoutPhase::ScriptReady {
            return Err(CheckoutError::InvalidPhase(self.phase));
        }

        self.phase = CheckoutPhase::OrderRequested;
        let order = match self.api.create_order(plan_type, period).await {
            Ok(order) => order,
            Err(error) => {
                self.fail(error.to_string());
                return Err(error);
            }
        };

        self.phase = CheckoutPhase::GatewayOpen;
        let callback = match self.gateway.open(&order).await {
            GatewayOutcome::Completed(callback) => callback,
            GatewayOutcome::Dismissed => {
                self.fail("Payment was cancelled".to_string());
                return Ok(PaymentAttempt::Cancelled);
            }
        };

        self.phase = CheckoutPhase::Verifying;
        match self.api.verify_payment(&callback, plan_type, period).await {
            Ok(()) => {
                self.phase = CheckoutPhase::Succeeded;
                self.last_error = None;
                Ok(PaymentAttempt::Succeeded)
            }
            Err(error) => {
                self.fail(error.to_string());
                Err(error)
            }
        }
    }

    /// Failed → ScriptReady (or Idle if the script never loaded), clearing
    /// the way for another attempt.
    pub fn retry(&mut self) -> Result<(), CheckoutError> {
        if self.phase != CheckoutPhase::Failed {
            return Err(CheckoutError::InvalidPhase(self.phase));
        }

        self.phase = if self.gate.is_loaded() {
            CheckoutPhase::ScriptReady
        } else {
            CheckoutPhase::Idle
        };
        Ok(())
    }

    fn fail(&mut self, message: String) {
        self.phase = CheckoutPhase::Failed;
        self.last_error = Some(message);
    }
}
