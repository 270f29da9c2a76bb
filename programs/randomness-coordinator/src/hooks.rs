use crate::randomness::Randomness;
use crate::state::{Identity, RequestId};

/// Deployment-specific behavior composed into a [`crate::RandomnessCoordinator`].
///
/// `operator` decides who may fulfill; `on_randomness_fulfilled` consumes the
/// derived value. A deployment whose operator can never call in simply never
/// gets fulfilled.
pub trait CoordinatorHooks {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The identity currently authorized to fulfill requests. Must not mutate.
    fn operator(&self) -> Identity;

    /// Handle the derived randomness for a pending request.
    ///
    /// Returning an error aborts the fulfillment and leaves the request
    /// pending. Implementations should not leave partial state behind when
    /// they fail.
    fn on_randomness_fulfilled(
        &mut self,
        randomness: Randomness,
        request_id: RequestId,
        extra: &[u8],
    ) -> Result<(), Self::Error>;
}
