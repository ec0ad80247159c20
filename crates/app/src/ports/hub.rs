//! Hub port — the home-automation hub's REST API.

use std::future::Future;

use homebutler_domain::envelope::ServiceCall;
use homebutler_domain::error::HubError;
use homebutler_domain::hub::{HubServiceDomain, HubState};
use homebutler_domain::settings::ConnectionSettings;

/// Access to the hub's state and service endpoints.
///
/// Implementations report every transport, status or decode failure as a
/// [`HubError`]; deciding what to do with it is up to the caller.
pub trait HubApi {
    /// Point the client at a (new) hub URL and credential.
    fn configure(&mut self, settings: &ConnectionSettings);

    /// `GET /states`: every entity known to the hub.
    fn fetch_states(&self) -> impl Future<Output = Result<Vec<HubState>, HubError>> + Send;

    /// `GET /services`: callable services, grouped by domain.
    fn fetch_services(
        &self,
    ) -> impl Future<Output = Result<Vec<HubServiceDomain>, HubError>> + Send;

    /// `POST /services/{domain}/{service}` with the call's payload.
    ///
    /// Returns the states the hub reports as changed by the call.
    fn call_service(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = Result<Vec<HubState>, HubError>> + Send;
}
