//! The stop capability returned by every pump-backed `watch`/`listen`.

use hostio_lifecycle::Subscription;
use napi_derive::napi;

use crate::conversions::types::pump_exit_label;
use crate::runtime;

#[napi]
pub struct SubscriptionHandle {
    inner: Subscription,
}

impl SubscriptionHandle {
    pub(crate) fn new(inner: Subscription) -> Self {
        Self { inner }
    }
}

#[napi]
impl SubscriptionHandle {
    /// Stop delivering events. Idempotent.
    #[napi]
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Resolves with why the pump ended.
    #[napi]
    pub async fn finished(&self) -> napi::Result<String> {
        let rt = runtime::get()?;
        let finished = self.inner.finished();
        let exit = rt
            .run("subscription.finished", async move { finished.wait().await })
            .await?;
        Ok(pump_exit_label(&exit))
    }
}
