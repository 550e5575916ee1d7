use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// One-shot connectivity probe, asked for right before a remote fetch.
/// The answer reflects the radio state at that instant; it is not a
/// subscription.
#[derive(Clone)]
pub struct Network<E> {
    context: CapabilityContext<NetworkOperation, E>,
}

impl<Ev> Capability<Ev> for Network<Ev> {
    type Operation = NetworkOperation;
    type MappedSelf<MappedEv> = Network<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Network::new(self.context.map_event(f))
    }
}

impl<E> Network<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<NetworkOperation, E>) -> Self {
        Self { context }
    }

    pub fn check_connectivity<F>(&self, callback: F)
    where
        F: FnOnce(NetworkStatus) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(NetworkOperation::CheckConnectivity)
                .await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NetworkOperation {
    CheckConnectivity,
}

impl Operation for NetworkOperation {
    type Output = NetworkStatus;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkStatus {
    pub connected: bool,
}

impl NetworkStatus {
    #[must_use]
    pub const fn connected() -> Self {
        Self { connected: true }
    }

    #[must_use]
    pub const fn disconnected() -> Self {
        Self { connected: false }
    }
}
