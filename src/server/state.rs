use crate::provider::ProviderClient;

#[derive(Clone, Debug)]
pub struct ServerState {
    provider: ProviderClient,
}

impl From<ProviderClient> for ServerState {
    fn from(provider: ProviderClient) -> Self {
        Self { provider }
    }
}

impl ServerState {
    pub fn provider(&self) -> &ProviderClient {
        &self.provider
    }
}
