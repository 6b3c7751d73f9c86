use std::sync::Arc;

use alloy_primitives::Address;

use crate::actions::{ActionExecutor, ActionRequest, ActionResult};
use crate::config::Settings;
use crate::errors::StakeError;
use crate::gateway::{ConfirmationPolicy, ContractGateway, RpcGateway};
use crate::networking::HttpRpcClient;
use crate::pools::{PoolAggregator, PoolRecord, TokenBalances};
use crate::utils::CancellationToken;
use crate::wallet::WalletSession;

/// One wallet session wired to the guardian: a single gateway shared by the
/// read and write paths.
pub struct StakingClient {
    session: WalletSession,
    gateway: Arc<dyn ContractGateway>,
    aggregator: PoolAggregator,
    executor: ActionExecutor,
}

impl StakingClient {
    /// Connect to the wallet behind `settings.rpc_url`.
    pub async fn connect(settings: &Settings) -> Result<Self, StakeError> {
        let signer = Arc::new(HttpRpcClient::new(&settings.rpc_url, settings.request_timeout())?);
        let session = WalletSession::connect(signer, settings.chain()).await?;
        Ok(Self::new(session, settings))
    }

    pub fn new(session: WalletSession, settings: &Settings) -> Self {
        let gateway: Arc<dyn ContractGateway> = Arc::new(RpcGateway::new(
            &session,
            settings.guardian_address,
            ConfirmationPolicy::from(settings),
        ));
        Self::with_gateway(session, gateway, settings)
    }

    pub fn with_gateway(session: WalletSession, gateway: Arc<dyn ContractGateway>, settings: &Settings) -> Self {
        Self {
            aggregator: PoolAggregator::from_settings(Arc::clone(&gateway), settings),
            executor: ActionExecutor::new(Arc::clone(&gateway)),
            session,
            gateway,
        }
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// Pools as seen by the connected account
    pub async fn list_pools(&self, cancel: &CancellationToken) -> Result<Vec<PoolRecord>, StakeError> {
        self.aggregator.list_pools(self.session.account(), cancel).await
    }

    pub async fn list_pools_for(
        &self,
        user: Address,
        cancel: &CancellationToken,
    ) -> Result<Vec<PoolRecord>, StakeError> {
        self.aggregator.list_pools(user, cancel).await
    }

    /// Guardian and user balances of `token`; the user defaults to the
    /// connected account.
    pub async fn read_balances(&self, token: Address, user: Option<Address>) -> Result<TokenBalances, StakeError> {
        self.aggregator
            .balances()
            .read_balances(
                token,
                self.gateway.guardian_address(),
                user.unwrap_or_else(|| self.session.account()),
            )
            .await
    }

    pub async fn execute(&self, request: &ActionRequest, cancel: &CancellationToken) -> ActionResult {
        self.executor.execute(request, cancel).await
    }

    pub async fn compound(&self, cancel: &CancellationToken) -> ActionResult {
        self.executor.compound(cancel).await
    }
}
