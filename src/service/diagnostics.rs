use eyre::Result;

use crate::domain::diagnostics::DatabaseStatus;
use crate::repository::accounts::AccountRepository;
use crate::repository::sessions::SessionRepository;
use crate::repository::users::UserRepository;

const SAMPLE_SIZE: i64 = 10;

#[derive(Clone)]
pub struct DiagnosticsService {
    pub user_repository: UserRepository,
    pub account_repository: AccountRepository,
    pub session_repository: SessionRepository,
}

impl DiagnosticsService {
    pub async fn database_status(&self) -> Result<DatabaseStatus> {
        let users = self.user_repository.recent(SAMPLE_SIZE).await?;
        let accounts = self.account_repository.recent(SAMPLE_SIZE).await?;
        let sessions = self.session_repository.recent(SAMPLE_SIZE).await?;
        Ok(DatabaseStatus::connected(users, accounts, sessions))
    }
}
