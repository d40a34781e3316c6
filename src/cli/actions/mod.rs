pub mod admin;
pub mod server;

use anyhow::Result;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    Admin(admin::Args),
}

impl Action {
    /// Run the action to completion.
    ///
    /// # Errors
    /// Returns whatever error the underlying action reports.
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Server(args) => server::execute(args).await,
            Self::Admin(args) => admin::execute(args).await,
        }
    }
}
