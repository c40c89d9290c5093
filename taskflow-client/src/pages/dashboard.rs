use shared_types::TaskStats;

use crate::api::ApiClient;
use crate::error::Result;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub email: String,
    pub stats: TaskStats,
}

impl DashboardView {
    pub async fn load(api: &ApiClient, session: &Session) -> Result<Self> {
        let stats = api.get_user_task_stats(session).await?;
        Ok(Self {
            email: session.user.email.clone(),
            stats,
        })
    }
}
