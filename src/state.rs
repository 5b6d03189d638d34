use std::sync::Arc;

use crate::database::Database;
use crate::features::analytics::AnalyticsAggregator;
use crate::features::auth::{
    repository::AccountRepository,
    service::AuthService,
    session::SessionSettings,
    token::TokenCodec,
};
use crate::features::submissions::SubmissionStore;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub submissions: SubmissionStore,
    pub analytics: AnalyticsAggregator,
    pub auth: AuthService,
    pub tokens: Arc<TokenCodec>,
    pub session: SessionSettings,
}

impl AppState {
    /// 由启动时创建的单例资源组装；各组件共享同一个连接池
    pub fn new(
        db: Database,
        tokens: Arc<TokenCodec>,
        accounts: Arc<dyn AccountRepository>,
        session: SessionSettings,
    ) -> Self {
        Self {
            submissions: SubmissionStore::new(db.pool.clone()),
            analytics: AnalyticsAggregator::new(db.pool.clone()),
            auth: AuthService::new(accounts, tokens.clone()),
            db,
            tokens,
            session,
        }
    }
}
