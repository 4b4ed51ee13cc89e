//! 阈值与通知偏好服务

use crate::errors::AppError;
use crate::models::{UpdatePreferencesRequest, UserPreferences};
use crate::repositories::PreferenceStore;
use std::sync::Arc;
use uuid::Uuid;

pub struct ThresholdService {
    preferences: Arc<dyn PreferenceStore>,
}

impl ThresholdService {
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { preferences }
    }

    /// 获取偏好，未保存过时返回默认值
    pub async fn get(&self, owner_id: Uuid) -> Result<UserPreferences, AppError> {
        Ok(self
            .preferences
            .find_preferences(owner_id)
            .await?
            .unwrap_or_else(|| UserPreferences::defaults(owner_id)))
    }

    /// 整体替换偏好
    pub async fn update(
        &self,
        owner_id: Uuid,
        request: UpdatePreferencesRequest,
    ) -> Result<UserPreferences, AppError> {
        request
            .validate_thresholds()
            .map_err(AppError::ValidationError)?;

        let saved = self.preferences.upsert_preferences(owner_id, &request).await?;

        tracing::info!(owner_id = %owner_id, "阈值配置已更新");
        Ok(saved)
    }
}
