// Push-down Feature Flag 시스템
//
// 집계 push-down 규칙은 해당 토글이 켜져 있을 때만 동작한다.
// 패스 시작 시 snapshot()으로 불변 FeatureSet을 얻어 규칙에 전달한다.

use crate::error::TsqResult;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Feature Flag 정의
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// window |> count push-down
    PushDownWindowAggregateCount,

    /// window |> min/max/mean/sum push-down
    PushDownWindowAggregateRest,

    /// ReadGroup |> count push-down
    PushDownGroupAggregateCount,
}

impl Feature {
    pub const ALL: [Feature; 3] = [
        Feature::PushDownWindowAggregateCount,
        Feature::PushDownWindowAggregateRest,
        Feature::PushDownGroupAggregateCount,
    ];

    /// Feature를 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::PushDownWindowAggregateCount => "pushDownWindowAggregateCount",
            Feature::PushDownWindowAggregateRest => "pushDownWindowAggregateRest",
            Feature::PushDownGroupAggregateCount => "pushDownGroupAggregateCount",
        }
    }

    /// 문자열에서 Feature 파싱
    pub fn parse_feature(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// 환경 변수 이름 (예: TSQ_FEATURE_PUSH_DOWN_WINDOW_AGGREGATE_COUNT)
    pub fn env_var_name(&self) -> String {
        let mut snake = String::new();
        for c in self.as_str().chars() {
            if c.is_ascii_uppercase() {
                snake.push('_');
            }
            snake.push(c.to_ascii_uppercase());
        }
        format!("TSQ_FEATURE_{}", snake)
    }
}

/// 한 번의 최적화 패스 동안 고정된 토글 집합
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    enabled: HashMap<Feature, bool>,
}

impl FeatureSet {
    /// 모든 토글이 꺼진 집합
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self::from_enabled(Feature::ALL)
    }

    pub fn from_enabled(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            enabled: features.into_iter().map(|f| (f, true)).collect(),
        }
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.enabled.get(&feature).copied().unwrap_or(false)
    }
}

/// Feature Flag 관리자
pub struct FeatureFlags {
    /// Feature 상태 (Feature → enabled)
    flags: Arc<RwLock<HashMap<Feature, bool>>>,

    /// 영속성 파일 경로
    persistence_path: Option<PathBuf>,
}

impl FeatureFlags {
    /// 새 Feature Flag 관리자 생성
    pub fn new() -> Self {
        Self {
            flags: Arc::new(RwLock::new(HashMap::new())),
            persistence_path: None,
        }
    }

    /// 영속성 경로 설정
    pub fn with_persistence(mut self, path: PathBuf) -> Self {
        self.persistence_path = Some(path);
        self
    }

    /// Feature 활성화
    pub fn enable(&self, feature: Feature) {
        self.flags.write().insert(feature, true);
    }

    /// Feature 비활성화
    pub fn disable(&self, feature: Feature) {
        self.flags.write().insert(feature, false);
    }

    /// Feature 토글
    pub fn toggle(&self, feature: Feature, enabled: bool) {
        self.flags.write().insert(feature, enabled);
    }

    /// Feature 활성화 여부 확인 (기본값: 비활성화)
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.flags.read().get(&feature).copied().unwrap_or(false)
    }

    /// 환경 변수에서 로드
    pub fn load_from_env(&self) {
        for feature in Feature::ALL {
            if let Ok(value) = env::var(feature.env_var_name()) {
                let enabled = value.to_lowercase() == "true" || value == "1";
                self.toggle(feature, enabled);
            }
        }
    }

    /// 파일에서 로드
    pub fn load_from_file(&self) -> TsqResult<()> {
        if let Some(path) = self.persistence_path.as_ref().filter(|p| p.exists()) {
            let json = fs::read_to_string(path)?;
            let loaded: HashMap<String, bool> = serde_json::from_str(&json)?;

            let mut flags = self.flags.write();
            for (key, value) in loaded {
                if let Some(feature) = Feature::parse_feature(&key) {
                    flags.insert(feature, value);
                }
            }
        }
        Ok(())
    }

    /// 파일에 저장
    pub fn save_to_file(&self) -> TsqResult<()> {
        if let Some(path) = &self.persistence_path {
            let serializable: HashMap<String, bool> = self
                .flags
                .read()
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), *v))
                .collect();

            let json = serde_json::to_string_pretty(&serializable)?;

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(path, json)?;
        }
        Ok(())
    }

    /// 모든 Feature 상태 조회
    pub fn all(&self) -> HashMap<Feature, bool> {
        self.flags.read().clone()
    }

    /// 모든 Feature 초기화
    pub fn reset(&self) {
        self.flags.write().clear();
    }

    /// 현재 상태의 불변 스냅샷
    pub fn snapshot(&self) -> FeatureSet {
        FeatureSet {
            enabled: self.all(),
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_feature_flag_enable_disable() {
        let flags = FeatureFlags::new();

        // 기본값: 비활성화
        assert!(!flags.is_enabled(Feature::PushDownWindowAggregateCount));

        flags.enable(Feature::PushDownWindowAggregateCount);
        assert!(flags.is_enabled(Feature::PushDownWindowAggregateCount));

        flags.disable(Feature::PushDownWindowAggregateCount);
        assert!(!flags.is_enabled(Feature::PushDownWindowAggregateCount));
    }

    #[test]
    fn test_feature_flag_toggle() {
        let flags = FeatureFlags::new();

        flags.toggle(Feature::PushDownGroupAggregateCount, true);
        assert!(flags.is_enabled(Feature::PushDownGroupAggregateCount));

        flags.toggle(Feature::PushDownGroupAggregateCount, false);
        assert!(!flags.is_enabled(Feature::PushDownGroupAggregateCount));
    }

    #[test]
    fn test_feature_flag_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags").join("features.json");
        let flags = FeatureFlags::new().with_persistence(path.clone());

        flags.enable(Feature::PushDownWindowAggregateCount);
        flags.enable(Feature::PushDownWindowAggregateRest);
        flags.disable(Feature::PushDownGroupAggregateCount);

        flags.save_to_file().unwrap();

        // 새 인스턴스로 로드
        let flags2 = FeatureFlags::new().with_persistence(path);
        flags2.load_from_file().unwrap();

        assert!(flags2.is_enabled(Feature::PushDownWindowAggregateCount));
        assert!(flags2.is_enabled(Feature::PushDownWindowAggregateRest));
        assert!(!flags2.is_enabled(Feature::PushDownGroupAggregateCount));
    }

    #[test]
    fn test_feature_flag_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let flags = FeatureFlags::new().with_persistence(dir.path().join("absent.json"));
        flags.load_from_file().unwrap();
        assert!(flags.all().is_empty());
    }

    #[test]
    fn test_feature_flag_env_var() {
        let flags = FeatureFlags::new();

        // 환경 변수 설정 (unsafe)
        unsafe {
            env::set_var("TSQ_FEATURE_PUSH_DOWN_WINDOW_AGGREGATE_COUNT", "true");
            env::set_var("TSQ_FEATURE_PUSH_DOWN_WINDOW_AGGREGATE_REST", "1");
            env::set_var("TSQ_FEATURE_PUSH_DOWN_GROUP_AGGREGATE_COUNT", "false");
        }

        flags.load_from_env();

        assert!(flags.is_enabled(Feature::PushDownWindowAggregateCount));
        assert!(flags.is_enabled(Feature::PushDownWindowAggregateRest));
        assert!(!flags.is_enabled(Feature::PushDownGroupAggregateCount));

        // 정리 (unsafe)
        unsafe {
            env::remove_var("TSQ_FEATURE_PUSH_DOWN_WINDOW_AGGREGATE_COUNT");
            env::remove_var("TSQ_FEATURE_PUSH_DOWN_WINDOW_AGGREGATE_REST");
            env::remove_var("TSQ_FEATURE_PUSH_DOWN_GROUP_AGGREGATE_COUNT");
        }
    }

    #[test]
    fn test_snapshot_is_detached() {
        let flags = FeatureFlags::new();
        flags.enable(Feature::PushDownGroupAggregateCount);
        let snapshot = flags.snapshot();

        flags.reset();
        assert!(snapshot.is_enabled(Feature::PushDownGroupAggregateCount));
        assert!(!flags.snapshot().is_enabled(Feature::PushDownGroupAggregateCount));
    }

    #[test]
    fn test_feature_from_str() {
        assert_eq!(
            Feature::parse_feature("pushDownWindowAggregateCount"),
            Some(Feature::PushDownWindowAggregateCount)
        );
        assert_eq!(Feature::parse_feature("invalid"), None);
        assert_eq!(
            Feature::PushDownGroupAggregateCount.env_var_name(),
            "TSQ_FEATURE_PUSH_DOWN_GROUP_AGGREGATE_COUNT"
        );
    }
}
