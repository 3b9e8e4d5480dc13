use serde::Serialize;
use utoipa::ToSchema;

/// 헬스 상태 응답
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// 서버 상태
    #[schema(example = "ok")]
    pub status: &'static str,
    /// 서버 버전
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// 서버 가동 시간 (초)
    #[schema(example = 3600)]
    pub uptime_secs: u64,
}

impl HealthStatus {
    pub fn ok(uptime_secs: u64) -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_should_serialize_with_camel_case() {
        let json = serde_json::to_value(HealthStatus::ok(42)).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["uptimeSecs"], 42);
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
