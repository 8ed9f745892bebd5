pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_PATH_ENV: &str = "OPSFLOW_CONFIG_PATH";
const CONFIG_CANDIDATES: [&str; 4] = [
    "opsflow.local.yaml",
    ".opsflow.local.yaml",
    "opsflow.yaml",
    ".opsflow.yaml",
];

/// opsflow のグローバル設定ディレクトリ (~/.config/opsflow) を取得
///
/// ディレクトリの作成は行わない。
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("opsflow");
    Ok(config_dir)
}

/// プロジェクトの設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 OPSFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: opsflow.local.yaml, .opsflow.local.yaml, opsflow.yaml, .opsflow.yaml
/// 3. ./.opsflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/opsflow/opsflow.yaml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリ → 3. ./.opsflow/
    for dir in [current_dir.clone(), current_dir.join(".opsflow")] {
        if !dir.is_dir() {
            continue;
        }
        if let Some(path) = CONFIG_CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
        {
            return Ok(path);
        }
    }

    // 4. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("opsflow.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// 設定ファイル全体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub aws: AwsSettings,
    pub retry: RetrySettings,
}

/// AWS クライアント設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// エンドポイントの上書き (ローカルのモックなど)
    pub endpoint_url: Option<String>,
}

/// 更新系 API 呼び出しのリトライ設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// リトライ全体の上限時間（秒）
    pub timeout_secs: u64,
    /// 初期待機時間（ミリ秒）
    pub initial_delay_ms: u64,
    /// 最大待機時間（ミリ秒）
    pub max_delay_ms: u64,
    /// Exponential倍率
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            timeout_secs: 600, // 10分
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            multiplier: 2.0,
        }
    }
}

impl Settings {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// 環境変数で設定を上書き
    ///
    /// AWS_REGION, AWS_PROFILE, OPSFLOW_ENDPOINT_URL, OPSFLOW_RETRY_TIMEOUT_SECS
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(region) = std::env::var("AWS_REGION") {
            self.aws.region = Some(region);
        }
        if let Ok(profile) = std::env::var("AWS_PROFILE") {
            self.aws.profile = Some(profile);
        }
        if let Ok(endpoint) = std::env::var("OPSFLOW_ENDPOINT_URL") {
            self.aws.endpoint_url = Some(endpoint);
        }
        if let Ok(timeout) = std::env::var("OPSFLOW_RETRY_TIMEOUT_SECS") {
            self.retry.timeout_secs =
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnvVar {
                        name: "OPSFLOW_RETRY_TIMEOUT_SECS".to_string(),
                        value: timeout.clone(),
                    })?;
        }
        Ok(())
    }
}

/// 設定を読み込む
///
/// 設定ファイルが見つからない場合はデフォルト値に環境変数を適用する。
pub fn load_settings() -> Result<Settings> {
    let mut settings = match find_config_file() {
        Ok(path) => Settings::from_file(path)?,
        Err(ConfigError::ConfigFileNotFound) => Settings::default(),
        Err(e) => return Err(e),
    };
    settings.apply_env_overrides()?;
    Ok(settings)
}
