use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: opsflow.local.yaml, .opsflow.local.yaml, opsflow.yaml, .opsflow.yaml\n\
        - ./.opsflow/ ディレクトリ\n\
        - ~/.config/opsflow/opsflow.yaml\n\
        または OPSFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ConfigFileNotFound,

    #[error("環境変数 {name} の値が不正です: {value}")]
    InvalidEnvVar { name: String, value: String },

    #[error("YAML パースエラー: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
