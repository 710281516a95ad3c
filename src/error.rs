// Error types for the bot

use thiserror::Error;

/// Failures talking to Discord or downloading attachments.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("Attachment download failed: {0}")]
    Download(#[from] reqwest::Error),
}

/// CSV bytes that could not be turned into rows.
#[derive(Debug, Error)]
pub enum TabularError {
    #[error("Malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("Malformed CSV: quoted field opened on line {line} is never closed")]
    UnterminatedQuote { line: usize },
}

/// Errors surfaced to the admin who ran a command.
///
/// The `Display` text is the reply posted back to the channel.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("CSVファイルを添付してください。使い方: `{prefix}uploadcsv <KeyColumnId> <ValueColumnId>`\n例: `{prefix}uploadcsv 0 1` (0列目がKey、1列目がValue)")]
    MissingAttachment { prefix: char },

    #[error("KeyとValueの列IDを指定してください。使い方: `{prefix}uploadcsv <KeyColumnId> <ValueColumnId>`\n例: `{prefix}uploadcsv 0 1`")]
    MissingColumns { prefix: char },

    #[error("列IDは数字で指定してください。")]
    NonNumericColumn { raw: String },

    #[error("列IDは0以上で指定してください。(指定値: {index})")]
    NegativeColumn { index: i64 },

    #[error("CSVファイルのみアップロード可能です。(`{filename}`)")]
    NotCsv { filename: String },

    #[error("使い方: `{usage}`")]
    Usage { usage: String },

    #[error("CSVデータがまだ設定されていません。先に `{prefix}uploadcsv` を実行してください。")]
    NoMapping { prefix: char },

    #[error("マッチング値「{value}」は登録されていません。")]
    ValueNotFound { value: String },

    #[error("チャンネル「{reference}」が見つかりません。")]
    ChannelNotFound { reference: String },

    #[error("CSVファイルの処理中にエラーが発生しました。")]
    Tabular(#[from] TabularError),

    #[error("Discordとの通信中にエラーが発生しました。")]
    Platform(#[from] PlatformError),
}

impl CommandError {
    /// Whether the failure came from outside the bot and deserves an error log
    pub fn is_external(&self) -> bool {
        matches!(self, CommandError::Tabular(_) | CommandError::Platform(_))
    }
}

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {name}")]
    Missing { name: &'static str },

    #[error("Invalid value for '{name}': {message}")]
    Invalid { name: &'static str, message: String },
}

pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

pub type CommandResult<T> = std::result::Result<T, CommandError>;
