// CSV commands - uploadcsv / clearcsv

use tracing::info;

use crate::api::platform::InboundMessage;
use crate::api::tabular::parse_records;
use crate::error::{CommandError, CommandResult};
use crate::models::mapping::{IngestionReport, MappingTable};
use crate::utils::formatters::{render_within_limit, Section};
use crate::BotContext;

/// Parse a column id argument: an integer that must not be negative
pub fn parse_column(raw: &str) -> CommandResult<usize> {
    let index: i64 = raw
        .parse()
        .map_err(|_| CommandError::NonNumericColumn {
            raw: raw.to_string(),
        })?;
    usize::try_from(index).map_err(|_| CommandError::NegativeColumn { index })
}

fn is_csv_filename(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".csv")
}

/// Replace the guild's mapping with the contents of an attached CSV file
pub async fn upload_csv(
    bot: &BotContext,
    msg: &InboundMessage,
    args: &[&str],
) -> CommandResult<String> {
    let prefix = bot.settings.prefix;

    let attachment = msg
        .attachments
        .first()
        .ok_or(CommandError::MissingAttachment { prefix })?;
    if args.len() < 2 {
        return Err(CommandError::MissingColumns { prefix });
    }
    let key_column = parse_column(args[0])?;
    let value_column = parse_column(args[1])?;
    if !is_csv_filename(&attachment.filename) {
        return Err(CommandError::NotCsv {
            filename: attachment.filename.clone(),
        });
    }

    // Download and ingest before touching the guild so a failure leaves
    // the previous mapping intact
    let bytes = bot.platform.fetch_attachment(&attachment.url).await?;
    let rows = parse_records(&bytes)?;
    let (table, report) = MappingTable::ingest(rows, key_column, value_column);

    let handle = bot.store.get_or_create(msg.guild_id);
    let replaced = {
        let mut config = handle.lock().await;
        config.key_column = Some(key_column);
        config.value_column = Some(value_column);
        config.replace_mapping(table)
    };

    info!(
        "Loaded CSV '{}' for guild {}: {} ok, {} errors",
        attachment.filename,
        msg.guild_id,
        report.success_count,
        report.errors.len()
    );

    Ok(render_upload_report(
        &report,
        key_column,
        value_column,
        replaced,
        bot.settings.response_limit,
    ))
}

/// Upload reply: counts, columns, what was replaced, then per-row detail
pub fn render_upload_report(
    report: &IngestionReport,
    key_column: usize,
    value_column: usize,
    replaced: Option<usize>,
    limit: usize,
) -> String {
    let mut header = format!(
        "CSVファイルを読み込みました。\n成功: {}件、エラー: {}件\nKey列: {}、Value列: {}",
        report.success_count,
        report.errors.len(),
        key_column,
        value_column
    );
    if let Some(previous) = replaced.filter(|count| *count > 0) {
        header.push_str(&format!(
            "\n※ 既存のマッピング({}件)は置き換えられました。`addentry` で追加した項目も含まれます。",
            previous
        ));
    }

    let successes = report
        .assignments
        .iter()
        .map(|(value, role)| format!("• `{}` → {}", value, role))
        .collect();
    let errors = report
        .errors
        .iter()
        .map(|e| format!("• {}行目: {}", e.row, e.kind))
        .collect();

    render_within_limit(
        &header,
        &[
            Section::new("**登録内容:**", successes),
            Section::new("**エラー:**", errors),
        ],
        limit,
    )
}

/// Empty the guild's mapping, keeping channel bindings
pub async fn clear_csv(bot: &BotContext, msg: &InboundMessage) -> CommandResult<String> {
    let no_mapping = || CommandError::NoMapping {
        prefix: bot.settings.prefix,
    };
    let handle = bot.store.get(msg.guild_id).ok_or_else(no_mapping)?;

    let cleared = {
        let mut config = handle.lock().await;
        let table = config.mapping.as_ref().ok_or_else(no_mapping)?;
        let cleared = table.len();
        let empty = table.clear();
        config.replace_mapping(empty);
        cleared
    };

    info!("Cleared {} entries for guild {}", cleared, msg.guild_id);
    Ok(format!("CSVデータを消去しました。({}件)", cleared))
}
