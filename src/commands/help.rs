// Help command - show usage guide

/// Usage guide with the configured prefix substituted into every command
pub fn help_text(prefix: char) -> String {
    let p = prefix;
    format!(
        "**📚 SortingHat - ヘルプ**\n\
         投稿された値に応じてロールを付与するBotです。\n\
         \n\
         **⚙️ チャンネル設定**\n\
         `{p}setadminchannel` - このチャンネルを管理チャンネルに設定\n\
         `{p}setchannel [#チャンネル]` - ロール付与チャンネルを設定 (省略時はこのチャンネル)\n\
         \n\
         **📄 CSV**\n\
         `{p}uploadcsv <KeyColumnId> <ValueColumnId>` - 添付CSVからマッピングを読み込み (既存のマッピングは置き換え)\n\
         `{p}clearcsv` - マッピングを全て削除\n\
         \n\
         **✏️ エントリ**\n\
         `{p}addentry <マッチング値> <ロール名>` - マッピングを追加・更新\n\
         `{p}removeentry <マッチング値>` - マッピングを削除\n\
         `{p}listentries` - マッピング一覧を表示\n\
         \n\
         **ℹ️ その他**\n\
         `{p}status` - 現在の設定を表示\n\
         `{p}help` - このヘルプを表示\n\
         \n\
         **使い方**\n\
         1. `{p}setadminchannel` で管理チャンネルを決める\n\
         2. `{p}setchannel` でロール付与チャンネルを決める\n\
         3. CSVを添付して `{p}uploadcsv 0 1` (0列目がロール名、1列目がマッチング値)\n\
         4. メンバーがロール付与チャンネルに値を投稿するとロールが付与されます\n\
         \n\
         コマンドは管理者のみ実行できます。"
    )
}
