use crate::bot::{Context, Error};
use poise::ChoiceParameter;

#[derive(Clone, Copy, Debug, ChoiceParameter)]
pub enum HelpMode {
    #[name = "summary"]
    Summary,
    #[name = "detailed"]
    Detailed,
}

const SUMMARY: &str = "コマンド一覧:\n\
\n\
/calc <必要PT> — 目標ポイントを稼げるスコア範囲を表示。\n\
/efficiency <楽曲名> — 楽曲の効率難易度とジャケットを表示。\n\
/roomid <start|end> — 5 桁の部屋番号をボイスチャンネル名に反映。\n\
/taki <s|e> — 毎時のリマインドを開始 / 終了。\n\
/checkrole <ロール> — ロールを持つメンバーを一覧表示。\n\
/purge <件数> — 最新メッセージを一括削除 (要メッセージ管理権限)。\n\
/help [summary|detailed] — この一覧または詳細を表示。";

const DETAILED: &str = r#"
# コマンド詳細

## イベント
- `/calc <必要PT>`：指定したイベントポイントになるスコア範囲を、イベントボーナスと炊き数ごとに表示します。
  - 結果は 8 行ずつのページに分かれ、◀ / ▶ ボタンで切り替えられます。
- `/efficiency <楽曲名>`：曲名または読みで検索します。入力中に候補が表示されます。

## 部屋番号
- `/roomid start <ボイスチャンネルID> <通知先チャンネルID>`：このチャンネルに投稿された 5 桁の数字を部屋番号として扱い、チャンネル名を変更します。
- `/roomid end`：監視を終了します。

## リマインド
- `/taki s`：毎時決まった分に「炊きましょう🔥」と送ります。
- `/taki e`：リマインドを止めます。

## 管理
- `/checkrole <ロール>`：ロールを持つメンバーを 20 人ずつ表示します。
- `/purge <件数>`：最大 100 件まで削除します。14 日より古いメッセージは対象外です。

※ 設定はすべてメモリ上にあり、Bot を再起動すると消えます。
"#;

/// コマンドの使い方を表示します
#[poise::command(slash_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "表示モード"] mode: Option<HelpMode>,
) -> Result<(), Error> {
    let text = match mode.unwrap_or(HelpMode::Summary) {
        HelpMode::Summary => SUMMARY,
        HelpMode::Detailed => DETAILED,
    };
    ctx.say(text).await?;
    Ok(())
}
