use crate::models::types::ScoreRangeRow;
use std::collections::BTreeMap;

/// スコアボーナス 1 段あたりのスコア幅
pub const SCORE_WINDOW: u32 = 20_000;
pub const SCORE_LIMIT: u32 = 3_000_000;
pub const MAX_SCORE_BONUS_TIER: u32 = 150;
pub const MAX_BONUS_PERCENT: i64 = 435;

/// 炊き数 → ライブボーナス倍率
pub const LIVE_BONUS_TABLE: [(u8, u32); 4] = [(0, 1), (1, 5), (2, 10), (3, 15)];

pub const TABLE_HEADER: &str = "イベントボーナス | 炊き数 | スコア下限 | スコア上限";

/// 必要ポイントから (イベントボーナス, 炊き数, スコア範囲) の組み合わせを列挙する。
///
/// 各炊き数・スコアボーナス段 x について
/// `R ≈ (100 + x) * (1 + p / 100) * m` を満たすボーナス p を逆算し、
/// 四捨五入 (0 から遠い方へ) した値が 0 ~ 435 に収まる行だけを残す。
/// 同じ (炊き数, ボーナス) に複数の x が当たった場合は再計算値が R に最も近いもの
/// (同値なら小さい x) だけを残し、他の x のスコア範囲は条件を満たしていても出力しない。
/// そのため結果は (炊き数, ボーナス) の昇順で、キーごとに 1 行になる。
pub fn calculate_score_ranges(required_points: u32) -> Vec<ScoreRangeRow> {
    let required = i64::from(required_points);
    let mut best: BTreeMap<(u8, u16), (ScoreRangeRow, i64)> = BTreeMap::new();

    for (tier, multiplier) in LIVE_BONUS_TABLE {
        for x in 0..=MAX_SCORE_BONUS_TIER {
            let score_min = x * SCORE_WINDOW;
            let score_max = score_min + SCORE_WINDOW - 1;
            if score_max > SCORE_LIMIT {
                continue;
            }

            let divisor = i64::from(multiplier) * (100 + i64::from(x));
            let percent = div_round_half_away(100 * required - 100 * divisor, divisor);
            if !(0..=MAX_BONUS_PERCENT).contains(&percent) {
                continue;
            }

            // 100R と再計算値 (100 + p) * divisor の差
            let deviation = (100 * required - divisor * (100 + percent)).abs();
            let row = ScoreRangeRow {
                bonus_percent: percent as u16,
                consumption_tier: tier,
                score_min,
                score_max,
            };

            best.entry((tier, row.bonus_percent))
                .and_modify(|current| {
                    if deviation < current.1 {
                        *current = (row, deviation);
                    }
                })
                .or_insert((row, deviation));
        }
    }

    best.into_values().map(|(row, _)| row).collect()
}

/// 整数のまま n / d を四捨五入する (d > 0)
pub fn div_round_half_away(n: i64, d: i64) -> i64 {
    debug_assert!(d > 0);
    if n >= 0 {
        (2 * n + d) / (2 * d)
    } else {
        -((-2 * n + d) / (2 * d))
    }
}

pub fn format_row(row: &ScoreRangeRow) -> String {
    format!(
        "{}%  | {} | {} | {}",
        row.bonus_percent,
        row.consumption_tier,
        group_thousands(u64::from(row.score_min)),
        group_thousands(u64::from(row.score_max))
    )
}

/// 計算結果を表示用の行に変換する
pub fn render_lines(required_points: u32) -> Vec<String> {
    calculate_score_ranges(required_points)
        .iter()
        .map(format_row)
        .collect()
}

pub fn render_page(required_points: u32, index: usize, total: usize, lines: &[String]) -> String {
    let mut out = format!("**必要PT**: {} | Page {}/{}\n```\n", required_points, index, total);
    out.push_str(TABLE_HEADER);
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("```");
    out
}

/// 1234567 → "1,234,567"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
