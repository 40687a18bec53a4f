//! 語義テキストの正規化
//!
//! このモジュールは、語義文字列から注釈を取り除き、比較用の正規形を
//! 生成する純粋関数を提供します。語義の比較やグループ化は、必ずこの
//! 正規形に対して行われます。

use std::sync::LazyLock;

use regex::Regex;

/// `(comm)`マーカーから行末までの註釈語義
static COMMENTARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(comm\).*$").unwrap());

/// 丸括弧の挿入句と、それに隣接する片側一つの空白
///
/// 選択肢の順序が重要です。前の空白、後ろの空白、空白なしの順に試す
/// ことで、語中の挿入句を除去しても二重空白が残りません。
static ASIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" \([^()]*\)|\([^()]*\) |\([^()]*\)").unwrap());

/// 語義文字列を正規化します。
///
/// 以下の二段階で注釈を取り除きます。
///
/// 1. `(comm)`マーカーから文字列末尾までの註釈語義を除去します。
/// 2. 丸括弧（入れ子なし）で囲まれた挿入句を、隣接する空白一つと
///    ともにすべて除去します。
///
/// 結果の先頭・末尾の空白は除去しません。正規化後に空になり得るため、
/// 呼び出し側は空文字列を処理する必要があります。
///
/// # 引数
///
/// * `text` - 正規化する語義文字列
///
/// # 戻り値
///
/// 注釈を取り除いた語義文字列
///
/// # 例
///
/// ```
/// # use palilex::meaning::clean_meaning;
/// assert_eq!(clean_meaning("truth (aside) of dhamma"), "truth of dhamma");
/// assert_eq!(clean_meaning("truth (comm) glossed as sacca"), "truth ");
/// assert_eq!(clean_meaning("no parens"), "no parens");
/// ```
pub fn clean_meaning(text: &str) -> String {
    let text = COMMENTARY.replace(text, "");
    ASIDE.replace_all(&text, "").into_owned()
}
