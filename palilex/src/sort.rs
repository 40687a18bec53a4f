//! パーリ語の照合順序
//!
//! このモジュールは、パーリ語アルファベット順のソートキーを提供します。
//! ラテン文字転写されたパーリ語は、ローマ字の辞書順とは異なる伝統的な
//! 字母順（母音、ṃ、子音の調音位置順）に従って整列されます。
//! 有気音（kh、gh等）は二文字で一つの字母として扱われます。

use std::sync::LazyLock;

use hashbrown::HashMap;

/// 伝統的なパーリ語の字母順
///
/// 語根記号`√`を先頭に置き、母音、ニッガヒータ（ṃ）、子音の順に並びます。
const ALPHABET: &[&str] = &[
    "√", "a", "ā", "i", "ī", "u", "ū", "e", "o", "ṃ",
    "k", "kh", "g", "gh", "ṅ",
    "c", "ch", "j", "jh", "ñ",
    "ṭ", "ṭh", "ḍ", "ḍh", "ṇ",
    "t", "th", "d", "dh", "n",
    "p", "ph", "b", "bh", "m",
    "y", "r", "l", "ḷ", "ḷh", "v", "s", "h",
];

/// 字母順に含まれない文字に与えるランクの基点
///
/// 未知の文字はすべての字母より後ろに、コードポイント順で並びます。
const UNKNOWN_BASE: u32 = 0x1000;

static LETTER_RANKS: LazyLock<HashMap<&'static str, u32>> = LazyLock::new(|| {
    let mut ranks = HashMap::new();
    // rank 1 is reserved for the word-internal space
    for (i, letter) in ALPHABET.iter().enumerate() {
        ranks.insert(*letter, i as u32 + 2);
    }
    ranks
});

/// パーリ語のソートキーを計算します。
///
/// 単語を字母単位（有気音は二文字）に分解し、各字母のランクの列を返します。
/// 返されたキー同士を辞書式に比較することで、パーリ語アルファベット順の
/// ソートが得られます。空白は字母より前に、字母順に含まれない文字
/// （番号サフィックスの数字など）は字母より後ろに並びます。
///
/// # 引数
///
/// * `word` - ソートキーを計算する単語
///
/// # 戻り値
///
/// 字母ランクの列
///
/// # 例
///
/// ```
/// # use palilex::sort::pali_sort_key;
/// assert!(pali_sort_key("kāya") < pali_sort_key("khandha"));
/// assert!(pali_sort_key("deva") < pali_sort_key("deva 1"));
/// ```
pub fn pali_sort_key(word: &str) -> Vec<u32> {
    let mut key = Vec::with_capacity(word.chars().count());
    let mut iter = word.chars().peekable();
    while let Some(c) = iter.next() {
        if let Some(&next) = iter.peek() {
            let pair: String = [c, next].iter().collect();
            if let Some(&rank) = LETTER_RANKS.get(pair.as_str()) {
                key.push(rank);
                iter.next();
                continue;
            }
        }
        if c == ' ' {
            key.push(1);
            continue;
        }
        let mut buf = [0; 4];
        match LETTER_RANKS.get(c.encode_utf8(&mut buf) as &str) {
            Some(&rank) => key.push(rank),
            None => key.push(UNKNOWN_BASE + c as u32),
        }
    }
    key
}

/// 単語のリストをパーリ語アルファベット順にソートして返します。
///
/// # 引数
///
/// * `words` - ソートする単語の列
///
/// # 戻り値
///
/// パーリ語アルファベット順に整列された単語のベクター
pub fn pali_sorted<I>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut sorted: Vec<String> = words.into_iter().collect();
    sort_pali(&mut sorted);
    sorted
}

/// 単語のスライスをパーリ語アルファベット順にその場でソートします。
pub fn sort_pali(words: &mut [String]) {
    words.sort_by_cached_key(|w| pali_sort_key(w));
}
