//! 単一語義索引
//!
//! このモジュールは、`(品詞, 正規化済み語義)`から見出し語集合への索引を
//! 構築します。文法フィルターと番号付き同形語の抑制を適用した上で、
//! 下位語義単位のグループ化（同義語探索の入力）と、語義全体単位の
//! グループ化（同一語義パス）の両方を提供します。

use std::fmt;
use std::sync::LazyLock;

use hashbrown::HashSet;
use regex::Regex;

use crate::exceptions::ExceptionStore;
use crate::headword::Headword;
use crate::meaning::clean_meaning;
use crate::utils::OrderedMap;

/// 自動グループ化から常に除外される品詞
pub const EXCLUDED_POS: &[&str] = &["pron", "sandhi"];

/// 語義全体パスで`noun`に集約される名詞品詞
pub const NOUN_POS: &[&str] = &["masc", "fem", "nt"];

/// 屈折形を示す格マーカー
///
/// これらが文法注記に現れる語は見出し語そのものではなく屈折形なので、
/// 同義語候補から外します。
static CASE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(nom|acc|instr|dat|abl|gen|loc|voc)\b").unwrap());

/// 格・人称・再帰マーカー
static CASE_PERSON_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(nom|acc|instr|dat|abl|gen|loc|voc|3rd|2nd|1st|reflx)\b").unwrap()
});

/// 品詞と正規化済み語義の複合キー
///
/// 2つのキーは、どちらかの成分が異なれば（正規化後の空白・大文字小文字を
/// 含めて）別のキーです。毎回の実行でレコードから導出され、永続化される
/// ことはありません。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeaningKey {
    /// 品詞
    pub pos: String,

    /// 正規化済み語義
    pub meaning: String,
}

impl MeaningKey {
    /// 新しいキーを作成します。
    pub fn new<P, M>(pos: P, meaning: M) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        Self {
            pos: pos.into(),
            meaning: meaning.into(),
        }
    }
}

impl fmt::Display for MeaningKey {
    /// 例外ストアと照合する`"pos:meaning"`形式にシリアライズする
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.pos, self.meaning)
    }
}

/// 語義キーから見出し語集合への挿入順保持の索引
pub struct SingleMeaningIndex {
    groups: OrderedMap<MeaningKey, HashSet<String>>,
}

impl SingleMeaningIndex {
    /// レコード列から索引を構築します。
    ///
    /// 各レコードの語義を`"; "`で下位語義に分割し、正規化した上で
    /// グループに追加します。以下の場合、下位語義はスキップされます。
    ///
    /// - 正規化後に空になった場合
    /// - 品詞が除外集合（代名詞、連声の助詞）に含まれる場合
    /// - シリアライズされたキーが例外ストアに含まれる場合
    /// - 文法注記が格・人称・再帰マーカーに一致する場合
    ///
    /// さらに、同じ正規化見出し語に番号サフィックスを付けた同形語
    /// （`deva 1`と`deva 2`）は同じグループに入れません。同一語の複数の
    /// 語義を同義語として扱わないためです。
    ///
    /// 固定の入力と固定の例外に対して、結果は実行間で同一です。
    ///
    /// # 引数
    ///
    /// * `records` - 全見出し語レコード
    /// * `exceptions` - 例外ストア
    pub fn build(records: &[Headword], exceptions: &ExceptionStore) -> Self {
        let mut groups: OrderedMap<MeaningKey, HashSet<String>> = OrderedMap::new();

        for rec in records {
            if EXCLUDED_POS.contains(&rec.pos.as_str()) {
                continue;
            }
            if CASE_PERSON_MARKERS.is_match(&rec.grammar) {
                continue;
            }
            let lemma_clean = rec.lemma_clean();
            for sub_meaning in rec.meaning.split("; ") {
                let meaning = clean_meaning(sub_meaning);
                if meaning.is_empty() {
                    continue;
                }
                let key = MeaningKey::new(rec.pos.clone(), meaning);
                if exceptions.contains(&key.to_string()) {
                    continue;
                }
                let members = groups.get_or_insert_with(key, HashSet::new);
                if !has_numbered_twin(&lemma_clean, members) {
                    members.insert(rec.lemma.clone());
                }
            }
        }

        log::info!("single meaning index: {} keys", groups.len());
        Self { groups }
    }

    /// 語義キーの数を返します。
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// 索引が空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// キーに対応する見出し語集合を返します。
    pub fn get(&self, key: &MeaningKey) -> Option<&HashSet<String>> {
        self.groups.get(key)
    }

    /// エントリを挿入順で反復します。
    pub fn iter(&self) -> impl Iterator<Item = (&MeaningKey, &HashSet<String>)> {
        self.groups.iter()
    }
}

/// 同じ語の番号違いが既にグループに含まれるかを判定する
///
/// 候補の正規化見出し語に空白と数字が続くメンバーが既にあれば、
/// 候補は同一語の別語義とみなされます。
fn has_numbered_twin(lemma_clean: &str, members: &HashSet<String>) -> bool {
    members.iter().any(|member| {
        member
            .strip_prefix(lemma_clean)
            .and_then(|rest| rest.strip_prefix(' '))
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
    })
}

/// 語義フィールド全体が同一のグループを探します。
///
/// 同義語探索パスと異なり、語義を下位語義に分割せず、フィールド全体を
/// 正規化して比較します。名詞の品詞（masc、fem、nt）は`noun`に集約され、
/// 文法フィルターは格マーカーのみです。2語以上のグループだけが返されます。
///
/// # 引数
///
/// * `records` - 全見出し語レコード
/// * `exceptions` - 例外ストア
///
/// # 戻り値
///
/// 語義キーと見出し語リストの組を、最初に出現した順で返します。
pub fn find_identical_meanings(
    records: &[Headword],
    exceptions: &ExceptionStore,
) -> Vec<(MeaningKey, Vec<String>)> {
    let mut groups: OrderedMap<MeaningKey, Vec<String>> = OrderedMap::new();

    for rec in records {
        if rec.meaning.is_empty() {
            continue;
        }
        if EXCLUDED_POS.contains(&rec.pos.as_str()) {
            continue;
        }
        if CASE_MARKERS.is_match(&rec.grammar) {
            continue;
        }
        let meaning = clean_meaning(&rec.meaning);
        if meaning.is_empty() {
            continue;
        }
        let pos = if NOUN_POS.contains(&rec.pos.as_str()) {
            "noun"
        } else {
            rec.pos.as_str()
        };
        let key = MeaningKey::new(pos, meaning);
        if exceptions.contains(&key.to_string()) {
            continue;
        }
        groups
            .get_or_insert_with(key, Vec::new)
            .push(rec.lemma.clone());
    }

    groups.retain(|_, members| members.len() >= 2);
    log::info!("identical meanings: {} groups", groups.len());

    groups
        .iter()
        .map(|(key, members)| (key.clone(), members.clone()))
        .collect()
}
