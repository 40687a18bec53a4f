//! 見出し語レコード
//!
//! このモジュールは、語彙データベースの1行に対応する見出し語レコードと、
//! その派生プロパティを定義します。同義語・異綴語フィールドは本エンジンが
//! 書き換える唯一のフィールドです。

use std::sync::LazyLock;

use bincode::{Decode, Encode};
use regex::Regex;

/// 見出し語末尾の番号サフィックス（` 1`、` 2.1`など）
static NUMBERED_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" \d.*$").unwrap());

/// 見出し語レコード
///
/// 語彙データベースの1エントリを表します。`synonym`と`variant`は
/// カンマ区切りのテキストフィールドで、照合エンジンのみが書き換えます。
/// それ以外のフィールドはこのサブシステムにとって不変です。
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct Headword {
    /// レコードの一意な識別子
    pub id: u32,

    /// 見出し語（同形異義語は` 1`、` 2`の番号サフィックスで区別される）
    pub lemma: String,

    /// 品詞
    pub pos: String,

    /// 文法注記（格・人称マーカーを含み得る自由テキスト）
    pub grammar: String,

    /// 語義（`"; "`区切りの複数の下位語義）
    pub meaning: String,

    /// 同義語リスト（`", "`区切り）
    pub synonym: String,

    /// 異綴語リスト（`", "`区切り）
    pub variant: String,
}

impl Headword {
    /// 番号サフィックスを取り除いた見出し語を返します。
    ///
    /// # 例
    ///
    /// ```
    /// # use palilex::headword::Headword;
    /// let mut word = Headword::default();
    /// word.lemma = "deva 1".to_string();
    /// assert_eq!(word.lemma_clean(), "deva");
    /// ```
    pub fn lemma_clean(&self) -> String {
        NUMBERED_SUFFIX.replace(&self.lemma, "").into_owned()
    }

    /// 同義語フィールドをリストに分解して返します。
    ///
    /// フィールドが空の場合は空のベクターを返します。
    pub fn synonym_list(&self) -> Vec<String> {
        split_joined(&self.synonym)
    }

    /// 異綴語フィールドをリストに分解して返します。
    ///
    /// フィールドが空の場合は空のベクターを返します。
    pub fn variant_list(&self) -> Vec<String> {
        split_joined(&self.variant)
    }

    /// 同義語リストを設定します。
    pub fn set_synonyms(&mut self, synonyms: &[String]) {
        self.synonym = synonyms.join(", ");
    }

    /// 異綴語リストを設定します。
    pub fn set_variants(&mut self, variants: &[String]) {
        self.variant = variants.join(", ");
    }
}

/// カンマ区切りフィールドをリストに分解する
fn split_joined(field: &str) -> Vec<String> {
    if field.is_empty() {
        return vec![];
    }
    field.split(", ").map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(lemma: &str) -> Headword {
        Headword {
            lemma: lemma.to_string(),
            ..Headword::default()
        }
    }

    #[test]
    fn test_lemma_clean_strips_numbered_suffix() {
        assert_eq!(word("deva 1").lemma_clean(), "deva");
        assert_eq!(word("deva 2.1").lemma_clean(), "deva");
        assert_eq!(word("deva").lemma_clean(), "deva");
    }

    #[test]
    fn test_empty_synonym_field_yields_empty_list() {
        assert!(word("deva").synonym_list().is_empty());
    }

    #[test]
    fn test_synonym_list_roundtrip() {
        let mut w = word("dhamma");
        w.set_synonyms(&["sacca".to_string(), "naya".to_string()]);
        assert_eq!(w.synonym, "sacca, naya");
        assert_eq!(w.synonym_list(), &["sacca", "naya"]);
    }
}
