//! ユーティリティ型と補助関数
//!
//! このモジュールには、挿入順を保持するマップと、オペレーター向けの
//! 検索文字列の生成関数が含まれています。

use std::hash::Hash;

use hashbrown::HashMap;

use crate::sort::pali_sorted;

/// 挿入順を保持するマップ
///
/// グループ化と照合のパスは、固定入力に対して再現可能な反復順序を
/// 要求します。ハッシュマップの反復順序は不定なため、エントリを
/// 挿入順のベクターに保持し、キーの検索のみハッシュマップで行います。
#[derive(Debug)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// 空のマップを作成します。
    pub fn new() -> Self {
        Self {
            entries: vec![],
            index: HashMap::new(),
        }
    }

    /// エントリ数を返します。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// マップが空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// キーが存在するかを判定します。
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// キーに対応する値を返します。
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// キーに対応する値への可変参照を返します。
    ///
    /// キーが存在しない場合は`default`で生成した値を挿入します。
    /// 新しいキーはマップの末尾に追加され、挿入順が保たれます。
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        match self.index.get(&key) {
            Some(&i) => &mut self.entries[i].1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, default()));
                &mut self.entries.last_mut().unwrap().1
            }
        }
    }

    /// エントリを挿入順で反復します。
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// 述語を満たすエントリのみを挿入順で残します。
    pub fn retain<F>(&mut self, mut pred: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.entries.retain(|(k, v)| pred(k, v));
        self.index.clear();
        for (i, (k, _)) in self.entries.iter().enumerate() {
            self.index.insert(k.clone(), i);
        }
    }
}

impl<K, V> Default for OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// グループの見出し語から外部検索ツール向けの検索文字列を生成します。
///
/// 見出し語をパーリ語アルファベット順に並べた選択式の正規表現を返します。
/// オペレーターが検索ボックスに貼り付けるための読み取り専用の便宜機能で、
/// 正確性には関与しません。
///
/// # 例
///
/// ```
/// # use palilex::utils::db_search_string;
/// let s = db_search_string(vec!["sacca".to_string(), "dhamma".to_string()]);
/// assert_eq!(s, "/^(dhamma|sacca)$/");
/// ```
pub fn db_search_string<I>(lemmas: I) -> String
where
    I: IntoIterator<Item = String>,
{
    format!("/^({})$/", pali_sorted(lemmas).join("|"))
}
