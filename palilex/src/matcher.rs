//! 二重語義の照合
//!
//! このモジュールは、単一語義索引から「同じ品詞で2つ以上の語義を共有する
//! 見出し語の組」を探します。品詞ごとにキーを分け、各バケット内で順序なし
//! ペアを総当たりし、共通部分が2語以上のペアを候補として採用します。

use hashbrown::HashSet;

use crate::index::{MeaningKey, SingleMeaningIndex};
use crate::utils::OrderedMap;

/// 進捗を記録する外側ループの間隔
const PROGRESS_INTERVAL: usize = 2500;

/// 二重語義候補の挿入順保持のマップ
///
/// キーは`"pos:meaning1:meaning2"`、値は2つの語義グループの共通部分です。
/// 反復順序は最初に条件を満たしたペアの発見順で、固定入力に対して
/// 再現可能です。中断・再開のワークフローが決定的に再現されるためには、
/// この順序が安定であることが必要です。
pub struct DualMatches {
    groups: Vec<(String, HashSet<String>)>,
}

impl DualMatches {
    /// 候補数を返します。
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// 候補が存在しないかどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 候補を発見順で反復します。
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashSet<String>)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// 単一語義索引から二重語義候補を探します。
///
/// 品詞が同じで語義が異なるキーの順序なしペアすべてについて、見出し語
/// 集合の共通部分を計算します。共通部分が2語以上のペアだけが候補に
/// なります。既に同一の共通部分（値集合として等しいもの）が別のペアで
/// 発見されている場合、後のペアはスキップされます。
///
/// 計算量は品詞バケットごとの語義キー数に対してO(n²)です。品詞を
/// 跨いだ比較を避けるため、先にキーを品詞ごとに分けます。
///
/// # 引数
///
/// * `index` - 単一語義索引
///
/// # 戻り値
///
/// 発見順の二重語義候補
pub fn find_dual_meanings(index: &SingleMeaningIndex) -> DualMatches {
    let mut buckets: OrderedMap<String, Vec<(&MeaningKey, &HashSet<String>)>> = OrderedMap::new();
    for (key, members) in index.iter() {
        buckets
            .get_or_insert_with(key.pos.clone(), Vec::new)
            .push((key, members));
    }

    let mut groups: Vec<(String, HashSet<String>)> = vec![];
    let mut done: HashSet<Vec<&str>> = HashSet::new();
    let mut counter = 0;

    for (pos, keys) in buckets.iter() {
        for (i, (key1, members1)) in keys.iter().enumerate() {
            if counter % PROGRESS_INTERVAL == 0 {
                log::info!(
                    "matching {} / {} ({} {})",
                    counter,
                    index.len(),
                    pos,
                    key1.meaning,
                );
            }
            counter += 1;

            for (key2, members2) in &keys[i + 1..] {
                // distinct keys in one pos bucket always differ in meaning
                let intersection: HashSet<&str> = members1
                    .intersection(members2)
                    .map(String::as_str)
                    .collect();
                if intersection.len() < 2 {
                    continue;
                }

                let mut fingerprint: Vec<&str> = intersection.iter().copied().collect();
                fingerprint.sort_unstable();
                if done.contains(&fingerprint) {
                    continue;
                }

                let pair_key = format!("{}:{}:{}", pos, key1.meaning, key2.meaning);
                groups.push((
                    pair_key,
                    intersection.iter().map(|s| s.to_string()).collect(),
                ));
                done.insert(fingerprint);
            }
        }
    }

    log::info!("dual meanings: {} candidates", groups.len());
    DualMatches { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exceptions::ExceptionStore;
    use crate::headword::Headword;

    fn word(id: u32, lemma: &str, pos: &str, meaning: &str) -> Headword {
        Headword {
            id,
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            meaning: meaning.to_string(),
            ..Headword::default()
        }
    }

    fn matches_for(records: &[Headword]) -> DualMatches {
        let index = SingleMeaningIndex::build(records, &ExceptionStore::in_memory());
        find_dual_meanings(&index)
    }

    #[test]
    fn test_pair_intersection_of_two_qualifies() {
        let records = vec![
            word(1, "dhamma", "masc", "law; truth"),
            word(2, "sacca", "masc", "law; truth"),
            word(3, "vinaya", "masc", "law"),
        ];
        let matches = matches_for(&records);
        assert_eq!(matches.len(), 1);

        let (key, members) = matches.iter().next().unwrap();
        assert_eq!(key, "masc:law:truth");
        assert_eq!(members.len(), 2);
        assert!(members.contains("dhamma"));
        assert!(members.contains("sacca"));
    }

    #[test]
    fn test_single_shared_meaning_is_not_enough() {
        // dhamma and sacca share only "truth": one meaning key with two
        // members, but no second key intersecting in both words
        let records = vec![
            word(1, "dhamma", "masc", "law; truth"),
            word(2, "sacca", "masc", "truth"),
            word(3, "vinaya", "masc", "discipline"),
        ];
        let matches = matches_for(&records);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_pos_buckets_never_mix() {
        let records = vec![
            word(1, "dhamma", "masc", "law; truth"),
            word(2, "sacca", "nt", "law; truth"),
        ];
        let matches = matches_for(&records);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_identical_intersection_emitted_once() {
        // three shared meanings produce three key pairs, but one member set
        let records = vec![
            word(1, "dhamma", "masc", "law; truth; teaching"),
            word(2, "sacca", "masc", "law; truth; teaching"),
        ];
        let matches = matches_for(&records);
        assert_eq!(matches.len(), 1);
        let (key, _) = matches.iter().next().unwrap();
        assert_eq!(key, "masc:law:truth");
    }

    #[test]
    fn test_insertion_order_is_reproducible() {
        let records = vec![
            word(1, "a", "masc", "m1; m2"),
            word(2, "b", "masc", "m1; m2"),
            word(3, "c", "masc", "m3; m4"),
            word(4, "d", "masc", "m3; m4"),
        ];
        let first: Vec<String> = matches_for(&records)
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        let second: Vec<String> = matches_for(&records)
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(first, &["masc:m1:m2", "masc:m3:m4"]);
        assert_eq!(first, second);
    }
}
