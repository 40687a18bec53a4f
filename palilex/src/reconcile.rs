//! 照合エンジン
//!
//! このモジュールは、語義を共有する見出し語グループを1つずつ提示し、
//! オペレーターの判断（同義語・異綴語・手動・例外・保留・中断）を
//! レコードに適用します。判断は注入された関数として受け取るため、
//! 対話的なプロンプトにもテスト用のスクリプト化された判断にも
//! 同じエンジンが使えます。
//!
//! コミットはグループ単位です。あるグループの適用に失敗しても、
//! それ以前にコミットされたグループは巻き戻されません。

use std::str::FromStr;

use hashbrown::HashSet;

use crate::errors::Result;
use crate::exceptions::ExceptionStore;
use crate::headword::Headword;
use crate::index::MeaningKey;
use crate::matcher::DualMatches;
use crate::sort::{pali_sort_key, pali_sorted};
use crate::store::WordStore;
use crate::utils::db_search_string;

/// 照合の進捗を記録するグループ数の間隔
const PROGRESS_INTERVAL: usize = 100;

/// グループに対するオペレーターの判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// グループ全体を相互の同義語として登録する
    Synonym,

    /// グループ全体を相互の異綴語として登録する
    Variant,

    /// 複雑なので手動で編集する（レコードは変更しない）
    Manual,

    /// このキーを例外リストに追加し、以後提示しない
    Except,

    /// 何もせず次のグループへ進む
    Pass,

    /// この実行の残りのグループの処理を中止する
    Abort,
}

impl FromStr for Decision {
    type Err = &'static str;

    /// 選択肢の頭文字または完全な単語から判断をパースする
    ///
    /// # 引数
    ///
    /// * `choice` - `"s"`、`"v"`、`"m"`、`"e"`、`"p"`、`"b"`のいずれか
    ///   （または対応する完全な単語）
    fn from_str(choice: &str) -> Result<Self, Self::Err> {
        match choice {
            "s" | "synonym" => Ok(Self::Synonym),
            "v" | "variant" => Ok(Self::Variant),
            "m" | "manual" => Ok(Self::Manual),
            "e" | "except" => Ok(Self::Except),
            "p" | "pass" => Ok(Self::Pass),
            "b" | "break" | "abort" => Ok(Self::Abort),
            _ => Err("Could not parse a decision"),
        }
    }
}

/// 1つのグループに対する照合の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 関係が既に記録されており、判断を求めなかった
    AlreadySatisfied,

    /// 同義語リストを更新してコミットした
    SynonymApplied,

    /// 異綴語リストを更新してコミットした
    VariantApplied,

    /// 手動編集のために記録した（レコードは未変更）
    ManualNoted,

    /// キーを例外リストに追加した
    Excepted,

    /// キーが例外リストに含まれており、判断を求めなかった
    Excluded,

    /// 保留した
    Skipped,

    /// 実行の中止が要求された
    Aborted,
}

/// 提示用にレンダリングされたグループの1メンバー
#[derive(Debug, Clone)]
pub struct MemberView {
    /// 見出し語
    pub lemma: String,

    /// 品詞
    pub pos: String,

    /// 語義
    pub meaning: String,

    /// 現在の同義語リスト
    pub synonyms: Vec<String>,

    /// 現在の異綴語リスト
    pub variants: Vec<String>,
}

/// 提示用にレンダリングされたグループ
///
/// 判断関数に渡される、グループの純粋なデータ射影です。メンバーは
/// パーリ語アルファベット順に並びます。
#[derive(Debug, Clone)]
pub struct GroupView {
    /// グループのキー（`"pos:meaning1:meaning2"`または`"pos:meaning"`）
    pub key: String,

    /// グループのメンバー
    pub members: Vec<MemberView>,

    /// 番号サフィックスを除いた見出し語（候補の同義語/異綴語リスト）
    pub clean_lemmas: Vec<String>,

    /// グループ全体の既存の同義語の和集合
    pub synonyms: Vec<String>,

    /// グループ全体の既存の異綴語の和集合
    pub variants: Vec<String>,

    /// 外部検索ツールに貼り付けるための検索文字列
    pub search_string: String,
}

/// 1回の実行の集計
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// 判断を求めたグループ数
    pub presented: usize,

    /// 同義語を適用したグループ数
    pub synonyms_applied: usize,

    /// 異綴語を適用したグループ数
    pub variants_applied: usize,

    /// 手動編集のために記録したグループ数
    pub manual_noted: usize,

    /// 例外に追加したグループ数
    pub excepted: usize,

    /// 保留したグループ数
    pub passed: usize,

    /// 既に記録済みでスキップしたグループ数
    pub already_satisfied: usize,

    /// 例外リストによりスキップしたグループ数
    pub excluded: usize,

    /// コミットに失敗したグループ数
    pub failed_groups: usize,

    /// 実行が中断されたかどうか
    pub aborted: bool,
}

/// 更新対象の関係
enum Relation {
    Synonym,
    Variant,
}

/// 見出し語グループをレコードに照合するエンジン
///
/// ストアと例外ストアへの可変アクセスを保持し、グループごとに
/// 判断関数を呼び出して結果を適用します。
pub struct Reconciler<'a, S> {
    store: &'a mut S,
    exceptions: &'a mut ExceptionStore,
}

impl<'a, S> Reconciler<'a, S>
where
    S: WordStore,
{
    /// 新しいエンジンを作成します。
    ///
    /// # 引数
    ///
    /// * `store` - 見出し語ストア
    /// * `exceptions` - 例外ストア
    pub fn new(store: &'a mut S, exceptions: &'a mut ExceptionStore) -> Self {
        Self { store, exceptions }
    }

    /// 二重語義候補をすべて処理します。
    ///
    /// グループは照合パスの発見順に処理されます。中断の判断は各グループの
    /// 処理開始時にのみ反映され、適用途中のコミットを割り込むことは
    /// ありません。あるグループのコミット失敗は記録された上で、後続の
    /// グループの処理は継続されます。
    ///
    /// # 引数
    ///
    /// * `matches` - 照合パスの出力
    /// * `decide` - グループごとの判断関数
    ///
    /// # 戻り値
    ///
    /// 実行の集計
    pub fn run<D>(&mut self, matches: &DualMatches, decide: &mut D) -> Result<RunSummary>
    where
        D: FnMut(&GroupView) -> Decision,
    {
        let mut summary = RunSummary::default();

        for (counter, (key, lemmas)) in matches.iter().enumerate() {
            if counter % PROGRESS_INTERVAL == 0 {
                log::info!("reconciling {} / {} ({})", counter, matches.len(), key);
            }

            match self.reconcile(lemmas, key, decide) {
                Ok(Outcome::Aborted) => {
                    summary.aborted = true;
                    let remaining = matches.len() - counter - 1;
                    log::info!("aborted: {} groups left unprocessed", remaining);
                    break;
                }
                Ok(outcome) => summary.tally(outcome),
                Err(e) => {
                    // earlier commits stand; keep going with the next group
                    log::warn!("group {}: {}", key, e);
                    summary.failed_groups += 1;
                }
            }
        }

        Ok(summary)
    }

    /// 同一語義グループをすべて処理します。
    ///
    /// [`run()`](Self::run)と同じ手順で、語義全体パスのグループを
    /// 処理します。
    ///
    /// # 引数
    ///
    /// * `groups` - [`find_identical_meanings()`](crate::index::find_identical_meanings)の出力
    /// * `decide` - グループごとの判断関数
    pub fn run_identical<D>(
        &mut self,
        groups: &[(MeaningKey, Vec<String>)],
        decide: &mut D,
    ) -> Result<RunSummary>
    where
        D: FnMut(&GroupView) -> Decision,
    {
        let mut summary = RunSummary::default();

        for (counter, (key, members)) in groups.iter().enumerate() {
            let key = key.to_string();
            let lemmas: HashSet<String> = members.iter().cloned().collect();

            match self.reconcile(&lemmas, &key, decide) {
                Ok(Outcome::Aborted) => {
                    summary.aborted = true;
                    let remaining = groups.len() - counter - 1;
                    log::info!("aborted: {} groups left unprocessed", remaining);
                    break;
                }
                Ok(outcome) => summary.tally(outcome),
                Err(e) => {
                    log::warn!("group {}: {}", key, e);
                    summary.failed_groups += 1;
                }
            }
        }

        Ok(summary)
    }

    /// 1つのグループを照合します。
    ///
    /// キーが例外リストに含まれる場合は、レコードを取得せずに
    /// [`Outcome::Excluded`]を返します。過去の実行の例外判断は、以後の
    /// すべての実行でグループを抑制します。グループのレコードを取得し、
    /// 関係が既に記録されていれば判断を求めずに
    /// [`Outcome::AlreadySatisfied`]を返します。そうでなければグループを
    /// レンダリングして判断関数を呼び出し、結果を適用します。
    ///
    /// # 引数
    ///
    /// * `lemmas` - グループの見出し語集合
    /// * `key` - グループのキー（例外リストへの登録にも使われる）
    /// * `decide` - 判断関数
    ///
    /// # エラー
    ///
    /// レコードの取得またはコミットに失敗した場合にエラーを返します。
    /// 例外リストの永続化失敗はエラーにせず、警告として記録されます。
    pub fn reconcile<D>(
        &mut self,
        lemmas: &HashSet<String>,
        key: &str,
        decide: &mut D,
    ) -> Result<Outcome>
    where
        D: FnMut(&GroupView) -> Decision,
    {
        if self.exceptions.contains(key) {
            log::info!("excepted earlier: {}", key);
            return Ok(Outcome::Excluded);
        }

        let mut records = self.store.fetch_by_lemmas(lemmas)?;
        records.sort_by_cached_key(|rec| pali_sort_key(&rec.lemma));

        let clean_lemmas = pali_sorted(records.iter().map(Headword::lemma_clean));
        let synonyms = joined_relation(&records, Headword::synonym_list);
        let variants = joined_relation(&records, Headword::variant_list);

        let satisfied = {
            let clean_set: HashSet<&str> = clean_lemmas.iter().map(String::as_str).collect();
            let synonym_set: HashSet<&str> = synonyms.iter().map(String::as_str).collect();
            let variant_set: HashSet<&str> = variants.iter().map(String::as_str).collect();
            clean_set.is_subset(&synonym_set) || clean_set.is_subset(&variant_set)
        };
        if satisfied {
            log::info!("already satisfied: {} ({} words)", key, records.len());
            return Ok(Outcome::AlreadySatisfied);
        }

        let view = render_group(key, &records, clean_lemmas, synonyms, variants);

        match decide(&view) {
            Decision::Synonym => {
                self.apply(&mut records, &view.clean_lemmas, Relation::Synonym)?;
                log::info!("synonyms applied: {} ({} words)", key, records.len());
                Ok(Outcome::SynonymApplied)
            }
            Decision::Variant => {
                self.apply(&mut records, &view.clean_lemmas, Relation::Variant)?;
                log::info!("variants applied: {} ({} words)", key, records.len());
                Ok(Outcome::VariantApplied)
            }
            Decision::Manual => {
                log::info!(
                    "manual edit noted: {} ({})",
                    key,
                    view.clean_lemmas.join(", "),
                );
                Ok(Outcome::ManualNoted)
            }
            Decision::Except => {
                if let Err(e) = self.exceptions.add(key.to_string()) {
                    // the in-memory entry still suppresses this key for
                    // the rest of the run
                    log::warn!("could not persist exception {}: {}", key, e);
                }
                log::info!("excepted: {}", key);
                Ok(Outcome::Excepted)
            }
            Decision::Pass => Ok(Outcome::Skipped),
            Decision::Abort => Ok(Outcome::Aborted),
        }
    }

    /// グループの関係をレコードに適用して1回でコミットする
    fn apply(
        &mut self,
        records: &mut [Headword],
        clean_lemmas: &[String],
        relation: Relation,
    ) -> Result<()> {
        for rec in records.iter_mut() {
            let mut members: HashSet<String> = clean_lemmas.iter().cloned().collect();
            let own = rec.lemma_clean();
            match relation {
                Relation::Synonym => {
                    members.extend(rec.synonym_list());
                    members.remove(&own);
                    for variant in rec.variant_list() {
                        members.remove(&variant);
                    }
                    members.remove("");
                    rec.set_synonyms(&pali_sorted(members));
                }
                Relation::Variant => {
                    members.extend(rec.variant_list());
                    members.remove(&own);
                    for synonym in rec.synonym_list() {
                        members.remove(&synonym);
                    }
                    members.remove("");
                    rec.set_variants(&pali_sorted(members));
                }
            }
        }
        self.store.commit(records)
    }
}

impl RunSummary {
    /// グループの結果を集計に反映する
    fn tally(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::AlreadySatisfied => {
                self.already_satisfied += 1;
                return;
            }
            Outcome::Excluded => {
                self.excluded += 1;
                return;
            }
            Outcome::SynonymApplied => self.synonyms_applied += 1,
            Outcome::VariantApplied => self.variants_applied += 1,
            Outcome::ManualNoted => self.manual_noted += 1,
            Outcome::Excepted => self.excepted += 1,
            Outcome::Skipped => self.passed += 1,
            Outcome::Aborted => return,
        }
        self.presented += 1;
    }
}

/// 既存の関係リストの和集合をパーリ語順で返す
///
/// 空のエントリは寄与しません。
fn joined_relation<F>(records: &[Headword], list: F) -> Vec<String>
where
    F: Fn(&Headword) -> Vec<String>,
{
    let union: HashSet<String> = records
        .iter()
        .flat_map(|rec| list(rec))
        .filter(|entry| !entry.is_empty())
        .collect();
    pali_sorted(union)
}

/// 判断関数に渡すグループの射影を構築する
fn render_group(
    key: &str,
    records: &[Headword],
    clean_lemmas: Vec<String>,
    synonyms: Vec<String>,
    variants: Vec<String>,
) -> GroupView {
    let members = records
        .iter()
        .map(|rec| MemberView {
            lemma: rec.lemma.clone(),
            pos: rec.pos.clone(),
            meaning: rec.meaning.clone(),
            synonyms: rec.synonym_list(),
            variants: rec.variant_list(),
        })
        .collect();
    let search_string = db_search_string(records.iter().map(|rec| rec.lemma.clone()));

    GroupView {
        key: key.to_string(),
        members,
        clean_lemmas,
        synonyms,
        variants,
        search_string,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn word(id: u32, lemma: &str, pos: &str, meaning: &str) -> Headword {
        Headword {
            id,
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            meaning: meaning.to_string(),
            ..Headword::default()
        }
    }

    fn lemma_set(lemmas: &[&str]) -> HashSet<String> {
        lemmas.iter().map(|s| s.to_string()).collect()
    }

    fn fixed(decision: Decision) -> impl FnMut(&GroupView) -> Decision {
        move |_: &GroupView| decision
    }

    #[test]
    fn test_synonym_application() {
        let mut store = MemoryStore::new(vec![
            word(1, "dhamma", "masc", "truth"),
            word(2, "sacca", "masc", "truth"),
        ]);
        let mut exceptions = ExceptionStore::in_memory();
        let mut engine = Reconciler::new(&mut store, &mut exceptions);

        let outcome = engine
            .reconcile(
                &lemma_set(&["dhamma", "sacca"]),
                "masc:truth",
                &mut fixed(Decision::Synonym),
            )
            .unwrap();

        assert_eq!(outcome, Outcome::SynonymApplied);
        assert_eq!(store.records()[0].synonym, "sacca");
        assert_eq!(store.records()[1].synonym, "dhamma");
    }

    #[test]
    fn test_variant_application_excludes_synonyms() {
        let mut with_synonym = word(1, "dhamma", "masc", "truth");
        with_synonym.synonym = "sacca".to_string();
        let mut store = MemoryStore::new(vec![with_synonym, word(2, "sacca", "masc", "truth")]);
        let mut exceptions = ExceptionStore::in_memory();
        let mut engine = Reconciler::new(&mut store, &mut exceptions);

        engine
            .reconcile(
                &lemma_set(&["dhamma", "sacca"]),
                "masc:truth",
                &mut fixed(Decision::Variant),
            )
            .unwrap();

        // sacca is already dhamma's synonym, so it may not become a variant
        assert_eq!(store.records()[0].variant, "");
        assert_eq!(store.records()[1].variant, "dhamma");
    }

    #[test]
    fn test_already_satisfied_skips_decision() {
        let mut a = word(1, "dhamma", "masc", "truth");
        a.synonym = "naya, sacca".to_string();
        let mut b = word(2, "sacca", "masc", "truth");
        b.synonym = "dhamma".to_string();
        let mut store = MemoryStore::new(vec![a, b]);
        let mut exceptions = ExceptionStore::in_memory();
        let mut engine = Reconciler::new(&mut store, &mut exceptions);

        let mut calls = 0;
        let outcome = engine
            .reconcile(&lemma_set(&["dhamma", "sacca"]), "masc:truth", &mut |_| {
                calls += 1;
                Decision::Pass
            })
            .unwrap();

        assert_eq!(outcome, Outcome::AlreadySatisfied);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_except_records_key() {
        let mut store = MemoryStore::new(vec![
            word(1, "dhamma", "masc", "truth"),
            word(2, "sacca", "masc", "truth"),
        ]);
        let mut exceptions = ExceptionStore::in_memory();
        let mut engine = Reconciler::new(&mut store, &mut exceptions);

        let outcome = engine
            .reconcile(
                &lemma_set(&["dhamma", "sacca"]),
                "masc:truth",
                &mut fixed(Decision::Except),
            )
            .unwrap();

        assert_eq!(outcome, Outcome::Excepted);
        assert!(exceptions.contains("masc:truth"));
        // records untouched
        assert_eq!(store.records()[0].synonym, "");
    }

    #[test]
    fn test_excepted_group_never_represented() {
        let records = vec![
            word(1, "dhamma", "masc", "law; truth"),
            word(2, "sacca", "masc", "law; truth"),
        ];
        let mut exceptions = ExceptionStore::in_memory();
        let index = crate::index::SingleMeaningIndex::build(&records, &exceptions);
        let matches = crate::matcher::find_dual_meanings(&index);
        assert_eq!(matches.len(), 1);

        let mut store = MemoryStore::new(records.clone());
        let mut engine = Reconciler::new(&mut store, &mut exceptions);
        let summary = engine.run(&matches, &mut fixed(Decision::Except)).unwrap();
        assert_eq!(summary.excepted, 1);
        assert!(exceptions.contains("masc:law:truth"));

        // a later run rebuilds the same candidates, but the pair key is
        // now on the negative list and the decision is never asked
        let index = crate::index::SingleMeaningIndex::build(&records, &exceptions);
        let matches = crate::matcher::find_dual_meanings(&index);
        assert_eq!(matches.len(), 1);

        let mut engine = Reconciler::new(&mut store, &mut exceptions);
        let mut calls = 0;
        let summary = engine
            .run(&matches, &mut |_| {
                calls += 1;
                Decision::Pass
            })
            .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(summary.excluded, 1);
        assert_eq!(summary.presented, 0);
    }

    #[test]
    fn test_group_view_rendering() {
        let mut store = MemoryStore::new(vec![
            word(1, "sacca", "masc", "truth"),
            word(2, "dhamma 1", "masc", "truth"),
        ]);
        let mut exceptions = ExceptionStore::in_memory();
        let mut engine = Reconciler::new(&mut store, &mut exceptions);

        let mut seen = None;
        engine
            .reconcile(&lemma_set(&["dhamma 1", "sacca"]), "masc:truth", &mut |view| {
                seen = Some(view.clone());
                Decision::Pass
            })
            .unwrap();

        let view = seen.expect("decision invoked");
        // members in Pāli collation order, numbered suffix stripped from
        // the candidate list
        assert_eq!(view.members[0].lemma, "dhamma 1");
        assert_eq!(view.members[1].lemma, "sacca");
        assert_eq!(view.clean_lemmas, &["dhamma", "sacca"]);
        assert_eq!(view.search_string, "/^(dhamma 1|sacca)$/");
    }

    #[test]
    fn test_run_aborts_remaining_groups() {
        let records = vec![
            word(1, "a", "masc", "m1; m2"),
            word(2, "b", "masc", "m1; m2"),
            word(3, "c", "masc", "m3; m4"),
            word(4, "d", "masc", "m3; m4"),
        ];
        let index = crate::index::SingleMeaningIndex::build(
            &records,
            &ExceptionStore::in_memory(),
        );
        let matches = crate::matcher::find_dual_meanings(&index);
        assert_eq!(matches.len(), 2);

        let mut store = MemoryStore::new(records);
        let mut exceptions = ExceptionStore::in_memory();
        let mut engine = Reconciler::new(&mut store, &mut exceptions);

        let mut calls = 0;
        let summary = engine
            .run(&matches, &mut |_| {
                calls += 1;
                Decision::Abort
            })
            .unwrap();

        assert!(summary.aborted);
        assert_eq!(calls, 1);
        assert_eq!(store.records()[0].synonym, "");
    }

    #[test]
    fn test_empty_relation_entries_never_written() {
        let mut dirty = word(1, "dhamma", "masc", "truth");
        dirty.synonym = String::new();
        let mut store = MemoryStore::new(vec![dirty, word(2, "sacca", "masc", "truth")]);
        let mut exceptions = ExceptionStore::in_memory();
        let mut engine = Reconciler::new(&mut store, &mut exceptions);

        engine
            .reconcile(
                &lemma_set(&["dhamma", "sacca"]),
                "masc:truth",
                &mut fixed(Decision::Synonym),
            )
            .unwrap();

        for rec in store.records() {
            assert!(!rec.synonym.contains(", ,"));
            assert!(!rec.synonym.starts_with(", "));
            assert!(!rec.synonym.ends_with(", "));
        }
    }

    #[test]
    fn test_decision_from_str() {
        assert_eq!("s".parse::<Decision>().unwrap(), Decision::Synonym);
        assert_eq!("variant".parse::<Decision>().unwrap(), Decision::Variant);
        assert_eq!("b".parse::<Decision>().unwrap(), Decision::Abort);
        assert!("x".parse::<Decision>().is_err());
    }
}
