//! 索引→照合→書き戻しの一連の流れに関するテスト
//!
//! スクリプト化された判断関数を使い、対話なしでエンジン全体を検証します。

use hashbrown::HashSet;

use crate::exceptions::ExceptionStore;
use crate::headword::Headword;
use crate::index::SingleMeaningIndex;
use crate::matcher::find_dual_meanings;
use crate::reconcile::{Decision, Reconciler};
use crate::store::{FileStore, MemoryStore, WordStore};

fn word(id: u32, lemma: &str, pos: &str, meaning: &str) -> Headword {
    Headword {
        id,
        lemma: lemma.to_string(),
        pos: pos.to_string(),
        meaning: meaning.to_string(),
        ..Headword::default()
    }
}

/// 3語のコーパスでは語義キーの共有が1つしかなく、候補は出ない
///
/// 2語以上の共通部分という閾値は「ペア」単位で強制される。単一の
/// グループに2語あるだけでは不十分。
#[test]
fn test_three_word_corpus_yields_no_candidate() {
    let records = vec![
        word(1, "dhamma", "masc", "law; truth"),
        word(2, "sacca", "masc", "truth"),
        word(3, "vinaya", "masc", "discipline"),
    ];
    let exceptions = ExceptionStore::in_memory();
    let index = SingleMeaningIndex::build(&records, &exceptions);

    let truth: HashSet<String> = ["dhamma".to_string(), "sacca".to_string()]
        .into_iter()
        .collect();
    assert_eq!(
        index.get(&crate::index::MeaningKey::new("masc", "truth")),
        Some(&truth),
    );

    let matches = find_dual_meanings(&index);
    assert!(matches.is_empty());
}

/// 同義語判断が全メンバーに相互参照を書き込み、再実行では提示されない
#[test]
fn test_synonym_decision_then_already_satisfied() {
    let records = vec![
        word(1, "dhamma", "masc", "nature; truth"),
        word(2, "sabhāva", "masc", "nature; truth"),
        word(3, "vinaya", "masc", "discipline"),
    ];
    let mut exceptions = ExceptionStore::in_memory();
    let index = SingleMeaningIndex::build(&records, &exceptions);
    let matches = find_dual_meanings(&index);
    assert_eq!(matches.len(), 1);

    let mut store = MemoryStore::new(records);

    let mut engine = Reconciler::new(&mut store, &mut exceptions);
    let summary = engine
        .run(&matches, &mut |_| Decision::Synonym)
        .unwrap();
    assert_eq!(summary.synonyms_applied, 1);
    assert_eq!(store.records()[0].synonym, "sabhāva");
    assert_eq!(store.records()[1].synonym, "dhamma");

    // second run: the relation is already recorded, decision not asked
    let mut calls = 0;
    let mut engine = Reconciler::new(&mut store, &mut exceptions);
    let summary = engine
        .run(&matches, &mut |_| {
            calls += 1;
            Decision::Pass
        })
        .unwrap();
    assert_eq!(calls, 0);
    assert_eq!(summary.already_satisfied, 1);
}

/// 例外判断はディスクに永続化され、次の実行の索引から語義を除外する
#[test]
fn test_exception_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exceptions.bin");

    let records = vec![
        word(1, "dhamma", "masc", "truth"),
        word(2, "sacca", "masc", "truth"),
    ];

    {
        let mut exceptions = ExceptionStore::load(&path).unwrap();
        let mut store = MemoryStore::new(records.clone());
        let mut engine = Reconciler::new(&mut store, &mut exceptions);
        let lemmas: HashSet<String> = ["dhamma".to_string(), "sacca".to_string()]
            .into_iter()
            .collect();
        engine
            .reconcile(&lemmas, "masc:truth", &mut |_| Decision::Except)
            .unwrap();
    }

    // a fresh process loads the exception and never groups the key again
    let exceptions = ExceptionStore::load(&path).unwrap();
    assert!(exceptions.contains("masc:truth"));
    let index = SingleMeaningIndex::build(&records, &exceptions);
    assert!(index.is_empty());
}

/// ファイルストア上での適用は実行を跨いで残る
#[test]
fn test_file_store_commits_persist() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("words.bin");

    let records = vec![
        word(1, "dhamma", "masc", "nature; truth"),
        word(2, "sabhāva", "masc", "nature; truth"),
    ];
    FileStore::create(&db_path, records).unwrap();

    {
        let mut store = FileStore::open(&db_path).unwrap();
        let mut exceptions = ExceptionStore::in_memory();
        let all = store.fetch_all().unwrap();
        let index = SingleMeaningIndex::build(&all, &exceptions);
        let matches = find_dual_meanings(&index);

        let mut engine = Reconciler::new(&mut store, &mut exceptions);
        engine.run(&matches, &mut |_| Decision::Variant).unwrap();
    }

    let reopened = FileStore::open(&db_path).unwrap();
    let all = reopened.fetch_all().unwrap();
    assert_eq!(all[0].variant, "sabhāva");
    assert_eq!(all[1].variant, "dhamma");
}

/// 保留は何も書き換えず、集計にのみ現れる
#[test]
fn test_pass_leaves_records_untouched() {
    let records = vec![
        word(1, "dhamma", "masc", "nature; truth"),
        word(2, "sabhāva", "masc", "nature; truth"),
    ];
    let mut exceptions = ExceptionStore::in_memory();
    let index = SingleMeaningIndex::build(&records, &exceptions);
    let matches = find_dual_meanings(&index);

    let mut store = MemoryStore::new(records);
    let mut engine = Reconciler::new(&mut store, &mut exceptions);
    let summary = engine.run(&matches, &mut |_| Decision::Pass).unwrap();

    assert_eq!(summary.passed, 1);
    assert_eq!(summary.presented, 1);
    for rec in store.records() {
        assert!(rec.synonym.is_empty());
        assert!(rec.variant.is_empty());
    }
}
