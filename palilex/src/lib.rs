//! # palilex
//!
//! palilexは、パーリ語語彙データベースの同義語・異綴語リンクエンジンです。
//!
//! ## 概要
//!
//! このライブラリは、見出し語テーブル全体を走査し、品詞と正規化済み
//! 語義でグループ化して、語義を共有する見出し語（同義語・異綴語の候補）を
//! 検出します。候補グループはオペレーターの判断によって、各レコードの
//! 相互参照フィールドに書き戻されます。
//!
//! ## 主な機能
//!
//! - **語義の正規化**: 註釈語義と括弧内の挿入句の除去
//! - **単一語義索引**: 文法フィルターと同形語抑制付きのグループ化
//! - **二重語義照合**: 品詞バケット内の総当たりによる候補検出
//! - **照合エンジン**: 注入された判断関数によるヘッドレス実行
//! - **例外ストア**: 実行を跨いで永続化される否定リスト
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use palilex::{
//!     Decision, ExceptionStore, Headword, MemoryStore, Reconciler,
//!     SingleMeaningIndex, find_dual_meanings,
//! };
//!
//! let records = vec![
//!     Headword {
//!         id: 1,
//!         lemma: "dhamma".into(),
//!         pos: "masc".into(),
//!         meaning: "nature; truth".into(),
//!         ..Headword::default()
//!     },
//!     Headword {
//!         id: 2,
//!         lemma: "sabhāva".into(),
//!         pos: "masc".into(),
//!         meaning: "nature; truth".into(),
//!         ..Headword::default()
//!     },
//! ];
//!
//! let mut exceptions = ExceptionStore::in_memory();
//! let index = SingleMeaningIndex::build(&records, &exceptions);
//! let matches = find_dual_meanings(&index);
//! assert_eq!(matches.len(), 1);
//!
//! let mut store = MemoryStore::new(records);
//! let mut engine = Reconciler::new(&mut store, &mut exceptions);
//! let summary = engine.run(&matches, &mut |_group| Decision::Synonym)?;
//! assert_eq!(summary.synonyms_applied, 1);
//! assert_eq!(store.records()[0].synonym, "sabhāva");
//! # Ok(())
//! # }
//! ```

/// 共通のシリアライゼーション設定
pub mod common;

/// エラー型の定義
pub mod errors;

/// 例外ストア
pub mod exceptions;

/// 見出し語レコード
pub mod headword;

/// 単一語義索引
pub mod index;

/// 二重語義の照合
pub mod matcher;

/// 語義テキストの正規化
pub mod meaning;

/// 照合エンジン
pub mod reconcile;

/// パーリ語の照合順序
pub mod sort;

/// 見出し語ストア
pub mod store;

/// ユーティリティ型と補助関数
pub mod utils;


// Re-exports
pub use errors::{PalilexError, Result};
pub use exceptions::ExceptionStore;
pub use headword::Headword;
pub use index::{MeaningKey, SingleMeaningIndex, find_identical_meanings};
pub use matcher::{DualMatches, find_dual_meanings};
pub use meaning::clean_meaning;
pub use reconcile::{Decision, GroupView, Outcome, Reconciler, RunSummary};
pub use sort::{pali_sort_key, pali_sorted};
pub use store::{FileStore, MemoryStore, WordStore};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
