//! 下位語義照合のサブコマンド
//!
//! このモジュールは、下位語義を2つ以上共有する見出し語グループを
//! 検出し、対話的に同義語・異綴語フィールドへ書き戻します。

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use palilex::errors::PalilexError;
use palilex::{
    find_dual_meanings, ExceptionStore, FileStore, Reconciler, SingleMeaningIndex, WordStore,
};

use crate::prompt;

/// 下位語義照合コマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "link",
    about = "A program to link synonyms and variants interactively."
)]
pub struct Args {
    /// Word store file (bincode).
    #[clap(short = 'd', long)]
    db_in: PathBuf,

    /// Exceptions file. Created on the first `except` decision if absent.
    #[clap(short = 'e', long)]
    exceptions_in: PathBuf,
}

/// 下位語義照合中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// エンジンのエラー
    #[error("Linking failed: {0}")]
    Palilex(#[from] PalilexError),
}

/// 下位語義照合コマンドを実行する
///
/// ストアと例外リストを読み込み、索引の構築、候補の照合、対話的な
/// 書き戻しを行います。
///
/// # 引数
///
/// * `args` - コマンドの引数
///
/// # エラー
///
/// ストアの読み込みに失敗した場合は何も変更せずにエラーを返します。
/// 個々のグループのコミット失敗は実行を止めず、集計に現れます。
pub fn run(args: Args) -> Result<(), LinkError> {
    let start = Instant::now();

    println!("Loading the word store...");
    let mut store = FileStore::open(&args.db_in)?;
    let mut exceptions = ExceptionStore::load(&args.exceptions_in)?;
    let records = store.fetch_all()?;
    println!("{} headwords, {} exceptions", records.len(), exceptions.len());

    println!("Finding single meanings...");
    let index = SingleMeaningIndex::build(&records, &exceptions);
    println!("{} meaning keys", index.len());

    println!("Finding dual meanings...");
    let matches = find_dual_meanings(&index);
    println!("{} candidate groups", matches.len());

    let mut engine = Reconciler::new(&mut store, &mut exceptions);
    let summary = engine.run(&matches, &mut prompt::ask)?;

    prompt::print_summary(&summary);
    println!("Finished in {:.2?}", start.elapsed());
    Ok(())
}
