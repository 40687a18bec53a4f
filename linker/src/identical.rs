//! 語義全体照合のサブコマンド
//!
//! このモジュールは、語義フィールド全体が同一の見出し語グループを
//! 検出し、対話的に同義語・異綴語フィールドへ書き戻します。下位語義
//! 照合より粗く、明白な重複語義を素早く整備するためのパスです。

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use palilex::errors::PalilexError;
use palilex::{find_identical_meanings, ExceptionStore, FileStore, Reconciler, WordStore};

use crate::prompt;

/// 語義全体照合コマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "identical",
    about = "A program to link words whose whole meanings are identical."
)]
pub struct Args {
    /// Word store file (bincode).
    #[clap(short = 'd', long)]
    db_in: PathBuf,

    /// Exceptions file. Created on the first `except` decision if absent.
    #[clap(short = 'e', long)]
    exceptions_in: PathBuf,
}

/// 語義全体照合中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum IdenticalError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// エンジンのエラー
    #[error("Linking failed: {0}")]
    Palilex(#[from] PalilexError),
}

/// 語義全体照合コマンドを実行する
///
/// # 引数
///
/// * `args` - コマンドの引数
///
/// # エラー
///
/// ストアの読み込みに失敗した場合は何も変更せずにエラーを返します。
pub fn run(args: Args) -> Result<(), IdenticalError> {
    let start = Instant::now();

    println!("Loading the word store...");
    let mut store = FileStore::open(&args.db_in)?;
    let mut exceptions = ExceptionStore::load(&args.exceptions_in)?;
    let records = store.fetch_all()?;
    println!("{} headwords, {} exceptions", records.len(), exceptions.len());

    println!("Finding identical meanings...");
    let groups = find_identical_meanings(&records, &exceptions);
    println!("{} groups", groups.len());

    let mut engine = Reconciler::new(&mut store, &mut exceptions);
    let summary = engine.run_identical(&groups, &mut prompt::ask)?;

    prompt::print_summary(&summary);
    println!("Finished in {:.2?}", start.elapsed());
    Ok(())
}
