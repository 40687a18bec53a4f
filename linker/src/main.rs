//! 同義語・異綴語リンカーのメインエントリーポイント
//!
//! このモジュールは、語彙データベースの相互参照フィールドを整備するための
//! サブコマンドを提供します。下位語義単位の照合、語義全体単位の照合、
//! TSVからのストア構築を統合したCLIツールです。

mod identical;
mod import;
mod link;
mod prompt;

use std::fs::File;

use clap::Parser;
use simplelog::{Config, LevelFilter, WriteLogger};
use thiserror::Error;

use crate::{identical::IdenticalError, import::ImportError, link::LinkError};

/// 監査ログの出力先
const LOG_FILE: &str = "linker.log";

/// コマンドライン引数の構造体
///
/// `clap`を使用してコマンドライン引数をパースします。
#[derive(Parser, Debug)]
#[clap(name = "linker", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// 下位語義を2つ以上共有する見出し語を対話的にリンクします
    ///
    /// 語義を`"; "`で分割して索引を作り、品詞ごとの総当たりで候補を
    /// 検出します。
    Link(link::Args),

    /// 語義フィールド全体が同一の見出し語を対話的にリンクします
    ///
    /// 語義を分割せず、フィールド全体の正規形で直接グループ化します。
    Identical(identical::Args),

    /// 見出し語TSVからバイナリの語彙ストアを構築します
    Import(import::Args),
}

/// リンカーの実行中に発生する可能性のあるエラー
///
/// 各サブコマンドで発生したエラーをラップします。
#[derive(Debug, Error)]
pub enum LinkerError {
    /// 下位語義照合中のエラー
    #[error(transparent)]
    Link(#[from] LinkError),
    /// 語義全体照合中のエラー
    #[error(transparent)]
    Identical(#[from] IdenticalError),
    /// ストア構築中のエラー
    #[error(transparent)]
    Import(#[from] ImportError),
    /// ログファイルの作成エラー
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// メイン関数
///
/// 監査ログを初期化し、コマンドライン引数をパースして、指定された
/// サブコマンドを実行します。
///
/// # 戻り値
///
/// 実行が成功した場合は`Ok(())`、失敗した場合は対応する`LinkerError`を返します。
fn main() -> Result<(), LinkerError> {
    let cli = Cli::parse();

    // decisions are audited to a file so the prompt stays readable
    let _ = WriteLogger::init(
        LevelFilter::Info,
        Config::default(),
        File::create(LOG_FILE)?,
    );

    match cli.command {
        Command::Link(args) => Ok(link::run(args)?),
        Command::Identical(args) => Ok(identical::run(args)?),
        Command::Import(args) => Ok(import::run(args)?),
    }
}
