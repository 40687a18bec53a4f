//! ストア構築のサブコマンド
//!
//! このモジュールは、見出し語のTSVファイルからバイナリの語彙ストアを
//! 構築します。列は`id`、`lemma`、`pos`、`grammar`、`meaning`、
//! `synonym`、`variant`の順で、1行目のヘッダーは省略可能です。

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::num::ParseIntError;
use std::path::PathBuf;

use clap::Parser;
use csv_core::ReadFieldResult;

use palilex::errors::PalilexError;
use palilex::{FileStore, Headword};

/// 期待される列数
const FIELD_COUNT: usize = 7;

/// ストア構築コマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "import",
    about = "A program to build the binary word store from a TSV file."
)]
pub struct Args {
    /// Headword TSV file.
    #[clap(short = 'i', long)]
    tsv_in: PathBuf,

    /// File to which the binary word store is output.
    #[clap(short = 'o', long)]
    db_out: PathBuf,
}

/// ストア構築中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 列数が不正な行
    #[error("Line {0}: expected {FIELD_COUNT} fields, got {1}")]
    FieldCount(usize, usize),

    /// idが整数でない行
    #[error("Line {0}: invalid id: {1}")]
    InvalidId(usize, ParseIntError),

    /// ストアの書き込みエラー
    #[error("Writing the store failed: {0}")]
    Palilex(#[from] PalilexError),
}

/// ストア構築コマンドを実行する
///
/// TSVを1行ずつパースして見出し語レコードに変換し、ストアファイルを
/// 書き出します。
///
/// # 引数
///
/// * `args` - コマンドの引数
///
/// # エラー
///
/// 入力の読み込み、行のパース、またはストアの書き込みに失敗した場合に
/// エラーを返します。
pub fn run(args: Args) -> Result<(), ImportError> {
    println!("Reading {}...", args.tsv_in.display());

    let rdr = BufReader::new(File::open(&args.tsv_in)?);
    let mut records = vec![];
    for (i, line) in rdr.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let fields = parse_tsv_row(&line);
        if i == 0 && fields.first().is_some_and(|f| f == "id") {
            continue;
        }
        records.push(parse_record(i + 1, fields)?);
    }

    println!("Writing {} records...", records.len());
    FileStore::create(&args.db_out, records)?;

    println!("Successfully built the store to {}", args.db_out.display());
    Ok(())
}

/// 1行を見出し語レコードに変換する
fn parse_record(line_no: usize, fields: Vec<String>) -> Result<Headword, ImportError> {
    if fields.len() != FIELD_COUNT {
        return Err(ImportError::FieldCount(line_no, fields.len()));
    }
    let mut fields = fields.into_iter();
    // the field count was checked above
    let id = fields
        .next()
        .unwrap()
        .parse()
        .map_err(|e| ImportError::InvalidId(line_no, e))?;
    Ok(Headword {
        id,
        lemma: fields.next().unwrap(),
        pos: fields.next().unwrap(),
        grammar: fields.next().unwrap(),
        meaning: fields.next().unwrap(),
        synonym: fields.next().unwrap(),
        variant: fields.next().unwrap(),
    })
}

/// TSV形式の行を解析してフィールドのベクターに分割する
///
/// ダブルクォートで囲まれたフィールドや、フィールド内のタブも正しく
/// 処理します。
fn parse_tsv_row(row: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut rdr = csv_core::ReaderBuilder::new().delimiter(b'\t').build();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        let end = match result {
            ReadFieldResult::InputEmpty => true,
            ReadFieldResult::Field { .. } => false,
            ReadFieldResult::End => true,
            _ => unreachable!(),
        };
        fields.push(String::from_utf8_lossy(&output[..nout]).into_owned());
        if end {
            break;
        }
        bytes = &bytes[nin..];
    }
    fields
}
