//! 見出し語ストア
//!
//! このモジュールは、見出し語レコードの読み書きインターフェースと、
//! その2つの実装（メモリ上、bincodeファイル）を提供します。照合エンジンは
//! このインターフェースのみを通じてレコードにアクセスします。

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use hashbrown::{HashMap, HashSet};
use tempfile::NamedTempFile;

use crate::common;
use crate::errors::{PalilexError, Result};
use crate::headword::Headword;

/// 見出し語レコードの読み書きインターフェース
///
/// ストアは唯一の共有可変リソースであり、全件読み込みと選択行の
/// 書き戻しという粗い粒度の操作のみを公開します。行ロックは行いません。
/// 単一の対話的オペレーターによる利用を想定しています。
pub trait WordStore {
    /// すべてのレコードを返します。
    fn fetch_all(&self) -> Result<Vec<Headword>>;

    /// 指定した見出し語を持つレコードを返します。
    ///
    /// ストア内に存在しない見出し語は黙って無視されます。
    fn fetch_by_lemmas(&self, lemmas: &HashSet<String>) -> Result<Vec<Headword>>;

    /// 変更されたレコードをストアに書き戻します。
    ///
    /// 1回の呼び出しが1つのコミット単位です。失敗した場合、以前の
    /// コミットは影響を受けず、ストアは呼び出し前の状態に戻ります。
    fn commit(&mut self, records: &[Headword]) -> Result<()>;
}

/// メモリ上の見出し語ストア
///
/// テストと、ファイルストアの内部表現として使用します。
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<Headword>,
    by_id: HashMap<u32, usize>,
}

impl MemoryStore {
    /// レコードのベクターからストアを作成します。
    pub fn new(records: Vec<Headword>) -> Self {
        let by_id = records
            .iter()
            .enumerate()
            .map(|(i, rec)| (rec.id, i))
            .collect();
        Self { records, by_id }
    }

    /// レコードのスライスを返します。
    pub fn records(&self) -> &[Headword] {
        &self.records
    }
}

impl WordStore for MemoryStore {
    fn fetch_all(&self) -> Result<Vec<Headword>> {
        Ok(self.records.clone())
    }

    fn fetch_by_lemmas(&self, lemmas: &HashSet<String>) -> Result<Vec<Headword>> {
        Ok(self
            .records
            .iter()
            .filter(|rec| lemmas.contains(&rec.lemma))
            .cloned()
            .collect())
    }

    fn commit(&mut self, records: &[Headword]) -> Result<()> {
        for rec in records {
            let Some(&i) = self.by_id.get(&rec.id) else {
                return Err(PalilexError::invalid_state(
                    "cannot commit a record missing from the store",
                    format!("id {} ({})", rec.id, rec.lemma),
                ));
            };
            self.records[i] = rec.clone();
        }
        Ok(())
    }
}

/// bincodeファイルに永続化される見出し語ストア
///
/// 起動時にファイル全体を読み込み、コミットのたびにファイル全体を
/// 原子的に書き換えます。
pub struct FileStore {
    path: PathBuf,
    mem: MemoryStore,
}

impl FileStore {
    /// ストアファイルを読み込みます。
    ///
    /// # 引数
    ///
    /// * `path` - ストアファイルのパス
    ///
    /// # エラー
    ///
    /// ファイルが存在しない、または読み込み・デコードに失敗した場合に
    /// エラーを返します。レコード全体が読めなければ索引を構築できない
    /// ため、ここで失敗した実行は何も変更しません。
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mut rdr = BufReader::new(File::open(path)?);
        let records: Vec<Headword> =
            bincode::decode_from_std_read(&mut rdr, common::bincode_config())?;
        Ok(Self {
            path: path.to_path_buf(),
            mem: MemoryStore::new(records),
        })
    }

    /// レコードのベクターから新しいストアファイルを作成します。
    ///
    /// # エラー
    ///
    /// ファイルの書き込みに失敗した場合にエラーを返します。
    pub fn create<P>(path: P, records: Vec<Headword>) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            mem: MemoryStore::new(records),
        };
        store.write_file()?;
        Ok(store)
    }

    /// レコード数を返します。
    pub fn len(&self) -> usize {
        self.mem.records().len()
    }

    /// ストアが空かどうかを返します。
    pub fn is_empty(&self) -> bool {
        self.mem.records().is_empty()
    }

    /// ストア全体をファイルに書き出す
    fn write_file(&self) -> Result<()> {
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new_in(".")?,
        };
        bincode::encode_into_std_write(self.mem.records(), &mut tmp, common::bincode_config())?;
        tmp.flush()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

impl WordStore for FileStore {
    fn fetch_all(&self) -> Result<Vec<Headword>> {
        self.mem.fetch_all()
    }

    fn fetch_by_lemmas(&self, lemmas: &HashSet<String>) -> Result<Vec<Headword>> {
        self.mem.fetch_by_lemmas(lemmas)
    }

    fn commit(&mut self, records: &[Headword]) -> Result<()> {
        let previous: Vec<Headword> = records
            .iter()
            .filter_map(|rec| {
                self.mem
                    .by_id
                    .get(&rec.id)
                    .map(|&i| self.mem.records[i].clone())
            })
            .collect();
        self.mem.commit(records)?;
        if let Err(e) = self.write_file() {
            // a failed commit must not be persisted by a later one
            let _ = self.mem.commit(&previous);
            return Err(e);
        }
        Ok(())
    }
}
